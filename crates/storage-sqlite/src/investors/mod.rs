mod model;
mod repository;

pub use model::InvestorDB;
pub use repository::InvestorRepository;
