mod model;
mod repository;

pub use model::FundFlowRequestDB;
pub use repository::FundFlowRepository;
