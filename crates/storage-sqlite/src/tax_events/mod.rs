mod model;
mod repository;

pub use model::TaxEventDB;
pub use repository::TaxEventRepository;

pub(crate) use repository::insert_event_row;
