mod model;
mod repository;

pub use model::LedgerEntryDB;
pub use repository::LedgerRepository;

pub(crate) use repository::{apply_aggregate_delta, insert_entry_row};
