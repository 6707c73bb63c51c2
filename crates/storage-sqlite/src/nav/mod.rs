mod model;
mod repository;

pub use model::{NavRecordDB, PositionSnapshotDB};
pub use repository::NavRepository;
