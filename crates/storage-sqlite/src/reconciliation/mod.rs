mod model;
mod repository;

pub use model::{CanonicalTradeDB, RawBrokerageTransactionDB};
pub use repository::ReconciliationRepository;
