//! Share ledger - the append-only store of ownership-affecting events.

mod ledger_calculator;
mod ledger_errors;
mod ledger_model;
mod ledger_service;
mod ledger_traits;


pub use ledger_calculator::{issuance_shares, redemption_figures, RedemptionFigures};
pub use ledger_errors::LedgerError;
pub use ledger_model::{AggregateDelta, LedgerEntry, LedgerEntryKind, PostedEntry};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
