//! Investors module - domain models, services, and traits.

mod investors_model;
mod investors_service;
mod investors_traits;

#[cfg(test)]
mod investors_service_tests;

pub use investors_model::{Investor, InvestorUpdate, InvestorValuation, NewInvestor};
pub use investors_service::InvestorService;
pub use investors_traits::{InvestorRepositoryTrait, InvestorServiceTrait};
