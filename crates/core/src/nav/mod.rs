//! NAV computation engine - daily per-share pricing of the fund.

mod nav_calculator;
mod nav_errors;
mod nav_model;
mod nav_service;
mod nav_traits;

#[cfg(test)]
mod nav_service_tests;

pub use nav_calculator::{build_nav_record, compute_nav_per_share};
pub use nav_errors::NavError;
pub use nav_model::{NavRecord, PositionSnapshot};
pub use nav_service::NavService;
pub use nav_traits::{NavRepositoryTrait, NavServiceTrait};
