//! Brokerage valuation-source adapters.
//!
//! This crate defines the `BrokerageProvider` capability trait that the NAV
//! engine and the reconciliation pipeline depend on, plus one concrete REST
//! client per supported brokerage. Providers are interchangeable: everything
//! above this crate works against the trait, never a concrete client.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::BrokerageError;
pub use models::{Position, RawTransaction};
pub use provider::{alpaca::AlpacaProvider, ib_portal::IbPortalProvider, BrokerageProvider};

/// Source identifier for the Alpaca trading API.
pub const SOURCE_ALPACA: &str = "ALPACA";

/// Source identifier for the Interactive Brokers Client Portal gateway.
pub const SOURCE_IB_PORTAL: &str = "IB_PORTAL";
