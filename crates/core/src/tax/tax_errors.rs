use thiserror::Error;

/// Errors raised by the tax event engine.
#[derive(Error, Debug)]
pub enum TaxError {
    /// The event already has a compensating reversal.
    #[error("Tax event {0} has already been reversed")]
    AlreadyReversed(String),

    /// A stored policy string no longer parses. Indicates hand-edited data.
    #[error("Unknown tax policy '{0}'")]
    UnknownPolicy(String),
}
