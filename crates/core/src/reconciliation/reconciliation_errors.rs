use thiserror::Error;

/// Errors raised by the reconciliation pipeline itself.
///
/// Per-row mapping failures are not errors at this level: they are recorded
/// on the row (`EtlStatus::Error`) and reported in the batch summary, so one
/// bad row never halts its siblings.
#[derive(Error, Debug)]
pub enum EtlError {
    /// No provider is configured for the requested source.
    #[error("No brokerage provider configured for source '{0}'")]
    UnknownSource(String),

    /// The extraction window is inverted.
    #[error("Invalid extraction window: {start} is after {end}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}
