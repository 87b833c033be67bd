// Domain error conditions callers may want to match on
//
// These travel inside `eyre::Report`; use `report.downcast_ref::<LedgerError>()`
// to tell them apart from I/O and serialization failures.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The only required input field was empty
    #[error("item name is required")]
    MissingName,

    /// An input capability (e.g. speech recognition) is absent on this device
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}
