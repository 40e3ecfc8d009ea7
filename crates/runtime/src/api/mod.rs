//! Public runtime API surface.
//!
//! Re-exports the error type and the run handle used by hosts.
mod errors;
mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::RunHandle;

pub(crate) use handle::RunControl;
