//! Error types for the reactive runtime.
//!
//! The runtime has exactly two failure modes worth surfacing to callers:
//! handing `Runtime::reactive` a primitive value, and invoking a list-only
//! operation on a wrapper that fronts an object. Everything else (writes to
//! keys nobody subscribed to, reads of absent keys) is an expected
//! non-error condition and stays out of this enum.

use thiserror::Error;

/// Errors produced by the reactive runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Only composite values (objects and arrays) can be observed.
    #[error("reactive target must be an object or array, got {kind}")]
    NotComposite {
        /// Kind of the rejected value.
        kind: &'static str,
    },

    /// A list-only operation was invoked on an object wrapper.
    #[error("`{op}` requires an array target")]
    NotAnArray {
        /// Name of the rejected operation.
        op: &'static str,
    },
}
