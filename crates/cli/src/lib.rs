//! Internals of the `amicall` binary
//!
//! Split out as a library so the argument validation and the session
//! controller can be exercised by integration tests.

pub mod args;
pub mod prompt;
pub mod session;
