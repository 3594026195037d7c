//! Shared building blocks for the sweepr workspace: configuration,
//! the error taxonomy, the address model and its loader, and the
//! terminal logging macros.

pub mod config;
pub mod error;
pub mod network;

mod macros;

#[doc(hidden)]
pub use tracing;
