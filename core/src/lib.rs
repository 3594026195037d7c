//! The sweep engine: probe classification, the concurrent coordinator,
//! and report serialization.

pub mod probe;
pub mod report;
pub mod sweep;
