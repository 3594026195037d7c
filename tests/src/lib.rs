//! Cross-crate integration tests for the sweep pipeline. Test-only
//! crate; nothing here is built outside `cargo test`.


#[cfg(test)]
mod sweep;

#[cfg(test)]
mod report;
