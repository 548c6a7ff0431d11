//! Helper constructors for driver option structs
//!
//! One-call builders for the options most queries need, so callers do not
//! have to spell out the full builder chain for a single setting.

pub mod distinct;
pub mod find;
