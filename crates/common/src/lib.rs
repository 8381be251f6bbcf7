//! Transport-neutral update model shared by all herald crates.

pub mod types;
