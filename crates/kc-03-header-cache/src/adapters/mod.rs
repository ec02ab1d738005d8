//! # Adapters Module
//!
//! - `memory`: in-memory `HeaderStore` for tests and single-process nodes

pub mod memory;

pub use memory::InMemoryHeaderStore;
