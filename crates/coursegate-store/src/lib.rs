//! coursegate-store — Store implementations for progress and quiz attempts.
//!
//! Ships the in-memory store used by the CLI and tests. Database-backed
//! implementations plug in behind the same `coursegate-core` traits.

pub mod memory;

pub use memory::MemoryStore;
