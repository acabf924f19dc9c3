//! coursegate-core — Content gating engine, traits, and grading.
//!
//! This crate defines the fundamental data model, access evaluation, and
//! quiz grading logic that the entire coursegate system builds on.

pub mod access;
pub mod drip;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod prerequisites;
pub mod progress;
pub mod quiz;
pub mod traits;
