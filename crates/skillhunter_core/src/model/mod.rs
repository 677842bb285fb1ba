//! Portfolio document model.
//!
//! # Responsibility
//! - Define the section records and defaults of the portfolio document.
//! - Address and mutate the document by typed paths.
//! - Repair documents loaded from older saves.
//!
//! # Invariants
//! - The live document is a JSON object; sections are addressed by key.
//! - Mutation is copy-on-write: readers never observe a half-applied change.

pub mod balance;
pub mod document;
pub mod path;
pub mod repair;
