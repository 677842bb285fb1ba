//! Repository layer for durable snapshot storage.
//!
//! # Responsibility
//! - Define the storage contract the store service persists through.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - One slot key holds exactly one payload; writes replace it wholesale.

pub mod slot_repo;
