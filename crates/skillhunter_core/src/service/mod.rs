//! Core use-case services.
//!
//! # Responsibility
//! - Own the live document and its persistence (`portfolio_service`).
//! - Derive header-bar progress and encode uploaded images.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod media;
pub mod portfolio_service;
pub mod progress;
