//! Geometry derived from the document for the presentation layer.
//!
//! # Responsibility
//! - Project balance values onto the wheel polygon.
//! - Lay out partner markers and build remote QR image links.
//!
//! # Invariants
//! - Every function here is pure; callers pass already repaired documents.

pub mod qr;
pub mod radial;
pub mod region_map;
