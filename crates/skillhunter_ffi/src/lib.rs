//! Flutter-facing bindings over `skillhunter_core`.

pub mod api;
