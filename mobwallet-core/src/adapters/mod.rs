//! Adapter implementations (hexagonal architecture)
//!
//! Adapters implement the port traits for specific technologies.

pub mod full_service;
pub mod memory;
