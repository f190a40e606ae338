//! Core types and configuration for the Heroes of History startup analyzer.
//!
//! This crate provides shared types used across all other crates:
//! - Raw startup records and defensive field access
//! - The normalized player model (profile, heroes, decks, equipment, ...)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod record;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use record::RawRecord;
pub use types::*;
