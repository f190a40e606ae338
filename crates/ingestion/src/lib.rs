//! Startup ingestion and normalization for the startup analyzer.
//!
//! This crate handles:
//! - Loading the startup payload and extracting its message list
//! - Record classification (type-tag dispatch into buckets)
//! - Player model building (profile, heroes, decks, hero joins, cities, alliance)

pub mod builder;
pub mod classifier;
pub mod pipeline;
pub mod startup;

pub use builder::{BuildStats, EntityBuilder};
pub use classifier::{ClassificationStats, ClassifiedBuckets, RecordClassifier, RecordKind};
pub use pipeline::{IngestionOutput, Pipeline};
pub use startup::{FileStartupSource, StartupPayload, StartupSource};
