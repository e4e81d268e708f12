// Core modules
pub mod segment_classifier;
pub mod path_pattern;
pub mod domain_aggregator;
pub mod tracker_aggregator;
pub mod regex_synthesizer;
pub mod dialect_escaper;
pub mod error;

// Batch pipeline and its boundary
pub mod config;
pub mod csv_io;
pub mod implementations;
pub mod inventory;
pub mod pipeline;
pub mod records;
pub mod traits;
