pub mod clock;
pub mod error;
pub mod parser;
pub mod slots;
pub mod overlap;
pub mod aggregate;
pub mod analytics;
pub mod capacity;
pub mod config;
pub mod ingest;
pub mod sample;
pub mod report;
