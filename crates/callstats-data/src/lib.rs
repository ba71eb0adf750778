//! Data layer for callstats.
//!
//! Reads call-log exports, parses them into records, aggregates outbound
//! calls by day and hour, and runs the top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod parser;
pub mod reader;
