//! Extractors Crate
//!
//! This crate turns loosely formatted work-schedule emails into structured shift records.
//! It is designed to be reusable by any mail-polling or store-writing front end.
//!
//! # Architecture
//!
//! - **Types**: Records, errors and the `Extractor` trait live in the `shared-types` crate
//! - **Implementations**: The schedule parser and its components are implemented in this crate
//!
//! # Available Extractors
//!
//! - `ShiftScheduleExtractor`: Parses a schedule email into dated shift records
//!
//! # Example
//!
//! ```rust,ignore
//! use extractors::ShiftScheduleExtractor;
//! use shared_types::{Extractor, ExtractionInput};
//!
//! let extractor = ShiftScheduleExtractor::with_defaults();
//! let parse = extractor.extract(&input)?;
//! let records = parse.into_records()?;
//! ```

pub mod shift_schedule;

// Re-export commonly used types
pub use shift_schedule::{
    ParseStats, ParseStatus, ScheduleParse, ShiftScheduleConfig, ShiftScheduleExtractor,
};

// Re-export the Extractor trait from shared-types for convenience
pub use shared_types::Extractor;
