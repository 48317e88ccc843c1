//! # odata-harvest
//!
//! Resilient partitioned extraction from OData-style analytics services
//! to a single flat CSV.
//!
//! The extraction engine discovers which partition values exist, issues
//! one filtered, paginated query per partition, and adapts its requested
//! field set when the service rejects individual fields. It tolerates
//! three independent sources of partial failure without losing fetched
//! data or stalling the run:
//!
//! - schema drift in the available fields (field negotiation),
//! - inconsistent pagination link shapes across protocol versions
//!   (legacy `d.results`/`__next` vs. modern `value`/`@odata.nextLink`),
//! - per-partition query failures (isolated, logged, skipped).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use odata_harvest::{ExtractEngine, ExtractorConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ExtractorConfig::from_env();
//!     config.validate()?;
//!
//!     let mut engine = ExtractEngine::new(config);
//!     let outcome = engine.run().await?;
//!     println!("extracted {} records", outcome.records().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     ExtractEngine                         │
//! │  resolve key → list values → extract each → RunOutcome    │
//! └───────────────────────────────────────────────────────────┘
//!                │                │
//! ┌──────────────┴───┬────────────┴────┬───────────┬──────────┐
//! │    Discover      │     Extract     │ Negotiate │  Output  │
//! ├──────────────────┼─────────────────┼───────────┼──────────┤
//! │ Probe candidates │ $filter + $top  │ FieldSet  │ Rename   │
//! │ Distinct values  │ Follow tokens   │ segment   │ Dedup    │
//! │ Sorted order     │ Freeze fields   │ rejection │ CSV      │
//! └──────────────────┴─────────────────┴───────────┴──────────┘
//!                │                │
//!        ┌───────┴────────────────┴───────┐
//!        │   QueryClient (paced, basic    │
//!        │   auth, bounded timeout)       │
//!        └────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Extraction run configuration
pub mod config;

/// HTTP query client and request pacing
pub mod http;

/// Response envelope unwrapping
pub mod envelope;

/// Field-set negotiation
pub mod negotiate;

/// Partition discovery
pub mod discover;

/// Paginated per-partition extraction
pub mod extract;

/// Extraction orchestration
pub mod engine;

/// Output normalization and CSV persistence
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ExtractorConfig;
pub use engine::{ExtractEngine, RunOutcome, RunStats};
pub use error::{Error, Result};
pub use types::Record;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
