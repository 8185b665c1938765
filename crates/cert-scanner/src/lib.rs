#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ScannerError`, `ExtractionError`)
//! - [`config`]: Scanner configuration (`ScannerConfig`, builder)
//! - [`extractor`]: Certificate field extraction (`CertificateExtractor` trait, `DerCertificateExtractor`)
//! - [`discovery`]: Recursive file discovery with a file cap (`FileDiscoverer`)
//! - [`dispatcher`]: Fixed-size worker pool (`WorkDispatcher`, `ParseOutcome`)
//! - [`aggregator`]: Outcome aggregation (`ResultAggregator`, `AggregateReport`)
//! - [`progress`]: Progress sinks (`NullProgressSink`, `ChannelProgressSink`)
//! - [`scanner`]: Main orchestrator (`CertScanner`, `CertScannerBuilder`, `ScanSummary`)
//!
//! # Architecture
//!
//! ```text
//! root --> FileDiscoverer --> WorkDispatcher (N workers) --> ResultAggregator --> ScanSummary
//!               |                    |                                               |
//!               +--> ProgressSink <--+                                         ReportWriter
//! ```

pub mod aggregator;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod progress;
pub mod scanner;

// --- Public API Re-exports ---

// Scanner (main orchestrator)
pub use scanner::{CertScanner, CertScannerBuilder, ScanSummary, SessionOutcome};

// Configuration
pub use config::{ScannerConfig, ScannerConfigBuilder};

// Error
pub use error::{ExtractionError, ScannerError};

// Pipeline stages
pub use aggregator::{AggregateReport, ResultAggregator};
pub use discovery::FileDiscoverer;
pub use dispatcher::{FileFailure, ParseOutcome, WorkDispatcher};
pub use extractor::{CertificateExtractor, DerCertificateExtractor};

// Progress
pub use progress::{ChannelProgressSink, NullProgressSink};
