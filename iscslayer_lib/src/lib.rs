//! Library layer for ISC Slayer: portal session handling, field extraction,
//! record assembly, and batch orchestration.
//!
//! Wraps the `iscslayer_api` gateway crate with retries and request pacing,
//! and layers the markup-parsing core on top of it.

pub mod assemble;
pub mod batch;
pub mod client;
pub mod error;
pub mod extract;
pub mod types;
pub mod validation;

pub use iscslayer_api;

pub use assemble::assemble_record;
pub use batch::run_batch;
pub use client::{PortalSession, RetryConfig};
pub use error::SlayerError;
pub use extract::{extract_detail_dates, parse_summary_row, DetailDates, SummaryRow};
pub use types::{BatchProgress, BatchResult, PolicyFailure, PolicyRecord};
