//! HTTP adapter for the analysis service.
//!
//! Implements the `session-core` [`AnalysisService`] port against the
//! service's REST endpoints. The credential check happens before any
//! network contact, and failure envelopes are decoded into messages
//! the session surfaces verbatim.
//!
//! [`AnalysisService`]: session_core::AnalysisService

pub mod client;
pub mod error;

pub use client::{ClientConfig, HttpAnalysisService};
pub use error::ClientError;
