#![forbid(unsafe_code)]

//! Physiological signal and training-load analytics.
//!
//! This crate provides:
//! - Domain types (samples, waveforms, questionnaire answers, risk states)
//! - CSV ingestion with all-or-nothing batch validation
//! - ECG heart rate / HRV and accelerometer movement intensity
//! - Training load and acute:chronic workload ratio
//! - Vital-sign and fatigue risk classification
//! - History interfaces with in-memory and JSON-lines implementations

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod ingest;
pub mod ecg;
pub mod motion;
pub mod repository;
pub mod journal;
pub mod load;
pub mod acwr;
pub mod risk;
pub mod export;

// Re-export commonly used types
pub use error::{Axis, Error, Result};
pub use types::*;
pub use catalog::get_default_catalog;
pub use config::{Config, EcgConfig, WorkloadConfig};
pub use repository::{MemoryStore, QuestionnaireHistory, SensorHistory};
pub use journal::{HistorySink, Journal};
pub use ecg::HeartMetrics;
pub use acwr::{compute_acwr, Acwr, AcwrZone};
pub use load::{load_history, training_load_series};
pub use risk::{classify_bpm, classify_fatigue, vital_risk};
