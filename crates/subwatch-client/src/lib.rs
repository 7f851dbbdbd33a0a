pub mod commands;
pub mod config;
pub mod contracts;
pub mod detection;
pub mod error;
pub mod source;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use detection::date::Frequency;
pub use detection::policy::{AmountTolerance, DetectionPolicy, SignConvention};
pub use detection::recurring::Detector;
pub use detection::types::{DetectedSubscription, DetectionReport, DetectionStats, Transaction};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
