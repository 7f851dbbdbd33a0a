use crate::commands::common::detect_source;
use crate::commands::detect::detect_data;
use crate::commands::upcoming::{resolve_window, upcoming_data};
use crate::config::ResolvedPolicy;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::DemoData;
use crate::detection::policy::DetectionPolicy;
use crate::detection::view::SubscriptionFilter;
use crate::source::input::bundled_source;
use crate::{ClientError, ClientResult};

pub const DEMO_SAMPLE_NAME: &str = "demo_transactions.json";
/// Pinned so the bundled history always reads the same way.
pub const DEMO_TODAY: &str = "2026-03-20";

const DEMO_TRANSACTIONS: &str = include_str!("../../fixtures/demo_transactions.json");

pub fn run(topic: &str) -> ClientResult<SuccessEnvelope> {
    let source = bundled_source(DEMO_SAMPLE_NAME, DEMO_TRANSACTIONS);
    let resolved_policy = ResolvedPolicy {
        policy: DetectionPolicy::default(),
        config_path: None,
    };
    let run = detect_source("demo", resolved_policy, &source, Some(DEMO_TODAY))?;

    let data = match topic {
        "detect" => DemoData {
            topic: topic.to_string(),
            sample: DEMO_SAMPLE_NAME.to_string(),
            detect: Some(detect_data(&run, &SubscriptionFilter::default())),
            upcoming: None,
        },
        "upcoming" => DemoData {
            topic: topic.to_string(),
            sample: DEMO_SAMPLE_NAME.to_string(),
            detect: None,
            upcoming: Some(upcoming_data(&run, resolve_window(None, "demo")?)),
        },
        other => {
            return Err(ClientError::invalid_argument_for_command(
                &format!("Unknown demo topic `{other}`. Use `detect` or `upcoming`."),
                Some("demo"),
            ));
        }
    };

    success("demo", data)
}
