use crate::commands::common::{
    DetectionRun, SourceOptions, policy_summary, run_detection, spend_summary_row, stats_summary,
    subscription_row,
};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{DetectData, FilterSummary, SubscriptionRow};
use crate::detection::date::{Frequency, format_iso_date};
use crate::detection::view::{StatusFilter, SubscriptionFilter, spend_summary};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default, Clone)]
pub struct DetectRunOptions<'a> {
    pub source: SourceOptions<'a>,
    pub status: Option<String>,
    pub frequency: Option<String>,
    pub min_confidence: Option<u8>,
    pub limit: Option<usize>,
}

pub fn run_with_options(options: DetectRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let filter = build_filter(&options, "detect")?;
    let run = run_detection("detect", options.source)?;
    success("detect", detect_data(&run, &filter))
}

pub(crate) fn detect_data(run: &DetectionRun, filter: &SubscriptionFilter) -> DetectData {
    let subscriptions = &run.report.subscriptions;
    let rows = filter
        .apply(subscriptions)
        .into_iter()
        .map(subscription_row)
        .collect::<Vec<SubscriptionRow>>();

    DetectData {
        today: format_iso_date(&run.today),
        policy: policy_summary(&run.resolved_policy),
        source: run.source.clone(),
        filter: FilterSummary {
            status: filter.status.as_str().to_string(),
            frequency: filter.frequency.map(|value| value.as_str().to_string()),
            min_confidence: filter.min_confidence,
            limit: filter.limit,
        },
        summary: spend_summary_row(spend_summary(subscriptions)),
        stats: stats_summary(&run.report.stats),
        subscriptions: rows,
    }
}

fn build_filter(options: &DetectRunOptions<'_>, command: &str) -> ClientResult<SubscriptionFilter> {
    let status = match options.status.as_deref() {
        Some(value) => StatusFilter::parse(value).ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!("`--status` must be one of all, active, inactive; got `{value}`."),
                Some(command),
            )
        })?,
        None => StatusFilter::All,
    };

    let frequency = match options.frequency.as_deref() {
        Some(value) => Some(Frequency::parse(value).ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!(
                    "`--frequency` must be one of weekly, monthly, quarterly, yearly; got `{value}`."
                ),
                Some(command),
            )
        })?),
        None => None,
    };

    if let Some(minimum) = options.min_confidence
        && minimum > 100
    {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`--min-confidence` must be between 0 and 100; got {minimum}."),
            Some(command),
        ));
    }

    Ok(SubscriptionFilter {
        status,
        frequency,
        min_confidence: options.min_confidence,
        limit: options.limit,
    })
}
