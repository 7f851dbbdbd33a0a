use crate::commands::common::{DetectionRun, SourceOptions, policy_summary, run_detection, subscription_row};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{UpcomingBillRow, UpcomingData};
use crate::detection::date::format_iso_date;
use crate::detection::view::{DEFAULT_UPCOMING_WINDOW_DAYS, upcoming_bills};
use crate::{ClientError, ClientResult};

const MAX_WINDOW_DAYS: i64 = 366;

#[derive(Debug, Default, Clone)]
pub struct UpcomingRunOptions<'a> {
    pub source: SourceOptions<'a>,
    pub within_days: Option<i64>,
}

pub fn run_with_options(options: UpcomingRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let within_days = resolve_window(options.within_days, "upcoming")?;
    let run = run_detection("upcoming", options.source)?;
    success("upcoming", upcoming_data(&run, within_days))
}

pub(crate) fn upcoming_data(run: &DetectionRun, within_days: i64) -> UpcomingData {
    let bills = upcoming_bills(&run.report.subscriptions, run.today, within_days)
        .into_iter()
        .map(|bill| UpcomingBillRow {
            days_until_due: bill.days_until_due,
            subscription: subscription_row(bill.subscription),
        })
        .collect::<Vec<UpcomingBillRow>>();
    let total_due = bills
        .iter()
        .map(|bill| bill.subscription.average_amount)
        .sum::<f64>();

    UpcomingData {
        today: format_iso_date(&run.today),
        within_days,
        policy: policy_summary(&run.resolved_policy),
        source: run.source.clone(),
        total_due: (total_due * 100.0).round() / 100.0,
        bills,
    }
}

pub(crate) fn resolve_window(within_days: Option<i64>, command: &str) -> ClientResult<i64> {
    let days = within_days.unwrap_or(DEFAULT_UPCOMING_WINDOW_DAYS);
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`--within-days` must be between 0 and {MAX_WINDOW_DAYS}; got {days}."),
            Some(command),
        ));
    }
    Ok(days)
}
