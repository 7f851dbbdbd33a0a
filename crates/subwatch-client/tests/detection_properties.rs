use chrono::NaiveDate;
use subwatch_client::detection::date::Frequency;
use subwatch_client::detection::types::GroupRejection;
use subwatch_client::{AmountTolerance, DetectionPolicy, Detector, Transaction};

fn date(value: &str) -> NaiveDate {
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d");
    assert!(parsed.is_ok());
    parsed.unwrap_or_default()
}

fn charges(merchant: &str, amounts: &[f64], dates: &[&str]) -> Vec<Transaction> {
    dates
        .iter()
        .zip(amounts.iter())
        .enumerate()
        .map(|(index, (posted, amount))| Transaction {
            id: format!("{merchant}_{index}"),
            merchant_label: merchant.to_string(),
            amount: -amount,
            date: date(posted),
            category: None,
        })
        .collect()
}

#[test]
fn no_subscription_is_built_from_fewer_than_two_charges() {
    let mut input = charges("Lonely Gym", &[45.0], &["2026-01-10"]);
    input.extend(charges("Pair Gym", &[45.0, 45.0], &["2026-01-10", "2026-02-10"]));

    let report = Detector::default().detect_with_report(&input, date("2026-02-12"));
    assert!(
        report
            .subscriptions
            .iter()
            .all(|subscription| subscription.merchant_key != "lonely gym")
    );
    assert_eq!(report.subscriptions.len(), 1);
    assert_eq!(
        report.stats.groups_rejected.get(&GroupRejection::Undersampled),
        Some(&1)
    );
}

#[test]
fn detection_is_deterministic_across_runs_and_input_order() {
    let mut input = charges(
        "Netflix",
        &[12.99, 12.99, 12.99],
        &["2026-01-01", "2026-01-31", "2026-03-02"],
    );
    input.extend(charges(
        "Hulu",
        &[7.99, 7.99, 7.99],
        &["2026-01-05", "2026-02-04", "2026-03-06"],
    ));
    let detector = Detector::default();
    let today = date("2026-03-10");

    let first = serde_json::to_string(&detector.detect(&input, today));
    let second = serde_json::to_string(&detector.detect(&input, today));
    assert!(first.is_ok());
    assert_eq!(first.as_ref().ok(), second.as_ref().ok());

    let mut reversed = input.clone();
    reversed.reverse();
    let third = serde_json::to_string(&detector.detect(&reversed, today));
    assert_eq!(first.ok(), third.ok());
}

#[test]
fn netflix_monthly_example_scores_one_hundred() {
    // gaps 30, 31, 29
    let input = charges(
        "Netflix",
        &[12.99, 12.99, 12.99, 12.99],
        &["2026-01-01", "2026-01-31", "2026-03-03", "2026-04-01"],
    );
    let found = Detector::default().detect(&input, date("2026-04-02"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].frequency, Frequency::Monthly);
    assert_eq!(found[0].confidence, 100);
}

#[test]
fn amount_gate_example_rejects_the_group() {
    let input = charges(
        "Utility",
        &[10.0, 10.0, 10.0, 25.0],
        &["2026-01-01", "2026-01-31", "2026-03-02", "2026-04-01"],
    );
    let report = Detector::default().detect_with_report(&input, date("2026-04-02"));
    assert!(report.subscriptions.is_empty());
    assert_eq!(
        report
            .stats
            .groups_rejected
            .get(&GroupRejection::AmountInconsistent),
        Some(&1)
    );
}

#[test]
fn amounts_exactly_five_dollars_from_the_mean_still_match() {
    let input = charges("Gym", &[5.30, 15.30], &["2026-01-10", "2026-02-10"]);
    let found = Detector::default().detect(&input, date("2026-02-12"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].average_amount, 10.3);
}

#[test]
fn average_amount_is_rounded_to_cents() {
    let input = charges(
        "Cloud Drive",
        &[10.00, 10.01, 10.01],
        &["2026-01-03", "2026-02-03", "2026-03-03"],
    );
    let found = Detector::default().detect(&input, date("2026-03-05"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].average_amount, 10.01);
}

#[test]
fn interval_gate_example_rejects_the_group() {
    // gaps 60, 31, 30 from oldest to newest
    let input = charges(
        "Cloud",
        &[9.99, 9.99, 9.99, 9.99],
        &["2025-12-01", "2026-01-30", "2026-03-02", "2026-04-01"],
    );
    let report = Detector::default().detect_with_report(&input, date("2026-04-02"));
    assert!(report.subscriptions.is_empty());
    assert_eq!(
        report
            .stats
            .groups_rejected
            .get(&GroupRejection::IrregularInterval),
        Some(&1)
    );
}

#[test]
fn projection_adds_one_month_and_clamps_to_month_end() {
    let mid_month = charges("Gym", &[30.0, 30.0], &["2023-12-15", "2024-01-15"]);
    let found = Detector::default().detect(&mid_month, date("2024-01-20"));
    assert_eq!(found[0].next_estimated_payment_date, date("2024-02-15"));

    let month_end = charges("Insure", &[80.0, 80.0], &["2023-12-31", "2024-01-31"]);
    let found = Detector::default().detect(&month_end, date("2024-02-01"));
    assert_eq!(found[0].next_estimated_payment_date, date("2024-02-29"));
}

#[test]
fn activity_threshold_is_one_and_a_half_average_gaps() {
    // average gap 30 days, threshold 45
    let input = charges("Music", &[11.0, 11.0, 11.0], &["2026-01-01", "2026-01-31", "2026-03-02"]);
    let detector = Detector::default();

    let forty_days = detector.detect(&input, date("2026-04-11"));
    assert_eq!(forty_days[0].days_since_last_payment, 40);
    assert!(forty_days[0].is_active);

    let fifty_days = detector.detect(&input, date("2026-04-21"));
    assert_eq!(fifty_days[0].days_since_last_payment, 50);
    assert!(!fifty_days[0].is_active);
}

#[test]
fn relative_policy_is_configurable_through_the_public_api() {
    let detector = Detector::new(DetectionPolicy {
        amount_tolerance: AmountTolerance::Relative(0.05),
        ..DetectionPolicy::default()
    });
    assert!(detector.is_ok());
    if let Ok(detector) = detector {
        // mean 1000, band 50: 960 and 1040 both fit
        let input = charges("Rent", &[960.0, 1040.0, 1000.0], &["2026-01-01", "2026-02-01", "2026-03-01"]);
        assert_eq!(detector.detect(&input, date("2026-03-02")).len(), 1);
    }
}
