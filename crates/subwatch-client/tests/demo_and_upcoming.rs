mod support;

use serde_json::Value;
use subwatch_client::commands::demo;
use support::subscription_testkit::{envelope_value, series, upcoming_payload};

fn merchants(rows: &Value) -> Vec<String> {
    rows.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|row| {
                    row.get("merchant")
                        .or_else(|| row["subscription"].get("merchant"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn demo_detect_reads_the_bundled_history() {
    let result = demo::run("detect");
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = envelope_value(success);
        assert_eq!(payload["command"], "demo");
        let data = &payload["data"]["detect"];
        assert_eq!(data["today"], "2026-03-20");
        assert_eq!(data["source"]["source_kind"], "bundled");
        assert_eq!(data["source"]["rows_read"], 34);
        assert_eq!(
            merchants(&data["subscriptions"]),
            vec![
                "Fresh Plate Meal Kit",
                "Netflix",
                "Spotify",
                "Weekly Reader Magazine",
                "CloudVault Storage",
                "Hover Domains",
            ]
        );

        let stats = &data["stats"];
        assert_eq!(stats["skipped"]["missing_merchant"], 1);
        assert_eq!(stats["skipped"]["invalid_date"], 1);
        assert_eq!(stats["skipped"]["not_outflow"], 2);
        assert_eq!(stats["groups_rejected"]["amount_inconsistent"], 1);
        assert_eq!(stats["groups_rejected"]["unmapped_frequency"], 1);
        assert_eq!(stats["groups_rejected"]["undersampled"], 1);
        assert_eq!(data["summary"]["active_count"], 5);

        let magazine = &data["subscriptions"][3];
        assert_eq!(magazine["is_active"], false);
        let netflix = &data["subscriptions"][1];
        assert_eq!(netflix["category"], "Service");
        assert_eq!(netflix["occurrence_count"], 6);
    }
}

#[test]
fn demo_upcoming_lists_bills_due_within_a_week() {
    let result = demo::run("upcoming");
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = envelope_value(success);
        let data = &payload["data"]["upcoming"];
        assert_eq!(data["within_days"], 7);
        assert_eq!(
            merchants(&data["bills"]),
            vec!["Fresh Plate Meal Kit", "Spotify", "Hover Domains"]
        );
        assert_eq!(data["bills"][0]["days_until_due"], 1);
        assert_eq!(data["total_due"], 82.98);
        assert!(payload["data"].get("detect").is_none());
    }
}

#[test]
fn demo_rejects_unknown_topics() {
    let result = demo::run("forecast");
    assert!(matches!(result, Err(ref error) if error.code == "invalid_argument"));
}

#[test]
fn upcoming_window_is_inclusive_and_skips_overdue_bills() {
    let mut rows = series("gym", "Gym", -40.0, &["2026-01-10", "2026-02-10"]);
    rows.extend(series("tv", "Stream TV", -9.0, &["2026-01-01", "2026-02-01"]));

    // Gym is due 2026-03-10 (exactly 7 days out), Stream TV was due 2026-03-01.
    let payload = upcoming_payload(&rows, "2026-03-03", None);
    let bills = &payload["data"]["bills"];
    assert_eq!(merchants(bills), vec!["Gym"]);
    assert_eq!(bills[0]["days_until_due"], 7);

    let narrow = upcoming_payload(&rows, "2026-03-03", Some(6));
    assert_eq!(merchants(&narrow["data"]["bills"]), Vec::<String>::new());
}
