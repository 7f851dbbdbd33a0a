use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_detect(data: &Value) -> io::Result<String> {
    let rows = data
        .get("subscriptions")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("detect output requires subscriptions"))?;
    let today = value_str(data, "today");

    let mut lines = Vec::new();
    if rows.is_empty() {
        lines.push(format!("No subscriptions found as of {today}."));
        lines.push(String::new());
        lines.push("A subscription needs at least two charges from the same merchant,".to_string());
        lines.push("with steady amounts and a weekly, monthly, quarterly or yearly rhythm.".to_string());
    } else {
        let active = rows
            .iter()
            .filter(|row| row.get("is_active").and_then(Value::as_bool) == Some(true))
            .count();
        lines.push(format!(
            "Found {} ({active} active) as of {today}.",
            plural(rows.len(), "subscription", "subscriptions")
        ));
        lines.push(String::new());
        lines.push("Subscriptions:".to_string());
        lines.extend(subscription_table(rows));
    }

    if let Some(summary) = data.get("summary") {
        lines.push(String::new());
        lines.push("Spend (active subscriptions):".to_string());
        lines.extend(format::key_value_rows(
            &[
                ("Per month:", format::money(summary.get("monthly_cost"))),
                ("Per year:", format::money(summary.get("annual_cost"))),
            ],
            2,
        ));
    }

    if let Some(stats) = data.get("stats") {
        lines.push(String::new());
        lines.push("Detection:".to_string());
        lines.extend(format::key_value_rows(
            &[
                (
                    "Transactions read:",
                    stats
                        .get("transactions_seen")
                        .and_then(Value::as_u64)
                        .unwrap_or(0)
                        .to_string(),
                ),
                ("Skipped:", count_breakdown(stats.get("skipped"))),
                ("Groups rejected:", count_breakdown(stats.get("groups_rejected"))),
                ("Policy:", policy_line(data.get("policy"))),
            ],
            2,
        ));
    }

    Ok(lines.join("\n"))
}

pub fn render_upcoming(data: &Value) -> io::Result<String> {
    let bills = data
        .get("bills")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("upcoming output requires bills"))?;
    let today = value_str(data, "today");
    let within_days = data.get("within_days").and_then(Value::as_i64).unwrap_or(0);
    let window = plural(usize::try_from(within_days).unwrap_or(0), "day", "days");

    if bills.is_empty() {
        return Ok(format!("No bills due within {window} of {today}."));
    }

    let mut lines = vec![
        format!(
            "{} due within {window} of {today} (total {}).",
            plural(bills.len(), "bill", "bills"),
            format::money(data.get("total_due"))
        ),
        String::new(),
        "Upcoming:".to_string(),
    ];

    let columns = [
        Column {
            name: "Due",
            align: Align::Left,
        },
        Column {
            name: "In",
            align: Align::Right,
        },
        Column {
            name: "Merchant",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "Frequency",
            align: Align::Left,
        },
    ];

    let table_rows = bills
        .iter()
        .map(|bill| {
            let subscription = bill.get("subscription").unwrap_or(&Value::Null);
            let days = bill.get("days_until_due").and_then(Value::as_i64).unwrap_or(0);
            vec![
                value_str(subscription, "next_estimated_payment_date").to_string(),
                format::days_until(days),
                value_str(subscription, "merchant").to_string(),
                format::money(subscription.get("average_amount")),
                value_str(subscription, "frequency_label").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    lines.extend(format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Bill",
    ));

    Ok(lines.join("\n"))
}

pub fn render_demo(data: &Value) -> io::Result<String> {
    let sample = value_str(data, "sample");
    let body = if let Some(detect) = data.get("detect") {
        render_detect(detect)?
    } else if let Some(upcoming) = data.get("upcoming") {
        render_upcoming(upcoming)?
    } else {
        return Err(io::Error::other("demo output requires detect or upcoming data"));
    };

    Ok([
        format!("Demo using bundled sample data ({sample})."),
        String::new(),
        body,
        String::new(),
        "To run on your own history:".to_string(),
        "  subwatch detect --help".to_string(),
    ]
    .join("\n"))
}

fn subscription_table(rows: &[Value]) -> Vec<String> {
    let columns = [
        Column {
            name: "Merchant",
            align: Align::Left,
        },
        Column {
            name: "Frequency",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "Last Charge",
            align: Align::Left,
        },
        Column {
            name: "Next Charge",
            align: Align::Left,
        },
        Column {
            name: "Confidence",
            align: Align::Right,
        },
        Column {
            name: "Status",
            align: Align::Left,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            let status = if row.get("is_active").and_then(Value::as_bool) == Some(true) {
                "active"
            } else {
                "inactive"
            };
            vec![
                value_str(row, "merchant").to_string(),
                value_str(row, "frequency_label").to_string(),
                format::money(row.get("average_amount")),
                value_str(row, "last_payment_date").to_string(),
                value_str(row, "next_estimated_payment_date").to_string(),
                row.get("confidence")
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
                    .to_string(),
                status.to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(
        &columns,
        &table_rows,
        format::terminal_width(),
        "Subscription",
    )
}

fn count_breakdown(counts: Option<&Value>) -> String {
    let Some(object) = counts.and_then(Value::as_object) else {
        return "0".to_string();
    };
    let total = object.values().filter_map(Value::as_u64).sum::<u64>();
    if total == 0 {
        return "0".to_string();
    }
    let parts = object
        .iter()
        .map(|(reason, count)| format!("{reason} {}", count.as_u64().unwrap_or(0)))
        .collect::<Vec<String>>();
    format!("{total} ({})", parts.join(", "))
}

fn policy_line(policy: Option<&Value>) -> String {
    let Some(policy) = policy else {
        return "unknown".to_string();
    };
    let tolerance = policy.get("amount_tolerance").unwrap_or(&Value::Null);
    let tolerance_value = tolerance.get("value").and_then(Value::as_f64).unwrap_or(0.0);
    let amount_band = match value_str(tolerance, "kind") {
        "relative" => format!("±{:.0}%", tolerance_value * 100.0),
        _ => format!("±{tolerance_value:.2}"),
    };
    let days = policy
        .get("interval_tolerance_days")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    format!(
        "{}, {}, amount {amount_band}, interval ±{days} days",
        value_str(policy, "policy_version"),
        value_str(policy, "sign_convention"),
    )
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        return format!("1 {singular}");
    }
    format!("{count} {plural}")
}

fn value_str<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or("unknown")
}
