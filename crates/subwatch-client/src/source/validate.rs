use std::collections::BTreeMap;

use tracing::debug;

use crate::detection::date::parse_transaction_date;
use crate::detection::normalize::normalize_optional;
use crate::detection::types::{SkipReason, Transaction};
use crate::source::parse::RawTransaction;

#[derive(Debug, Clone, Default)]
pub struct ValidatedTransactions {
    pub rows: Vec<Transaction>,
    pub rows_read: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

/// Malformed rows are dropped and counted, never fatal. Checks run in a
/// fixed order so each row is attributed to exactly one reason.
pub fn validate_rows(raw_rows: Vec<RawTransaction>) -> ValidatedTransactions {
    let mut validated = ValidatedTransactions {
        rows_read: raw_rows.len(),
        ..ValidatedTransactions::default()
    };

    for raw in raw_rows {
        let row = raw.row;
        match validate_row(raw) {
            Ok(transaction) => validated.rows.push(transaction),
            Err(reason) => {
                debug!(row, reason = reason.as_str(), "input row skipped");
                *validated.skipped.entry(reason).or_insert(0) += 1;
            }
        }
    }

    validated
}

fn validate_row(raw: RawTransaction) -> Result<Transaction, SkipReason> {
    let Some(id) = normalize_optional(raw.id) else {
        return Err(SkipReason::MissingId);
    };
    let Some(merchant_label) = normalize_optional(raw.merchant) else {
        return Err(SkipReason::MissingMerchant);
    };
    let Some(date) = normalize_optional(raw.date)
        .as_deref()
        .and_then(parse_transaction_date)
    else {
        return Err(SkipReason::InvalidDate);
    };
    let Some(amount) = normalize_optional(raw.amount)
        .as_deref()
        .and_then(parse_amount)
    else {
        return Err(SkipReason::InvalidAmount);
    };

    Ok(Transaction {
        id,
        merchant_label,
        amount,
        date,
        category: normalize_optional(raw.category),
    })
}

fn parse_amount(value: &str) -> Option<f64> {
    let amount = value.trim().parse::<f64>().ok()?;
    if !amount.is_finite() {
        return None;
    }
    Some(amount)
}
