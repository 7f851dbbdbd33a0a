pub mod input;
pub mod parse;
pub mod validate;

use crate::ClientResult;
use crate::source::input::ResolvedSource;
use crate::source::validate::ValidatedTransactions;

/// Parse and validate a resolved source in one step.
pub fn load_transactions(source: &ResolvedSource) -> ClientResult<ValidatedTransactions> {
    let raw_rows = parse::parse_source(&source.content)?;
    Ok(validate::validate_rows(raw_rows))
}
