use bpg_common::Satoshis;
use serde_json::Value;

use crate::NodeClientError;

const DECIMALS: u32 = 8;

/// Parse an amount field from a node response into [`Satoshis`].
///
/// Daemons report amounts as decimal strings (`"0.00150000"`) or JSON numbers. Strings are parsed as fixed-point
/// values with 8 decimal places so no precision is lost on the way into the database.
pub fn parse_amount(value: &Value) -> Result<Satoshis, NodeClientError> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.checked_mul(10i64.pow(DECIMALS))
                    .map(Satoshis::from)
                    .ok_or_else(|| NodeClientError::ResponseFormat(format!("amount out of range: {n}")))
            } else {
                parse_decimal(&n.to_string())
            }
        },
        other => Err(NodeClientError::ResponseFormat(format!("expected an amount, got {other}"))),
    }
}

fn parse_decimal(s: &str) -> Result<Satoshis, NodeClientError> {
    let s = s.trim();
    let err = || NodeClientError::ResponseFormat(format!("invalid amount: {s}"));
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(err());
    }
    if frac.len() > DECIMALS as usize {
        return Err(err());
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| err())? };
    let mut frac_part: i64 = 0;
    if !frac.is_empty() {
        frac_part = frac.parse().map_err(|_| err())?;
        frac_part *= 10i64.pow(DECIMALS - frac.len() as u32);
    }
    let sats = whole
        .checked_mul(10i64.pow(DECIMALS))
        .and_then(|w| w.checked_add(frac_part))
        .ok_or_else(err)?;
    Ok(Satoshis::from(if negative { -sats } else { sats }))
}
