use serde_json::Value;

/// Whether a raw `tokenBalance` value holds a non-zero amount.
///
/// Hex strings are checked digit by digit so 256-bit balances never overflow;
/// anything that does not parse counts as zero.
pub fn balance_is_nonzero(raw: &Value) -> bool {
    match raw {
        Value::String(text) => string_is_nonzero(text.trim()),
        Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        _ => false,
    }
}

fn string_is_nonzero(text: &str) -> bool {
    if let Some(digits) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return false;
        }
        return digits.chars().any(|c| c != '0');
    }

    text.parse::<f64>()
        .is_ok_and(|value| value.is_finite() && value != 0.0)
}
