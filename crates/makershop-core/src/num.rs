//! Locale-tolerant numeric coercion for loosely typed import fields.

/// Parse a human-entered number, tolerating common CSV/price formatting.
///
/// Accepted forms: plain decimals (`"12.5"`), comma decimal separators
/// (`"12,5"`), thousands spacing including NBSP (`"1 299"`), and stray
/// currency symbols or codes around the digits (`"₴ 1299.00"`, `"49.99 UAH"`).
/// Returns `None` rather than erroring for anything that does not reduce to
/// a finite number.
#[must_use]
pub fn parse_flexible_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Keep digits, separators, and a leading sign; drop currency symbols,
    // alphabetic codes, and whitespace (regular or non-breaking).
    let mut cleaned = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '0'..='9' | '.' | ',' => cleaned.push(ch),
            '-' if cleaned.is_empty() => cleaned.push(ch),
            _ => {}
        }
    }
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    // A comma is a decimal separator only when no dot is present; otherwise
    // it is thousands punctuation ("1,299.50") and is dropped.
    let normalized = if cleaned.contains('.') {
        cleaned.replace(',', "")
    } else {
        match cleaned.matches(',').count() {
            0 => cleaned,
            1 => cleaned.replace(',', "."),
            _ => cleaned.replace(',', ""),
        }
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}
