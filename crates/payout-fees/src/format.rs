//! Display formatting for cent amounts. Not authoritative; the integer cents are.

pub const DEFAULT_CURRENCY: &str = "USD";

/// en-US currency string: symbol prefix, thousands separators, two decimals.
/// `-` precedes the symbol for negative amounts (`-$0.50`).
pub fn format_currency(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = group_thousands(abs / 100);
    let frac = abs % 100;
    let code = currency.to_ascii_uppercase();
    match symbol(&code) {
        Some(sym) => format!("{sign}{sym}{whole}.{frac:02}"),
        None => format!("{sign}{code} {whole}.{frac:02}"),
    }
}

pub fn format_usd(cents: i64) -> String {
    format_currency(cents, DEFAULT_CURRENCY)
}

fn symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
