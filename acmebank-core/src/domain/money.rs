//! Currency formatting
//!
//! Amounts are integer units with no fraction digits, grouped with `.`
//! the way Colombian peso amounts are written (`$ 5.500.000`).

/// Format an amount for display, e.g. `$ 5.500.000` or `-$ 1.200`
pub fn format_currency(amount: i64, currency: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let symbol = currency_symbol(currency);
    if amount < 0 {
        format!("-{} {}", symbol, grouped)
    } else {
        format!("{} {}", symbol, grouped)
    }
}

fn currency_symbol(currency: &str) -> &str {
    match currency.trim().to_uppercase().as_str() {
        "COP" | "USD" | "MXN" | "CLP" | "ARS" => "$",
        "EUR" => "€",
        _ => currency.trim(),
    }
}
