use rust_decimal::{Decimal, RoundingStrategy};

/// Symbol and minor unit digits of the currencies Edge organizations usually bill in.
fn currency_format(code: &str) -> Option<(&'static str, u32)> {
    let format = match code.to_ascii_uppercase().as_str() {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "JPY" => ("¥", 0),
        "KRW" => ("₩", 0),
        "CNY" => ("CN¥", 2),
        "INR" => ("₹", 2),
        "CAD" => ("CA$", 2),
        "AUD" => ("A$", 2),
        "NZD" => ("NZ$", 2),
        "MXN" => ("MX$", 2),
        "BRL" => ("R$", 2),
        "CHF" => ("CHF\u{a0}", 2),
        _ => return None,
    };
    Some(format)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_number(amount: Decimal, fraction_digits: u32) -> String {
    let fixed = format!("{:.*}", fraction_digits as usize, amount);
    match fixed.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_thousands(int_part), frac),
        None => group_thousands(&fixed),
    }
}

/// Formats a monetary amount for display, e.g. `$1,234.50`.
///
/// Unknown currency codes fall back to `1,234.50 XYZ`. Amounts that round to
/// zero in the currency's minor unit carry no sign.
pub fn format_amount(amount: Decimal, currency_code: &str) -> String {
    let (symbol, digits) = match currency_format(currency_code) {
        Some((symbol, digits)) => (Some(symbol), digits),
        None => (None, 2),
    };
    let rounded = amount
        .abs()
        .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let number = format_number(rounded, digits);
    match symbol {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{number} {}", currency_code.to_ascii_uppercase()),
    }
}
