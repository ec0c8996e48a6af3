//! Display formatting for amounts, dates and text.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Default pattern for dates.
pub const DATE_FORMAT: &str = "DD/MM/YYYY";
/// Default pattern for timestamps.
pub const DATE_TIME_FORMAT: &str = "DD/MM/YYYY HH:mm";

struct CurrencyStyle {
    symbol: &'static str,
    prefix: bool,
    thousands: char,
    decimal: char,
}

fn currency_style(currency: &str) -> Option<CurrencyStyle> {
    let style = match currency.to_ascii_uppercase().as_str() {
        "VND" => CurrencyStyle {
            symbol: "₫",
            prefix: false,
            thousands: '.',
            decimal: ',',
        },
        "USD" => CurrencyStyle {
            symbol: "$",
            prefix: true,
            thousands: ',',
            decimal: '.',
        },
        "EUR" => CurrencyStyle {
            symbol: "€",
            prefix: false,
            thousands: '.',
            decimal: ',',
        },
        _ => return None,
    };
    Some(style)
}

/// Format `amount` in the conventions of `currency`.
///
/// VND → `50.000 ₫`, USD → `$1,234.50`, EUR → `1.234,50 €`. Other codes
/// use US separators with the code as prefix (`GBP 1,234.50`).
pub fn format_currency(amount: Decimal, currency: &str, decimals: u32) -> String {
    let amount = round(amount, decimals);
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    match currency_style(currency) {
        Some(style) => {
            let digits = group_digits(amount.abs(), decimals, style.thousands, style.decimal);
            if style.prefix {
                format!("{}{}{}", sign, style.symbol, digits)
            } else {
                format!("{}{} {}", sign, digits, style.symbol)
            }
        }
        None => {
            let digits = group_digits(amount.abs(), decimals, ',', '.');
            format!("{}{} {}", sign, currency.to_ascii_uppercase(), digits)
        }
    }
}

/// Format a number with Vietnamese separators (`1.234.567,5`).
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let value = round(value, decimals);
    let digits = group_digits(value.abs(), decimals, '.', ',');
    if value.is_sign_negative() && !value.is_zero() {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Format a fraction as a percentage: `0.256` → `25.60%`.
pub fn format_percentage(fraction: Decimal, decimals: u32) -> String {
    let percent = fraction
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(if fraction.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        });
    format!("{:.*}%", decimals as usize, round(percent, decimals))
}

/// Read an amount out of user text, ignoring everything but digits, `.`
/// and `-`. The longest leading number wins (`1.234.567` → `1.234`);
/// text with no leading number gives 0.
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    number_prefix(&cleaned)
        .and_then(|number| number.parse().ok())
        .unwrap_or(Decimal::ZERO)
}

/// `-?digits(.digits)?` at the start of `text`, trailing dot dropped and
/// a bare leading dot given a zero.
fn number_prefix(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let start = usize::from(negative);
    let digits_end = |from: usize| {
        from + bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
    };

    let int_end = digits_end(start);
    let mut number = text[start..int_end].to_string();
    if bytes.get(int_end) == Some(&b'.') {
        let frac_end = digits_end(int_end + 1);
        if frac_end > int_end + 1 {
            if number.is_empty() {
                number.push('0');
            }
            number.push_str(&text[int_end..frac_end]);
        }
    }
    if number.is_empty() {
        return None;
    }
    if negative {
        number.insert(0, '-');
    }
    Some(number)
}

fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

fn group_digits(value: Decimal, decimals: u32, thousands: char, decimal: char) -> String {
    let fixed = format!("{:.*}", decimals as usize, round(value, decimals));
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push(decimal);
        grouped.push_str(frac);
    }
    grouped
}

/// Format a date with `DD/MM/YYYY`-style tokens.
///
/// Tokens: `YYYY`, `YY`, `MM`, `M`, `DD`, `D`, `HH`, `H`, `mm`, `ss`.
/// Text inside `[...]` is copied as is.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    render(pattern, date.and_time(chrono::NaiveTime::MIN))
}

pub fn format_timestamp(at: DateTime<Utc>, pattern: &str) -> String {
    render(pattern, at.naive_utc())
}

/// `DD/MM/YYYY HH:mm`.
pub fn format_date_time(at: DateTime<Utc>) -> String {
    format_timestamp(at, DATE_TIME_FORMAT)
}

const TOKENS: [&str; 10] = ["YYYY", "YY", "MM", "M", "DD", "D", "HH", "H", "mm", "ss"];

fn render(pattern: &str, at: NaiveDateTime) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(literal) = rest.strip_prefix('[') {
            if let Some(end) = literal.find(']') {
                out.push_str(&literal[..end]);
                rest = &literal[end + 1..];
                continue;
            }
        }
        match TOKENS.iter().find(|token| rest.starts_with(*token)) {
            Some(token) => {
                out.push_str(&token_value(token, at));
                rest = &rest[token.len()..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }
    }
    out
}

fn token_value(token: &str, at: NaiveDateTime) -> String {
    match token {
        "YYYY" => format!("{:04}", at.year()),
        "YY" => format!("{:02}", at.year().rem_euclid(100)),
        "MM" => format!("{:02}", at.month()),
        "M" => at.month().to_string(),
        "DD" => format!("{:02}", at.day()),
        "D" => at.day().to_string(),
        "HH" => format!("{:02}", at.hour()),
        "H" => at.hour().to_string(),
        "mm" => format!("{:02}", at.minute()),
        "ss" => format!("{:02}", at.second()),
        _ => token.to_string(),
    }
}

/// Human distance between `at` and `now`, e.g. `2 days ago` or
/// `in 3 hours`.
pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(at);
    let future = delta.num_seconds() < 0;
    let seconds = delta.num_seconds().abs();
    let minutes = (seconds as f64 / 60.0).round() as i64;
    let hours = (seconds as f64 / 3600.0).round() as i64;
    let days = (seconds as f64 / 86_400.0).round() as i64;

    let phrase = if seconds < 45 {
        "a few seconds".to_string()
    } else if seconds < 90 {
        "a minute".to_string()
    } else if minutes < 45 {
        format!("{} minutes", minutes)
    } else if minutes < 90 {
        "an hour".to_string()
    } else if hours < 22 {
        format!("{} hours", hours)
    } else if hours < 36 {
        "a day".to_string()
    } else if days < 26 {
        format!("{} days", days)
    } else if days < 46 {
        "a month".to_string()
    } else if days < 320 {
        format!("{} months", ((days as f64) / 30.4).round() as i64)
    } else if days < 548 {
        "a year".to_string()
    } else {
        format!("{} years", ((days as f64) / 365.0).round() as i64)
    };

    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

/// Cut `text` to `max_chars` characters and append `...` when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
