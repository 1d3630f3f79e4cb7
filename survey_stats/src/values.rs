use std::collections::BTreeMap;
use std::fmt::Display;

/// The value of the "zero" statistic, used when there is nothing to divide by.
pub const DEFAULT_ZERO_VALUE: f64 = 0.0;

/// A value that replaces a `{{name}}` placeholder.
#[derive(PartialEq, Debug, Clone)]
pub enum PlaceholderValue {
    /// Printed with the shared number formatting: no decimal point for whole numbers.
    Number(f64),
    /// Printed as is: percentages, the "too few answers" text, names.
    Text(String),
    /// Bullet points. Lists are expanded into paragraphs, never substituted inline.
    List(Vec<String>),
}

impl PlaceholderValue {
    /// The inline replacement text, or `None` for lists.
    pub fn as_inline(&self) -> Option<String> {
        match self {
            PlaceholderValue::Number(x) => Some(format_plain(*x)),
            PlaceholderValue::Text(s) => Some(s.clone()),
            PlaceholderValue::List(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PlaceholderValue::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Empty texts and numbers that are not finite are not acceptable in a report.
    pub fn is_resolved(&self) -> bool {
        match self {
            PlaceholderValue::Number(x) => x.is_finite(),
            PlaceholderValue::Text(s) => !s.is_empty(),
            PlaceholderValue::List(_) => true,
        }
    }
}

impl Display for PlaceholderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceholderValue::List(items) => write!(f, "{:?}", items),
            v => write!(f, "{}", v.as_inline().unwrap_or_default()),
        }
    }
}

/// Placeholder name to value.
pub type PlaceholderMap = BTreeMap<String, PlaceholderValue>;

/// Rounds to the given number of decimals.
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(15) as i32);
    let r = (x * factor).round() / factor;
    // No negative zero in the reports.
    r + 0.0
}

/// Formats a number for a report.
///
/// Whole numbers are printed without a decimal point, other numbers are rounded to
/// `decimals` places and printed without trailing zeros.
pub fn format_number(x: f64, decimals: u32) -> String {
    if !x.is_finite() || x.fract() == 0.0 {
        return format_plain(x);
    }
    format_plain(round_to(x, decimals))
}

/// Formats a number that is already rounded.
pub fn format_plain(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{:.0}", x + 0.0)
    } else {
        format!("{}", x)
    }
}

/// The percentage `count / total`, formatted with a percent sign.
///
/// A zero total gives the zero value.
pub fn format_percent(count: usize, total: usize, decimals: u32) -> String {
    let pct = percentage(count, total);
    format!("{}%", format_number(pct, decimals))
}

pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        DEFAULT_ZERO_VALUE
    } else {
        count as f64 / total as f64 * 100.0
    }
}
