//! Locale-dependent number and date layouts.
//!
//! Only the separators and date patterns the admin UI actually ships with
//! are tabulated; unknown languages fall back to English.

use chrono::{NaiveDateTime, NaiveTime};

use crate::renderer::MAX_FRACTION_DIGITS;

/// Separators and date/time patterns for one display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleSymbols {
    pub group: &'static str,
    pub decimal: &'static str,
    pub date_medium: &'static str,
    pub time_medium: &'static str,
    pub time_short: &'static str,
    /// Joins the date and time halves of a date-time.
    pub date_time_joiner: &'static str,
}

const ENGLISH: LocaleSymbols = LocaleSymbols {
    group: ",",
    decimal: ".",
    date_medium: "%b %-d, %Y",
    time_medium: "%-I:%M:%S %p",
    time_short: "%-I:%M %p",
    date_time_joiner: ", ",
};

const CYRILLIC: LocaleSymbols = LocaleSymbols {
    group: "\u{a0}",
    decimal: ",",
    date_medium: "%d.%m.%Y",
    time_medium: "%H:%M:%S",
    time_short: "%H:%M",
    date_time_joiner: " ",
};

const GERMANIC: LocaleSymbols = LocaleSymbols {
    group: ".",
    decimal: ",",
    date_medium: "%d.%m.%Y",
    time_medium: "%H:%M:%S",
    time_short: "%H:%M",
    date_time_joiner: " ",
};

const ROMANCE: LocaleSymbols = LocaleSymbols {
    group: ".",
    decimal: ",",
    date_medium: "%d/%m/%Y",
    time_medium: "%H:%M:%S",
    time_short: "%H:%M",
    date_time_joiner: " ",
};

const FRENCH: LocaleSymbols = LocaleSymbols {
    group: "\u{202f}",
    decimal: ",",
    date_medium: "%d/%m/%Y",
    time_medium: "%H:%M:%S",
    time_short: "%H:%M",
    date_time_joiner: " ",
};

impl LocaleSymbols {
    /// Looks up a locale tag such as `en-US`, `ru_RU` or `de`.
    pub fn for_locale(locale: &str) -> Self {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match language.as_str() {
            "ru" | "uk" | "be" | "kk" | "pl" | "cs" | "sk" => CYRILLIC,
            "de" | "tr" | "da" => GERMANIC,
            "it" | "es" | "pt" | "nl" => ROMANCE,
            "fr" => FRENCH,
            _ => ENGLISH,
        }
    }
}

impl Default for LocaleSymbols {
    fn default() -> Self {
        ENGLISH
    }
}

/// Fixed-point number layout with locale grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    min_fraction: usize,
    max_fraction: usize,
    group: &'static str,
    decimal: &'static str,
}

impl NumberFormat {
    pub fn new(symbols: &LocaleSymbols, min_fraction: usize, max_fraction: usize) -> Self {
        let max_fraction = max_fraction.min(MAX_FRACTION_DIGITS as usize);
        Self {
            min_fraction: min_fraction.min(max_fraction),
            max_fraction,
            group: symbols.group,
            decimal: symbols.decimal,
        }
    }

    pub fn min_fraction(&self) -> usize {
        self.min_fraction
    }

    pub fn max_fraction(&self) -> usize {
        self.max_fraction
    }

    /// Rounds to `max_fraction` digits, trims trailing zeros down to
    /// `min_fraction` and groups the integer part in threes.
    pub fn format(&self, value: f64) -> String {
        let fixed = format!("{:.*}", self.max_fraction, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (fixed.as_str(), ""),
        };

        let mut frac = frac_part.to_string();
        while frac.len() > self.min_fraction && frac.ends_with('0') {
            frac.pop();
        }

        let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
        let mut out = String::with_capacity(fixed.len() + 8);
        if negative {
            out.push('-');
        }
        out.push_str(&group_digits(int_part, self.group));
        if !frac.is_empty() {
            out.push_str(self.decimal);
            out.push_str(&frac);
        }
        out
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// A strftime pattern bound to one column kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, value: &NaiveDateTime) -> String {
        value.format(&self.pattern).to_string()
    }

    pub fn format_time(&self, value: &NaiveTime) -> String {
        value.format(&self.pattern).to_string()
    }
}
