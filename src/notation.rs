//! Translation between localized, Unicode-rich math notation and the ASCII notation the
//! engine parses.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::Standards;
use crate::error::Result;

lazy_static! {
    static ref DEFAULT_THOUSANDS: Regex =
        Regex::new(r"\b([1-9]\d{0,2})((?:\.\d{3})+)(\D|$)").expect("valid regex");
    static ref DEFAULT_DECIMAL: Regex = Regex::new(r"(\d+),(\d+)").expect("valid regex");
    static ref SCIENTIFIC: Regex =
        Regex::new(r"(^|[^\w.])(\d+(?:\.\d+)?)[eE]([+-]?\d+)\b").expect("valid regex");
    static ref IMPLICIT_PRODUCT: Regex =
        Regex::new(r"(^|[^\w.])(\d+(?:\.\d+)?)([a-zA-Zπ])").expect("valid regex");
    static ref NUMERIC_FRACTION: Regex =
        Regex::new(r"(^|[^\w.])(\d+(?:\.\d+)?)/(\d+(?:\.\d+)?)").expect("valid regex");
    static ref RADICAL: Regex =
        Regex::new(r"√(\d+(?:\.\d+)?|[a-zA-Zπ][a-zA-Z0-9_]*)").expect("valid regex");
    static ref NUMERIC_POWER: Regex =
        Regex::new(r"(^|[^\w.])(\d+(?:\.\d+)?)\^(\d+(?:\.\d+)?)").expect("valid regex");
    static ref INFINITY_WORD: Regex = Regex::new(r"(?i)infinity").expect("valid regex");
    static ref PI_WORD: Regex = Regex::new(r"\bpi\b").expect("valid regex");
    static ref EULER_POWER: Regex = Regex::new(r"\be\^").expect("valid regex");
    static ref IMAGINARY_UNIT: Regex = Regex::new(r"\bi\b").expect("valid regex");
}

/// Glyph swaps applied after the numeric rewrites, in order.
const GLYPHS: &[(&str, &str)] = &[
    ("×", "·"),
    ("÷", "/"),
    ("√", "sqrt"),
    ("−", "-"),
    ("≤", "<="),
    ("≥", ">="),
    ("≠", "!="),
];

/// Options for [`Notation::format_number`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Digits after the decimal separator.
    pub precision: usize,
    pub use_eu_format: bool,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            precision: 2,
            use_eu_format: true,
        }
    }
}

/// Notation rewriting for one set of locale standards.
#[derive(Clone, Debug)]
pub struct Notation {
    standards: Standards,
    thousands: Regex,
    decimal: Regex,
}

impl Notation {
    pub fn new(standards: &Standards) -> Result<Self> {
        let thousands = regex::escape(&standards.thousands);
        let decimal = regex::escape(&standards.decimal);
        Ok(Notation {
            standards: standards.clone(),
            thousands: Regex::new(&format!(
                r"\b([1-9]\d{{0,2}})((?:{thousands}\d{{3}})+)(\D|$)"
            ))?,
            decimal: Regex::new(&format!(r"(\d+){decimal}(\d+)"))?,
        })
    }

    pub fn standards(&self) -> &Standards {
        &self.standards
    }

    /// Rewrite user notation into engine notation.
    ///
    /// Thousands groups are removed before the decimal separator is swapped, so that
    /// `1.234,5` reads as `1234.5`. A three-digit group after the thousands separator is
    /// always taken as a group: with the default standards `1.234` and `1.234x` both read
    /// as `1234`. A leading zero never starts a group, so `0.125` keeps its point.
    pub fn preprocess(&self, text: &str) -> String {
        let separator = self.standards.thousands.as_str();
        let mut out = text.to_string();

        rewrite(&mut out, "thousands", &self.thousands, |c| {
            format!("{}{}{}", &c[1], c[2].replace(separator, ""), &c[3])
        });
        rewrite(&mut out, "decimal", &self.decimal, |c| format!("{}.{}", &c[1], &c[2]));
        rewrite(&mut out, "scientific", &SCIENTIFIC, |c| {
            format!("{}{}·10^{}", &c[1], &c[2], &c[3])
        });
        rewrite(&mut out, "implicit product", &IMPLICIT_PRODUCT, |c| {
            format!("{}{}·{}", &c[1], &c[2], &c[3])
        });
        rewrite(&mut out, "fraction", &NUMERIC_FRACTION, |c| {
            format!("{}({})÷({})", &c[1], &c[2], &c[3])
        });
        rewrite(&mut out, "root", &RADICAL, |c| format!("sqrt({})", &c[1]));
        rewrite(&mut out, "power", &NUMERIC_POWER, |c| {
            format!("{}pow({},{})", &c[1], &c[2], &c[3])
        });

        for (glyph, ascii) in GLYPHS {
            if out.contains(glyph) {
                out = out.replace(glyph, ascii);
            }
        }
        out
    }

    /// Rewrite engine output into display notation.
    pub fn format_with_proper_notation(&self, text: &str) -> String {
        let glyphs = &self.standards.notation;
        let out = text
            .replace("<=", "≤")
            .replace(">=", "≥")
            .replace("!=", "≠")
            .replace('*', &glyphs.multiplication)
            .replace('/', &glyphs.division)
            .replace("sqrt", &glyphs.square_root);
        let out = INFINITY_WORD.replace_all(&out, glyphs.infinity.as_str());
        let out = PI_WORD.replace_all(&out, glyphs.pi.as_str());
        let euler = format!("{}^", glyphs.euler);
        let out = EULER_POWER.replace_all(&out, regex::NoExpand(&euler));
        IMAGINARY_UNIT
            .replace_all(&out, glyphs.imaginary.as_str())
            .into_owned()
    }

    /// Fixed-point rendering. In EU format the integer digits are grouped with the
    /// thousands separator and the decimal point becomes the decimal separator.
    pub fn format_number(&self, number: f64, format: NumberFormat) -> String {
        if number.is_nan() {
            return "NaN".to_string();
        }
        if number.is_infinite() {
            let sign = if number < 0.0 { "-" } else { "" };
            return format!("{sign}{}", self.standards.notation.infinity);
        }
        let fixed = format!("{:.*}", format.precision, number);
        if !format.use_eu_format {
            return fixed;
        }

        let (sign, unsigned) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (unsigned, None),
        };
        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push_str(&self.standards.thousands);
            }
            grouped.push(digit);
        }
        match fraction {
            Some(fraction) => format!("{sign}{grouped}{}{fraction}", self.standards.decimal),
            None => format!("{sign}{grouped}"),
        }
    }
}

impl Default for Notation {
    fn default() -> Self {
        Notation {
            standards: Standards::default(),
            thousands: DEFAULT_THOUSANDS.clone(),
            decimal: DEFAULT_DECIMAL.clone(),
        }
    }
}

fn rewrite(text: &mut String, rule: &str, pattern: &Regex, replace: impl FnMut(&Captures) -> String) {
    let rewritten = match pattern.replace_all(text, replace) {
        Cow::Owned(rewritten) => rewritten,
        Cow::Borrowed(_) => return,
    };
    trace!(rule, from = %text, to = %rewritten, "rewrote notation");
    *text = rewritten;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_notation_is_not_split_by_implicit_products() {
        let notation = Notation::default();
        assert_eq!(notation.preprocess("1.5e3"), "1.5·pow(10,3)");
    }

    #[test]
    fn numeric_rewrites_keep_decimals_intact() {
        let notation = Notation::default();
        assert_eq!(notation.preprocess("12,5^2"), "pow(12.5,2)");
        assert_eq!(notation.preprocess("1,5/2"), "(1.5)/(2)");
        assert_eq!(notation.preprocess("√x"), "sqrt(x)");
    }

    #[test]
    fn groups_only_integer_digits() {
        let notation = Notation::default();
        assert_eq!(notation.format_number(-1234567.891, NumberFormat::default()), "-1.234.567,89");
    }
}
