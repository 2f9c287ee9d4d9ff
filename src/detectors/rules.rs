//! Built-in normalization and validation rules
//!
//! Detector definitions reference these rules by identifier. The set is
//! fixed at compile time; an unknown identifier in a detector definition is
//! a configuration error at load time, never at runtime. No dynamic code is
//! ever executed from configuration.

/// Unicode dash codepoints folded to an ASCII hyphen before detection
const UNICODE_DASHES: [char; 5] = ['\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}'];

/// Non-breaking/thin/zero-width space codepoints folded to a plain space
const UNICODE_SPACES: [char; 5] = ['\u{00A0}', '\u{2007}', '\u{202F}', '\u{2009}', '\u{200B}'];

/// Normalize separator characters in a text value before running detectors
///
/// Maps the unicode NBSP family to ASCII space, the unicode dash family to
/// `-`, and collapses runs of horizontal whitespace into a single space.
/// Newlines are preserved so patterns anchored on line structure keep
/// working.
pub fn normalize_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_blank = false;

    for ch in text.chars() {
        let ch = if UNICODE_SPACES.contains(&ch) { ' ' } else { ch };
        let ch = if UNICODE_DASHES.contains(&ch) { '-' } else { ch };

        if matches!(ch, ' ' | '\t' | '\r' | '\u{0C}' | '\u{0B}') {
            if !in_blank {
                out.push(' ');
            }
            in_blank = true;
        } else {
            out.push(ch);
            in_blank = false;
        }
    }

    out
}

/// Zero-digit codepoints of the Unicode decimal digit (Nd) blocks
///
/// Each Nd block is a contiguous run of ten codepoints starting at its
/// zero digit, so a digit's value is its offset from the block start.
/// Sorted for binary search.
const ND_ZERO_POINTS: [u32; 37] = [
    0x0030, // ASCII
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x07C0, // NKo
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0x0DE6, // Sinhala
    0x0E50, // Thai
    0x0ED0, // Lao
    0x0F20, // Tibetan
    0x1040, // Myanmar
    0x1090, // Myanmar Shan
    0x17E0, // Khmer
    0x1810, // Mongolian
    0x1946, // Limbu
    0x19D0, // New Tai Lue
    0x1A80, // Tai Tham Hora
    0x1A90, // Tai Tham Tham
    0x1B50, // Balinese
    0x1BB0, // Sundanese
    0x1C40, // Lepcha
    0x1C50, // Ol Chiki
    0xA620, // Vai
    0xA8D0, // Saurashtra
    0xA900, // Kayah Li
    0xA9D0, // Javanese
    0xA9F0, // Myanmar Tai Laing
    0xAA50, // Cham
    0xABF0, // Meetei Mayek
    0xFF10, // Fullwidth
];

/// Decimal value of a Unicode decimal digit (category Nd), if `ch` is one
fn decimal_digit_value(ch: char) -> Option<u32> {
    let cp = ch as u32;
    let idx = match ND_ZERO_POINTS.binary_search(&cp) {
        Ok(i) => i,
        Err(0) => return None,
        Err(i) => i - 1,
    };
    let offset = cp - ND_ZERO_POINTS[idx];
    if offset <= 9 {
        Some(offset)
    } else {
        None
    }
}

/// Extract the decimal digits of a string as ASCII, dropping everything else
///
/// Unicode decimal digits (category Nd) are converted to their ASCII value,
/// so a SIN typed with Arabic-Indic or Devanagari digits normalizes the same
/// as its ASCII form.
fn ascii_digits(text: &str) -> String {
    text.chars()
        .filter_map(decimal_digit_value)
        .map(|d| char::from(b'0' + d as u8))
        .collect()
}

/// Normalization rule applied to a raw match before dedupe and reconciliation
///
/// A rule may reject the match outright by returning `None` (for example a
/// separator-laden candidate that does not contain exactly nine digits);
/// rejected candidates are silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeRule {
    /// Keep only decimal digits
    Digits,

    /// Canonical Canadian SIN form `###-###-###`; rejects anything that
    /// does not contain exactly nine digits
    SinFormat,

    /// Case-fold to lowercase (emails, URLs)
    Lowercase,

    /// Keep only ASCII alphanumerics, uppercased (codes such as RAMQ
    /// numbers and postal codes)
    AlnumUpper,

    /// Trim surrounding whitespace
    Trim,
}

impl NormalizeRule {
    /// Resolve a rule identifier from configuration
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "digits" => Ok(NormalizeRule::Digits),
            "sin-format" => Ok(NormalizeRule::SinFormat),
            "lowercase" => Ok(NormalizeRule::Lowercase),
            "alnum-upper" => Ok(NormalizeRule::AlnumUpper),
            "trim" => Ok(NormalizeRule::Trim),
            other => Err(format!(
                "Unknown normalize rule '{other}'. \
                 Must be one of: digits, sin-format, lowercase, alnum-upper, trim"
            )),
        }
    }

    /// Apply the rule, returning the canonical text or `None` to reject
    pub fn apply(&self, raw: &str) -> Option<String> {
        match self {
            NormalizeRule::Digits => {
                let digits = ascii_digits(raw);
                if digits.is_empty() {
                    None
                } else {
                    Some(digits)
                }
            }
            NormalizeRule::SinFormat => {
                let digits = ascii_digits(raw);
                if digits.len() != 9 {
                    return None;
                }
                Some(format!(
                    "{}-{}-{}",
                    &digits[0..3],
                    &digits[3..6],
                    &digits[6..9]
                ))
            }
            NormalizeRule::Lowercase => Some(raw.to_lowercase()),
            NormalizeRule::AlnumUpper => {
                let kept: String = raw
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_uppercase())
                    .collect();
                if kept.is_empty() {
                    None
                } else {
                    Some(kept)
                }
            }
            NormalizeRule::Trim => Some(raw.trim().to_string()),
        }
    }
}

/// Validation rule applied to the normalized value of a match
///
/// A failing validation silently drops the candidate; it is not an error
/// and produces no audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateRule {
    /// Mod-10 doubling checksum over the digit string (Canadian SIN)
    Luhn,

    /// ISO 7064 style mod-97 check; the digit string taken as a number
    /// must leave remainder 1
    Mod97,
}

impl ValidateRule {
    /// Resolve a rule identifier from configuration
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "luhn" => Ok(ValidateRule::Luhn),
            "mod97" => Ok(ValidateRule::Mod97),
            other => Err(format!(
                "Unknown validate rule '{other}'. Must be one of: luhn, mod97"
            )),
        }
    }

    /// Apply the rule to a normalized value
    pub fn apply(&self, normalized: &str) -> bool {
        let digits = ascii_digits(normalized);
        if digits.is_empty() {
            return false;
        }

        match self {
            ValidateRule::Luhn => luhn_check(&digits),
            ValidateRule::Mod97 => mod97_check(&digits),
        }
    }
}

/// Standard Luhn mod-10 check over an ASCII digit string
fn luhn_check(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, ch) in digits.chars().rev().enumerate() {
        let mut d = ch.to_digit(10).unwrap_or(0);
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Iterative mod-97 remainder check (remainder must be 1)
fn mod97_check(digits: &str) -> bool {
    let mut rem = 0u64;
    for ch in digits.chars() {
        let d = ch.to_digit(10).unwrap_or(0) as u64;
        rem = (rem * 10 + d) % 97;
    }
    rem == 1
}
