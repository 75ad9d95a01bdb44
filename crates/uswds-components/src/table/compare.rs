//! Cell value comparison
//!
//! Two cells compare numerically when both parse as finite numbers and
//! through [`Collator`] otherwise.

use std::cmp::Ordering;

/// Compare two cell values in ascending order
pub fn compare_values(a: &str, b: &str, collator: &Collator) -> Ordering {
    if let (Some(x), Some(y)) = (parse_number(a), parse_number(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    collator.compare(a, b)
}

/// Finite number in `value`, ignoring surrounding whitespace
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Collation key unit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Unit {
    /// Digit run, leading zeros stripped. Compares by length, then digits.
    Number(usize, String),
    /// Folded letter plus a variant rank for letters that sort right after
    /// their base letter in the active language
    Letter(char, u8),
}

/// Numeric-aware, case- and accent-insensitive string ordering.
/// Punctuation and whitespace are ignored. Ties are broken with lowercase
/// before uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collator {
    turkic: bool,
}

impl Collator {
    /// Collator for a BCP 47 language tag such as `en-US` or `tr`
    pub fn new(language: &str) -> Self {
        let primary = language
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self {
            turkic: matches!(primary.as_str(), "tr" | "az"),
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a)
            .cmp(&self.key(b))
            .then_with(|| tie_break(a, b))
    }

    fn key(&self, s: &str) -> Vec<Unit> {
        let mut units = Vec::new();
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                let mut digits = String::from(c);
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    digits.push(d);
                    chars.next();
                }
                let significant = digits.trim_start_matches('0').to_string();
                units.push(Unit::Number(significant.len(), significant));
            } else if c.is_alphanumeric() {
                units.push(self.fold(c));
            }
        }
        units
    }

    fn fold(&self, c: char) -> Unit {
        if self.turkic {
            // Dotless ı sorts before i; ç ğ ö ş ü follow their base letter
            match c {
                'I' | 'ı' => return Unit::Letter('i', 0),
                'İ' | 'i' => return Unit::Letter('i', 1),
                'Ç' | 'ç' => return Unit::Letter('c', 1),
                'Ğ' | 'ğ' => return Unit::Letter('g', 1),
                'Ö' | 'ö' => return Unit::Letter('o', 1),
                'Ş' | 'ş' => return Unit::Letter('s', 1),
                'Ü' | 'ü' => return Unit::Letter('u', 1),
                _ => {}
            }
        }

        let lower = match c {
            'İ' => 'i',
            _ => c.to_lowercase().next().unwrap_or(c),
        };
        let base = strip_accent(lower);
        // Non-Turkic languages keep ı and i distinct at the letter level,
        // ranking ı right after i
        match base {
            'ı' => Unit::Letter('i', 1),
            _ => Unit::Letter(base, 0),
        }
    }
}

impl Default for Collator {
    fn default() -> Self {
        Self::new("en-US")
    }
}

/// Tertiary ordering between primary-equal strings
fn tie_break(a: &str, b: &str) -> Ordering {
    let letters = |s: &str| s.chars().filter(|c| c.is_alphanumeric()).collect::<Vec<_>>();
    for (x, y) in letters(a).into_iter().zip(letters(b)) {
        if x == y {
            continue;
        }
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return x.cmp(&y),
        }
    }
    a.cmp(b)
}

fn strip_accent(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}
