//! Dimension-name classifier.
//!
//! Inspection features arrive with free-form labels ("ITEM_12.1A 1X",
//! "12-1", "#12.16") and must be normalized to the balloon number printed on
//! the drawing ("INSP_12.1A"). Classification is an ordered rule table:
//! full-match patterns tried most-specific-first, first match wins, and a
//! label matching nothing passes through unchanged; the converter never
//! guesses a balloon number.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// How a matched rule derives the canonical label from its captures.
///
/// Every pattern captures `major` (and optionally `minor`); the trailing
/// feature is either an explicit `letter` capture or an `idx` capture whose
/// numeral is a 1-based index into the alphabet (1 → A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    /// Keep the captured letter as written.
    Letter,
    /// Map the captured numeral to a letter via the alphabet index.
    AlphabetIndex,
    /// No letter.
    None,
}

/// Rule patterns in specificity order; first full match wins.
///
/// The `ITEM|INSP`-prefixed forms come first, then the bare numeric forms,
/// and the prefixed bare-integer form is deliberately tried last. A trailing
/// `\d+X+` group is the repeated-measurement multiplier marker; it is
/// discarded except where its numeral is itself the alphabet index. The bare
/// forms also accept the marker without the `X` ("12-1") and a detached
/// letter ("12.1 A").
const RULE_PATTERNS: &[(Suffix, &str)] = &[
    // ITEM_12.1A 1X -> 12.1A
    (
        Suffix::Letter,
        r"^(?:ITEM|INSP)[ _-](?P<major>\d+)\.(?P<minor>\d+)(?P<letter>[A-Za-z])[ _-]\d+X+$",
    ),
    // ITEM-12.1_1X -> 12.1A
    (
        Suffix::AlphabetIndex,
        r"^(?:ITEM|INSP)[ _-](?P<major>\d+)\.(?P<minor>\d+)[ _-](?P<idx>\d+)X+$",
    ),
    // ITEM 12A 1X -> 12A
    (
        Suffix::Letter,
        r"^(?:ITEM|INSP)[ _-](?P<major>\d+)(?P<letter>[A-Za-z])[ _-]\d+X+$",
    ),
    // ITEM_12 1X -> 12A
    (
        Suffix::AlphabetIndex,
        r"^(?:ITEM|INSP)[ _-](?P<major>\d+)[ _-](?P<idx>\d+)X+$",
    ),
    // ITEM 12.16 -> 12.16
    (
        Suffix::None,
        r"^(?:ITEM|INSP)[ _-](?P<major>\d+)\.(?P<minor>\d+)$",
    ),
    // 12.1A_1X -> 12.1A
    (
        Suffix::Letter,
        r"^(?P<major>\d+)\.(?P<minor>\d+)(?P<letter>[A-Za-z])[ _-]\d+X+$",
    ),
    // 12A 1X -> 12A
    (
        Suffix::Letter,
        r"^(?P<major>\d+)(?P<letter>[A-Za-z])[ _-]\d+X+$",
    ),
    // 12.1 1X, 12.1-1 -> 12.1A
    (
        Suffix::AlphabetIndex,
        r"^(?P<major>\d+)\.(?P<minor>\d+)[ _-](?P<idx>\d+)X*$",
    ),
    // 12.1 A -> 12.1A
    (
        Suffix::Letter,
        r"^(?P<major>\d+)\.(?P<minor>\d+)[ _-](?P<letter>[A-Za-z])$",
    ),
    // 12.1A -> 12.1A
    (
        Suffix::Letter,
        r"^(?P<major>\d+)\.(?P<minor>\d+)(?P<letter>[A-Za-z])$",
    ),
    // 12.1 -> 12.1
    (Suffix::None, r"^(?P<major>\d+)\.(?P<minor>\d+)$"),
    // 12 1X, 12-1 -> 12A
    (
        Suffix::AlphabetIndex,
        r"^(?P<major>\d+)[ _-](?P<idx>\d+)X*$",
    ),
    // 12 A -> 12A
    (
        Suffix::Letter,
        r"^(?P<major>\d+)[ _-](?P<letter>[A-Za-z])$",
    ),
    // 12A -> 12A
    (Suffix::Letter, r"^(?P<major>\d+)(?P<letter>[A-Za-z])$"),
    // 12 -> 12
    (Suffix::None, r"^(?P<major>\d+)$"),
    // ITEM 12 -> 12, tried last
    (Suffix::None, r"^(?:ITEM|INSP)[ _-](?P<major>\d+)$"),
];

static RULES: Lazy<Vec<(Suffix, Regex)>> = Lazy::new(|| {
    RULE_PATTERNS
        .iter()
        .map(|(suffix, pattern)| (*suffix, Regex::new(pattern).expect("rule pattern compiles")))
        .collect()
});

/// Map a 1-based alphabet index numeral to its letter. `"0"` and anything
/// past `"26"` is invalid input and yields `None`.
fn alphabet_letter(numeral: &str) -> Option<char> {
    let n: u32 = numeral.parse().ok()?;
    if (1..=26).contains(&n) {
        char::from_u32('A' as u32 + n - 1)
    } else {
        None
    }
}

/// Normalize a raw dimension label to its canonical balloon-number form.
///
/// Pure function of `(raw_label, prefix)`. Leading `#` characters are
/// stripped before matching. Labels no rule recognizes are returned
/// unchanged, as are labels whose multiplier numeral is not a valid
/// alphabet index.
pub fn classify(raw_label: &str, prefix: &str) -> String {
    let label = raw_label.trim_start_matches('#');

    for (suffix, regex) in RULES.iter() {
        let Some(caps) = regex.captures(label) else {
            continue;
        };

        let letter = match suffix {
            Suffix::Letter => caps.name("letter").map(|m| m.as_str().to_string()),
            Suffix::AlphabetIndex => {
                let numeral = caps.name("idx").map(|m| m.as_str()).unwrap_or_default();
                match alphabet_letter(numeral) {
                    Some(c) => Some(c.to_string()),
                    None => {
                        warn!(label = raw_label, numeral, "multiplier is not a valid alphabet index");
                        return raw_label.to_string();
                    }
                }
            }
            Suffix::None => None,
        };

        let mut name = String::with_capacity(prefix.len() + label.len());
        name.push_str(prefix);
        name.push_str(&caps["major"]);
        if let Some(minor) = caps.name("minor") {
            name.push('.');
            name.push_str(minor.as_str());
        }
        if let Some(letter) = letter {
            name.push_str(&letter);
        }
        return name;
    }

    raw_label.to_string()
}
