//! Roman numeral codec.
//!
//! LATIN's only numeric literal form is the Roman numeral; `NIHIL` is the
//! reserved spelling for zero. This module is deliberately lenient: it does
//! not reject non-canonical spellings like `IIII` on the way in (see
//! `parse`), but `format` always emits the canonical subtractive form, so a
//! round trip through `format` is always canonical even when the original
//! source was not. Preserving rather than tightening this leniency is a
//! deliberate choice, matching the original prototype's own parser.

/// The literal that spells zero (and "nothing") in source code.
pub const NIHIL: &str = "NIHIL";

/// Canonical numeral table, highest value first, used by both codec
/// directions.
const VALUES: &[(i64, &str)] = &[
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

fn char_value(c: char) -> Option<i64> {
    match c {
        'M' => Some(1000),
        'D' => Some(500),
        'C' => Some(100),
        'L' => Some(50),
        'X' => Some(10),
        'V' => Some(5),
        'I' => Some(1),
        _ => None,
    }
}

/// Parse a Roman numeral string into an integer.
///
/// Reads right to left: a character whose value is less than the running
/// maximum is subtracted, otherwise added. Returns `None` if any character
/// is not one of `MDCLXVI`, or if the total is not strictly positive.
///
/// Does not validate classical spelling rules — `IIII` parses to `4`.
pub fn parse(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    let mut total = 0i64;
    let mut running_max = 0i64;
    for c in s.chars().rev() {
        let value = char_value(c)?;
        if value < running_max {
            total -= value;
        } else {
            total += value;
            running_max = value;
        }
    }
    // Any non-empty run of valid characters sums positive under this rule;
    // the guard only matters if that ever stops being true.
    if total > 0 {
        Some(total)
    } else {
        None
    }
}

/// Format an integer as a Roman numeral, or `NIHIL` for non-positive values.
pub fn format(n: i64) -> String {
    if n <= 0 {
        return NIHIL.to_string();
    }
    let mut remaining = n;
    let mut out = String::new();
    for &(value, numeral) in VALUES {
        while remaining >= value {
            out.push_str(numeral);
            remaining -= value;
        }
    }
    out
}

/// Scan the maximal run of Roman-numeral-eligible characters at the start
/// of `s`. Used by the tokenizer's rule 5; does not itself validate that
/// the run parses to a positive integer.
pub fn scan_numeral_run(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|(_, c)| char_value(*c).is_none())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_zero_and_negative() {
        assert_eq!(format(0), "NIHIL");
        assert_eq!(format(-5), "NIHIL");
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(format(1), "I");
        assert_eq!(format(4), "IV");
        assert_eq!(format(5), "V");
        assert_eq!(format(9), "IX");
        assert_eq!(format(14), "XIV");
        assert_eq!(format(40), "XL");
        assert_eq!(format(90), "XC");
        assert_eq!(format(944), "CMXLIV");
        assert_eq!(format(1994), "MCMXCIV");
        assert_eq!(format(3999), "MMMCMXCIX");
    }

    #[test]
    fn test_parse_canonical() {
        assert_eq!(parse("I"), Some(1));
        assert_eq!(parse("IV"), Some(4));
        assert_eq!(parse("IX"), Some(9));
        assert_eq!(parse("MCMXCIV"), Some(1994));
        assert_eq!(parse("V"), Some(5));
        assert_eq!(parse("III"), Some(3));
    }

    #[test]
    fn test_parse_lenient_non_canonical() {
        // IIII is not canonical, but the codec does not reject it.
        assert_eq!(parse("IIII"), Some(4));
    }

    #[test]
    fn test_parse_rejects_unknown_chars() {
        assert_eq!(parse("IIJ"), None);
        assert_eq!(parse(""), None);
    }

    proptest! {
        #[test]
        fn prop_parse_format_roundtrip(n in 1i64..4000) {
            prop_assert_eq!(parse(&format(n)), Some(n));
        }

        #[test]
        fn prop_format_nonpositive_is_nihil(n in i64::MIN..=0) {
            prop_assert_eq!(format(n), "NIHIL".to_string());
        }
    }
}
