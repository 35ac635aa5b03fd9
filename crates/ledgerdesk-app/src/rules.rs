// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::TypeOption;

pub const MAX_NUMBER_LEN: usize = 3;

/// Rank of each digit, indexed by the digit itself. Zero outranks nine.
const DIGIT_PRIORITY: [u8; 10] = [10, 1, 2, 3, 4, 5, 6, 7, 8, 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    ExceedsLength,
    FailsPriorityCheck,
    NonPositiveAmount,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExceedsLength => f.write_str("number cannot exceed 3 digits"),
            Self::FailsPriorityCheck => {
                f.write_str("three digit number does not pass priority check")
            }
            Self::NonPositiveAmount => f.write_str("amount must be greater than zero"),
        }
    }
}

impl std::error::Error for FieldError {}

pub fn digit_priority(digit: u8) -> Option<u8> {
    DIGIT_PRIORITY.get(usize::from(digit)).copied()
}

/// True when digit ranks never drop from left to right. Anything that is not
/// a single decimal digit makes the sequence invalid.
pub fn is_valid_three_digit(digits: &[u8]) -> bool {
    let mut previous: Option<u8> = None;
    for &digit in digits {
        let Some(rank) = digit_priority(digit) else {
            return false;
        };
        if let Some(previous) = previous
            && previous > rank
        {
            return false;
        }
        previous = Some(rank);
    }
    true
}

pub fn number_len(number: &str) -> usize {
    number.chars().count()
}

pub fn validate_number(number: &str) -> Option<FieldError> {
    let len = number_len(number);
    if len > MAX_NUMBER_LEN {
        return Some(FieldError::ExceedsLength);
    }
    if len < MAX_NUMBER_LEN {
        return None;
    }

    let digits = number
        .chars()
        .map(|ch| ch.to_digit(10).map(|digit| digit as u8))
        .collect::<Option<Vec<_>>>();
    match digits {
        Some(digits) if is_valid_three_digit(&digits) => None,
        _ => Some(FieldError::FailsPriorityCheck),
    }
}

/// Parses amount input; blank, non-numeric and non-finite input yields `None`.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn validate_amount(input: &str) -> Option<FieldError> {
    validate_amount_value(parse_amount(input).unwrap_or(0.0))
}

pub fn validate_amount_value(value: f64) -> Option<FieldError> {
    if value > 0.0 {
        None
    } else {
        Some(FieldError::NonPositiveAmount)
    }
}

/// Bet types a number of the given length may be recorded under, in the
/// order the reference list declares them.
pub fn eligible_types(number_length: usize, all_types: &[TypeOption]) -> Vec<TypeOption> {
    let allowed: &[&str] = match number_length {
        1 => &["open", "close"],
        2 => &["jodi"],
        3 => &["open pana", "close pana"],
        _ => &[],
    };
    all_types
        .iter()
        .filter(|option| {
            let label = option.label.to_lowercase();
            allowed.contains(&label.as_str())
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        FieldError, digit_priority, eligible_types, is_valid_three_digit, parse_amount,
        validate_amount, validate_amount_value, validate_number,
    };
    use crate::TypeOption;

    fn type_list() -> Vec<TypeOption> {
        vec![
            TypeOption::new(2, "Jodi"),
            TypeOption::new(3, "Open Pana"),
            TypeOption::new(4, "Open"),
            TypeOption::new(7, "CLOSE"),
            TypeOption::new(9, "close pana"),
            TypeOption::new(11, "Half Sangam"),
        ]
    }

    #[test]
    fn zero_outranks_every_other_digit() {
        assert_eq!(digit_priority(0), Some(10));
        assert_eq!(digit_priority(9), Some(9));
        assert_eq!(digit_priority(1), Some(1));
        assert_eq!(digit_priority(10), None);
    }

    #[test]
    fn three_digit_priority_cases() {
        let cases: [([u8; 3], bool); 8] = [
            ([1, 2, 3], true),
            ([8, 9, 0], true),
            ([8, 9, 9], true),
            ([5, 5, 5], true),
            ([0, 0, 0], true),
            ([9, 9, 8], false),
            ([9, 0, 1], false),
            ([3, 2, 1], false),
        ];
        for (digits, expected) in cases {
            assert_eq!(is_valid_three_digit(&digits), expected, "digits {digits:?}");
        }
    }

    #[test]
    fn exhaustive_three_digit_matches_rank_order() {
        for value in 0..1000u16 {
            let digits = [
                (value / 100) as u8,
                ((value / 10) % 10) as u8,
                (value % 10) as u8,
            ];
            let ranks = digits.map(|digit| digit_priority(digit).expect("digit rank"));
            let expected = ranks[0] <= ranks[1] && ranks[1] <= ranks[2];
            assert_eq!(is_valid_three_digit(&digits), expected, "digits {digits:?}");
        }
    }

    #[test]
    fn out_of_range_digit_is_invalid() {
        assert!(!is_valid_three_digit(&[1, 12, 3]));
    }

    #[test]
    fn short_numbers_skip_priority_check() {
        for number in ["", "0", "9", "90", "21", "00"] {
            assert_eq!(validate_number(number), None, "number {number:?}");
        }
    }

    #[test]
    fn number_validation_errors() {
        assert_eq!(validate_number("1234"), Some(FieldError::ExceedsLength));
        assert_eq!(validate_number("901"), Some(FieldError::FailsPriorityCheck));
        assert_eq!(validate_number("1a2"), Some(FieldError::FailsPriorityCheck));
        assert_eq!(validate_number("890"), None);
    }

    #[test]
    fn amount_validation() {
        assert_eq!(validate_amount("10"), None);
        assert_eq!(validate_amount(" 2.5 "), None);
        for input in ["", "0", "-5", "abc", "inf", "NaN"] {
            assert_eq!(
                validate_amount(input),
                Some(FieldError::NonPositiveAmount),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn amount_value_must_be_positive() {
        assert_eq!(validate_amount_value(0.5), None);
        assert_eq!(
            validate_amount_value(0.0),
            Some(FieldError::NonPositiveAmount)
        );
        assert_eq!(
            validate_amount_value(f64::NAN),
            Some(FieldError::NonPositiveAmount)
        );
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("12"), Some(12.0));
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("12x"), None);
    }

    #[test]
    fn single_digit_types_are_open_and_close() {
        let types = eligible_types(1, &type_list());
        assert_eq!(
            types,
            vec![TypeOption::new(4, "Open"), TypeOption::new(7, "CLOSE")]
        );
    }

    #[test]
    fn two_digit_types_are_jodi_only() {
        let types = eligible_types(2, &type_list());
        assert_eq!(types, vec![TypeOption::new(2, "Jodi")]);
    }

    #[test]
    fn three_digit_types_are_panas_in_list_order() {
        let types = eligible_types(3, &type_list());
        assert_eq!(
            types,
            vec![
                TypeOption::new(3, "Open Pana"),
                TypeOption::new(9, "close pana"),
            ]
        );
    }

    #[test]
    fn other_lengths_have_no_types() {
        assert!(eligible_types(0, &type_list()).is_empty());
        assert!(eligible_types(4, &type_list()).is_empty());
    }
}
