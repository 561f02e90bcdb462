use std::fmt::Formatter;

use thiserror::Error;

/// 1-indexed spreadsheet column (`A` = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Column(pub u32);

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnParseError {
    #[error("Empty column")]
    Empty,
    #[error("Non-alphabetic character in column")]
    NonAlphabeticCharacter,
    #[error("Column out of range")]
    OutOfRange,
}

pub fn parse_col<T: AsRef<str>>(col_str: T) -> Result<Column, ColumnParseError> {
    let col_str = col_str.as_ref();
    if col_str.is_empty() {
        return Err(ColumnParseError::Empty);
    }
    if col_str.chars().any(|c| !c.is_ascii_alphabetic()) {
        return Err(ColumnParseError::NonAlphabeticCharacter);
    }

    col_str
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)
        })
        .map(Column)
        .ok_or(ColumnParseError::OutOfRange)
}

pub fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        let letter = (remainder as u8 + b'A') as char;
        result.push(letter);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_letter() {
        assert_eq!(parse_col("A"), Ok(Column(1)));
        assert_eq!(parse_col("z"), Ok(Column(26)));
    }

    #[test]
    fn test_parse_multiple_letters() {
        assert_eq!(parse_col("AA"), Ok(Column(27)));
        assert_eq!(parse_col("AZ"), Ok(Column(52)));
    }

    #[test]
    fn test_parse_rejects_digits() {
        assert_eq!(parse_col("A1"), Err(ColumnParseError::NonAlphabeticCharacter));
        assert_eq!(parse_col(""), Err(ColumnParseError::Empty));
    }

    #[test]
    fn test_number_to_letters() {
        assert_eq!(number_to_letters(1), "A");
        assert_eq!(number_to_letters(28), "AB");
        assert_eq!(number_to_letters(703), "AAA");
    }
}
