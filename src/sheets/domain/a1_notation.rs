use std::{fmt::Formatter, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use super::column::{parse_col, Column, ColumnParseError};

static CELL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?([A-Za-z]+)\$?([0-9]+)$").expect("cell pattern should compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum A1NotationParseError {
    #[error("Not a single cell reference: {0:?}")]
    NotACell(String),
    #[error("Error parsing column: {0}")]
    ColumnParseError(ColumnParseError),
    #[error("Row must be a positive number")]
    InvalidRow,
}

/// A single cell such as `B2` (absolute markers like `$B$2` are accepted and
/// dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellReference {
    pub col: Column,
    pub row: u32,
}

impl FromStr for CellReference {
    type Err = A1NotationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let captures = CELL_PATTERN
            .captures(s)
            .ok_or_else(|| A1NotationParseError::NotACell(s.to_string()))?;

        let col = parse_col(&captures[1]).map_err(A1NotationParseError::ColumnParseError)?;
        let row = captures[2]
            .parse::<u32>()
            .ok()
            .filter(|row| *row > 0)
            .ok_or(A1NotationParseError::InvalidRow)?;

        Ok(CellReference { col, row })
    }
}

impl std::fmt::Display for CellReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.col, self.row)
    }
}

impl ToA1Notation for CellReference {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        match sheet_name {
            Some(sheet_name) => A1Notation(format!("{}!{}", quote_sheet_name(sheet_name), self)),
            None => A1Notation(self.to_string()),
        }
    }
}

fn quote_sheet_name(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}
