use std::path::{Path, PathBuf};

use error_stack::{Result, ResultExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AliasWriterError {
    #[error("Failed to read shell config file")]
    Read,
    #[error("Failed to write shell config file")]
    Write,
}

/// `alias <name>='echo <value>'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDefinition<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> AliasDefinition<'a> {
    pub fn new(name: &'a str, value: &'a str) -> Self {
        AliasDefinition { name, value }
    }

    /// Lines whose trimmed content starts with this define the same alias.
    fn prefix(&self) -> String {
        format!("alias {}=", self.name)
    }

    /// The value sits inside single quotes, so embedded quotes are closed,
    /// escaped and reopened. Line breaks become spaces to keep the
    /// definition on one line.
    pub fn line(&self) -> String {
        let value = self
            .value
            .replace("\r\n", " ")
            .replace(['\r', '\n'], " ")
            .replace('\'', r"'\''");
        format!("alias {}='echo {}'\n", self.name, value)
    }
}

/// Drops every existing definition of the alias and appends the new one.
/// Retained lines keep their exact bytes, terminators included.
pub fn rewrite_rc_contents(contents: &str, alias: &AliasDefinition) -> String {
    let prefix = alias.prefix();
    let mut rewritten = String::with_capacity(contents.len() + alias.value.len() + 32);

    for line in contents.split_inclusive('\n') {
        if !line.trim().starts_with(&prefix) {
            rewritten.push_str(line);
        }
    }

    if !rewritten.is_empty() && !rewritten.ends_with('\n') {
        rewritten.push('\n');
    }
    rewritten.push_str(&alias.line());
    rewritten
}

/// Rewrites a shell startup file in full. There is no partial-write
/// protection: a crash between truncation and write leaves the file short.
#[derive(Debug, Clone)]
pub struct AliasWriter {
    rc_file_path: PathBuf,
}

impl AliasWriter {
    pub fn new(rc_file_path: impl Into<PathBuf>) -> Self {
        AliasWriter {
            rc_file_path: rc_file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.rc_file_path
    }

    pub fn write(&self, alias: &AliasDefinition) -> Result<(), AliasWriterError> {
        let contents = std::fs::read_to_string(&self.rc_file_path)
            .change_context(AliasWriterError::Read)
            .attach_printable_lazy(|| {
                format!("Shell config file: {}", self.rc_file_path.display())
            })?;

        let rewritten = rewrite_rc_contents(&contents, alias);

        std::fs::write(&self.rc_file_path, rewritten)
            .change_context(AliasWriterError::Write)
            .attach_printable_lazy(|| {
                format!("Shell config file: {}", self.rc_file_path.display())
            })?;

        log::debug!(
            "Wrote alias {} to {}",
            alias.name,
            self.rc_file_path.display()
        );
        Ok(())
    }
}
