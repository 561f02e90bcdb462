use std::{
    path::Path,
    process::{Command, Stdio},
};

/// Sources the shell config in a throwaway `bash`. This cannot change the
/// calling shell's environment; it only surfaces syntax errors early, so any
/// failure is logged and otherwise ignored.
pub fn source_rc_file(rc_file_path: &Path) {
    let script = format!("source {}", single_quote(&rc_file_path.to_string_lossy()));

    match Command::new("bash")
        .arg("-c")
        .arg(&script)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => log::debug!("Sourced {}", rc_file_path.display()),
        Ok(status) => log::warn!(
            "Sourcing {} exited with {}",
            rc_file_path.display(),
            status
        ),
        Err(error) => log::warn!(
            "Failed to run bash to source {}: {}",
            rc_file_path.display(),
            error
        ),
    }
}

fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quote() {
        assert_eq!(single_quote("/home/me/.bashrc"), "'/home/me/.bashrc'");
        assert_eq!(single_quote("/tmp/it's"), r"'/tmp/it'\''s'");
    }

    #[test]
    fn test_missing_file_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        source_rc_file(&dir.path().join("does-not-exist"));
    }
}
