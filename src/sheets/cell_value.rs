use serde_json::Value;

/// First value of the first row, rendered as text. Blank cells come back as
/// either no rows at all or an empty string.
pub fn first_cell_value(values: Option<Vec<Vec<Value>>>) -> Option<String> {
    let value = values?.into_iter().next()?.into_iter().next()?;

    let text = match value {
        Value::Null => return None,
        Value::String(text) => text,
        other => other.to_string(),
    };

    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rows(value: Value) -> Option<Vec<Vec<Value>>> {
        serde_json::from_value(value).ok()
    }

    #[test]
    fn test_string_value() {
        assert_eq!(
            first_cell_value(rows(json!([["Sprint 42"]]))),
            Some("Sprint 42".to_string())
        );
    }

    #[test]
    fn test_number_value() {
        assert_eq!(first_cell_value(rows(json!([[3.5]]))), Some("3.5".to_string()));
    }

    #[test]
    fn test_blank_cell() {
        assert_eq!(first_cell_value(None), None);
        assert_eq!(first_cell_value(rows(json!([]))), None);
        assert_eq!(first_cell_value(rows(json!([[]]))), None);
        assert_eq!(first_cell_value(rows(json!([[""]]))), None);
    }
}
