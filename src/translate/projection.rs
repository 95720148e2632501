//! Client-side emulation of partial responses.

use serde_json::Value;

/// Keep only `fields` in every record of `content[array_key]`.
///
/// Keys missing from a record are skipped rather than invented. Content
/// without that array is left untouched.
pub fn project_records(content: &mut Value, array_key: &str, fields: &[String]) {
    let Some(records) = content.get_mut(array_key).and_then(Value::as_array_mut) else {
        return;
    };

    for record in records.iter_mut() {
        if let Some(object) = record.as_object_mut() {
            object.retain(|key, _| fields.iter().any(|f| f == key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_projection_keeps_requested_keys() {
        let mut content = json!({
            "alignments": [
                {"id": "r1", "name": "read1", "extra": "x"},
                {"id": "r2", "name": "read2", "extra": "y"}
            ],
            "nextPageToken": "t"
        });
        project_records(&mut content, "alignments", &["id".into(), "name".into()]);
        assert_eq!(
            content,
            json!({
                "alignments": [
                    {"id": "r1", "name": "read1"},
                    {"id": "r2", "name": "read2"}
                ],
                "nextPageToken": "t"
            })
        );
    }

    #[test]
    fn test_projection_skips_missing_keys() {
        let mut content = json!({"alignments": [{"id": "r1"}]});
        project_records(&mut content, "alignments", &["id".into(), "cigar".into()]);
        assert_eq!(content, json!({"alignments": [{"id": "r1"}]}));
    }

    #[test]
    fn test_projection_without_array_is_noop() {
        let mut content = json!({});
        project_records(&mut content, "alignments", &["id".into()]);
        assert_eq!(content, json!({}));
    }
}
