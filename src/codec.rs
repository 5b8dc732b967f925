//! Front-matter record codec
//!
//! A record file is a `---` delimited YAML field block followed by a free
//! text body:
//!
//! ```text
//! ---
//! id: task-1
//! title: Write docs
//! ---
//!
//! ## Description
//! ...
//! ```

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::task::TaskRecord;

/// Line that opens and closes the field block
pub const DELIMITER: &str = "---";

/// A parsed record: structured fields plus the free-text body
#[derive(Debug, Clone, PartialEq)]
pub struct Document<T> {
    pub fields: T,
    pub body: String,
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Split content into `(field_block, body)`.
///
/// Returns `None` unless the first line is a delimiter and a second
/// delimiter line follows. A single blank line after the closing
/// delimiter is not part of the body.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if trim_eol(first) != DELIMITER {
        return None;
    }

    let front_start = first.len();
    let mut offset = front_start;
    for line in lines {
        if trim_eol(line) == DELIMITER {
            let front = &content[front_start..offset];
            let tail = &content[offset + line.len()..];
            let body = tail
                .strip_prefix("\r\n")
                .or_else(|| tail.strip_prefix('\n'))
                .unwrap_or(tail);
            return Some((front, body));
        }
        offset += line.len();
    }
    None
}

/// Parse content into typed fields and body.
///
/// Any structural or YAML failure yields `None`; callers decide whether
/// that is an error.
pub fn parse<T: DeserializeOwned>(content: &str) -> Option<Document<T>> {
    let (front, body) = split(content)?;
    let fields = match serde_yaml_ng::from_str::<T>(front) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::debug!(error = %err, "front matter did not parse");
            return None;
        }
    };
    Some(Document {
        fields,
        body: body.to_string(),
    })
}

/// Parse a task record, rejecting records without an `id` or `title`.
pub fn parse_record(content: &str) -> Option<Document<TaskRecord>> {
    let doc = parse::<TaskRecord>(content)?;
    if doc.fields.id.trim().is_empty() || doc.fields.title.trim().is_empty() {
        return None;
    }
    Some(doc)
}

/// Serialize fields and body back into record text.
///
/// A non-blank body is separated from the closing delimiter by exactly one
/// blank line, and the output always ends with a single newline.
pub fn serialize<T: Serialize>(fields: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml_ng::to_string(fields)?;

    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.is_empty() && !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');

    let body = body
        .trim_start_matches(['\n', '\r'])
        .trim_end_matches(['\n', '\r']);
    if !body.trim().is_empty() {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Fields {
        name: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn split_requires_opening_delimiter() {
        assert!(split("id: x\n---\nbody").is_none());
        assert!(split("").is_none());
    }

    #[test]
    fn split_requires_closing_delimiter() {
        assert!(split("---\nid: x\nbody\n").is_none());
    }

    #[test]
    fn split_drops_single_leading_blank_line() {
        let (front, body) = split("---\na: 1\n---\n\n\nbody\n").expect("split");
        assert_eq!(front, "a: 1\n");
        assert_eq!(body, "\nbody\n");
    }

    #[test]
    fn split_accepts_crlf() {
        let (front, body) = split("---\r\na: 1\r\n---\r\n\r\nbody").expect("split");
        assert_eq!(front, "a: 1\r\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn split_handles_delimiter_at_eof() {
        let (front, body) = split("---\na: 1\n---").expect("split");
        assert_eq!(front, "a: 1\n");
        assert_eq!(body, "");
    }

    #[test]
    fn parse_rejects_bad_yaml() {
        assert!(parse::<Fields>("---\nname: [unterminated\n---\n").is_none());
    }

    #[test]
    fn parse_record_requires_id_and_title() {
        assert!(parse_record("---\nid: task-1\n---\n").is_none());
        assert!(parse_record("---\ntitle: Hello\n---\n").is_none());
        assert!(parse_record("---\nid: task-1\ntitle: '  '\n---\n").is_none());

        let doc = parse_record("---\nid: task-1\ntitle: Hello\n---\n\nBody text\n")
            .expect("valid record");
        assert_eq!(doc.fields.id, "task-1");
        assert_eq!(doc.body, "Body text\n");
    }

    #[test]
    fn serialize_separates_body_with_one_blank_line() {
        let fields = Fields {
            name: "a".to_string(),
            tags: vec!["x".to_string()],
        };
        let text = serialize(&fields, "\n\nhello\n\n\n").expect("serialize");
        assert_eq!(text, "---\nname: a\ntags:\n- x\n---\n\nhello\n");

        let parsed = parse::<Fields>(&text).expect("parse");
        assert_eq!(parsed.fields, fields);
        assert_eq!(parsed.body, "hello\n");
    }

    #[test]
    fn serialize_omits_blank_body() {
        let fields = Fields {
            name: "a".to_string(),
            tags: Vec::new(),
        };
        let text = serialize(&fields, "  \n").expect("serialize");
        assert_eq!(text, "---\nname: a\ntags: []\n---\n");
    }
}
