//! Writing scan results.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use structfields_core::StructType;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented JSON array.
    #[default]
    Json,
    /// JSON Lines, one struct per line.
    #[value(name = "jsonl")]
    #[serde(rename = "jsonl")]
    JsonLines,
    /// Compact text listing.
    Compact,
}

/// Write `structs` to `out` in the given format.
pub fn write_structs<W: Write>(
    out: &mut W,
    structs: &[StructType],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, structs)?;
            writeln!(out)
        }
        OutputFormat::JsonLines => {
            for record in structs {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
            Ok(())
        }
        OutputFormat::Compact => out.write_all(format_compact(structs).as_bytes()),
    }
}

/// One header line per struct, then one indented line per field.
///
/// ```text
/// E [what, directive]
///   F1 string `json:"Test"` // F1 is a string
/// ```
pub fn format_compact(structs: &[StructType]) -> String {
    let mut text = String::new();
    for record in structs {
        text.push_str(&record.name);
        if !record.directives.is_empty() {
            text.push_str(" [");
            text.push_str(&record.directives.join(", "));
            text.push(']');
        }
        text.push('\n');

        for field in &record.fields {
            text.push_str("  ");
            text.push_str(&field.name);
            text.push(' ');
            text.push_str(&field.ty);
            if !field.tag.is_empty() {
                text.push(' ');
                text.push_str(&field.tag);
            }
            let note = first_line(&field.doc).or_else(|| first_line(&field.comment));
            if let Some(note) = note {
                text.push_str(" // ");
                text.push_str(note);
            }
            text.push('\n');
        }
    }
    text
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use structfields_core::FieldType;

    fn sample() -> Vec<StructType> {
        vec![
            StructType {
                name: "E".into(),
                doc: "E is a struct\n".into(),
                directives: vec!["what".into(), "directive".into()],
                fields: vec![FieldType {
                    doc: "F1 is a string\n".into(),
                    comment: "F1 is the first field\n".into(),
                    tag: "`json:\"Test\"`".into(),
                    ..FieldType::new("F1", "string")
                }],
            },
            StructType {
                name: "B".into(),
                fields: vec![
                    FieldType {
                        comment: "promoted\n".into(),
                        ..FieldType::new("F1", "string")
                    },
                    FieldType::new("F42", "map[string][]*time.Time"),
                ],
                ..Default::default()
            },
            StructType {
                name: "Empty".into(),
                ..Default::default()
            },
        ]
    }

    fn render(format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_structs(&mut out, &sample(), format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_compact() {
        insta::assert_snapshot!(render(OutputFormat::Compact), @r#"
        E [what, directive]
          F1 string `json:"Test"` // F1 is a string
        B
          F1 string // promoted
          F42 map[string][]*time.Time
        Empty
        "#);
    }

    #[test]
    fn test_json_is_indented_with_trailing_newline() {
        let json = render(OutputFormat::Json);
        assert!(json.starts_with("[\n  {\n    \"Name\": \"E\",\n    \"Doc\": \"E is a struct\\n\","));
        assert!(json.ends_with("]\n"));
        let parsed: Vec<StructType> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_json_empty() {
        let mut out = Vec::new();
        write_structs(&mut out, &[], OutputFormat::Json).unwrap();
        assert_eq!(out, b"[]\n");
    }

    #[test]
    fn test_json_lines() {
        let text = render(OutputFormat::JsonLines);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let b: StructType = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(b.field_names(), ["F1", "F42"]);
    }

    #[test]
    fn test_format_names() {
        #[derive(Deserialize)]
        struct Section {
            format: OutputFormat,
        }
        let parsed: Section = toml::from_str("format = \"jsonl\"").unwrap();
        assert_eq!(parsed.format, OutputFormat::JsonLines);
        assert_eq!(
            <OutputFormat as clap::ValueEnum>::from_str("jsonl", false),
            Ok(OutputFormat::JsonLines)
        );
    }
}
