//! Reading and writing config documents.
//!
//! A document file is decoded in two steps: the format codec produces a
//! generic tree, then [`SectionsDocument::from_value`] validates it. Writing
//! goes the other way. JSON5 output is plain pretty-printed JSON (a valid
//! JSON5 subset); TOML output is patched into the existing file by
//! [`persist`](crate::persist) so its comments survive.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::document::SectionsDocument;
use crate::error::DotmacosError;
use crate::persist;
use crate::types::FileFormat;
use crate::validate;
use crate::value::Value;

/// Read and validate the document at `path`.
pub fn read_document(path: &Path, format: FileFormat) -> Result<SectionsDocument, DotmacosError> {
    let content = std::fs::read_to_string(path).map_err(|e| DotmacosError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), %format, "Read config file");
    decode(&content, path, format)
}

/// Decode document text. `path` is only used in error messages.
pub fn decode(
    content: &str,
    path: &Path,
    format: FileFormat,
) -> Result<SectionsDocument, DotmacosError> {
    let parse_error = |reason: String| DotmacosError::ParseError {
        path: path.to_path_buf(),
        reason,
    };
    let tree = match format {
        FileFormat::Json5 => {
            let raw: serde_json::Value =
                json5::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            if !raw.is_object() {
                return Err(DotmacosError::StructureError {
                    path: path.to_path_buf(),
                });
            }
            validate::from_json(raw, "")?
        }
        FileFormat::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| parse_error(e.message().to_string()))?;
            validate::from_toml(toml::Value::Table(table), "")?
        }
        FileFormat::Json | FileFormat::Yaml => return Err(DotmacosError::UnsupportedFormat(format)),
    };
    SectionsDocument::from_value(tree)
}

/// Encode `doc` as document text.
///
/// `existing` is the current file content, if any. TOML output keeps its
/// comments and layout; JSON5 output replaces it.
pub fn encode(
    doc: &SectionsDocument,
    path: &Path,
    format: FileFormat,
    existing: Option<&str>,
) -> Result<String, DotmacosError> {
    match format {
        FileFormat::Json5 => {
            let json = to_json(&doc.to_value()).map_err(|reason| DotmacosError::WriteError {
                path: path.to_path_buf(),
                reason,
            })?;
            let mut text =
                serde_json::to_string_pretty(&json).map_err(|e| DotmacosError::WriteError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            text.push('\n');
            Ok(text)
        }
        FileFormat::Toml => persist::render_toml(doc, path, existing),
        FileFormat::Json | FileFormat::Yaml => Err(DotmacosError::UnsupportedFormat(format)),
    }
}

/// Write `doc` to `path`, creating parent directories as needed.
pub fn write_document(
    doc: &SectionsDocument,
    path: &Path,
    format: FileFormat,
) -> Result<(), DotmacosError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            return Err(DotmacosError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let text = encode(doc, path, format, existing.as_deref())?;
    persist::write_file(path, &text)?;
    info!(path = %path.display(), %format, "Wrote config file");
    Ok(())
}

/// Write `doc` to `path`, replacing any existing content.
pub fn write_new_document(
    doc: &SectionsDocument,
    path: &Path,
    format: FileFormat,
) -> Result<(), DotmacosError> {
    let text = encode(doc, path, format, None)?;
    persist::write_file(path, &text)?;
    info!(path = %path.display(), %format, "Wrote new config file");
    Ok(())
}

/// Convert a value into JSON. Dates and binary data have no JSON form.
fn to_json(value: &Value) -> Result<serde_json::Value, String> {
    Ok(match value {
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(r) => serde_json::Number::from_f64(*r)
            .map(serde_json::Value::Number)
            .ok_or_else(|| format!("{r} has no JSON representation"))?,
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Date(d) => return Err(format!("date {d} has no JSON5 representation")),
        Value::Data(_) => return Err("binary data has no JSON5 representation".into()),
        Value::Array(items) => serde_json::Value::Array(
            items.iter().map(to_json).collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Dictionary(dict) => serde_json::Value::Object(
            dict.iter()
                .map(|(key, item)| Ok((key.clone(), to_json(item)?)))
                .collect::<Result<serde_json::Map<_, _>, String>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{FINDER_JSON5, FINDER_TOML};
    use crate::types::Section;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn here() -> PathBuf {
        PathBuf::from("prefs.json5")
    }

    #[test]
    fn decodes_json5_with_comments_and_bare_keys() {
        let doc = decode(FINDER_JSON5, &here(), FileFormat::Json5).unwrap();
        let prefs = doc.prefs(Section::User, "com.apple.finder").unwrap();
        assert_eq!(prefs.get("ShowPreviewPane"), Some(&Value::from(true)));
    }

    #[test]
    fn decodes_toml() {
        let doc = decode(FINDER_TOML, &here(), FileFormat::Toml).unwrap();
        assert!(doc.prefs(Section::User, "com.apple.finder").is_some());
    }

    #[test]
    fn malformed_json5_is_a_parse_error() {
        let err = decode("{ user: ", &here(), FileFormat::Json5).unwrap_err();
        assert!(matches!(err, DotmacosError::ParseError { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = decode("[user\n", &here(), FileFormat::Toml).unwrap_err();
        assert!(matches!(err, DotmacosError::ParseError { .. }));
    }

    #[test]
    fn non_mapping_top_level_is_a_structure_error() {
        let err = decode("[1, 2]", &here(), FileFormat::Json5).unwrap_err();
        assert!(matches!(err, DotmacosError::StructureError { .. }));
    }

    #[test]
    fn null_value_is_rejected() {
        let err = decode("{user: {d: {k: null}}}", &here(), FileFormat::Json5).unwrap_err();
        match err {
            DotmacosError::InvalidValue { key, .. } => assert_eq!(key, "user.d.k"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = decode("{global: {}}", &here(), FileFormat::Json5).unwrap_err();
        assert!(matches!(err, DotmacosError::InvalidSections(_)));
    }

    #[test]
    fn json_and_yaml_are_unsupported() {
        for format in [FileFormat::Json, FileFormat::Yaml] {
            let err = decode("{}", &here(), format).unwrap_err();
            assert!(matches!(err, DotmacosError::UnsupportedFormat(f) if f == format));
            let err = encode(&SectionsDocument::default(), &here(), format, None).unwrap_err();
            assert!(matches!(err, DotmacosError::UnsupportedFormat(_)));
        }
    }

    #[test]
    fn json5_encoding_round_trips() {
        let doc = decode(FINDER_JSON5, &here(), FileFormat::Json5).unwrap();
        let text = encode(&doc, &here(), FileFormat::Json5, None).unwrap();
        assert_eq!(decode(&text, &here(), FileFormat::Json5).unwrap(), doc);
    }

    #[test]
    fn json5_cannot_hold_binary_data() {
        let tree = crate::fixtures::test::dict(&[(
            "user",
            crate::fixtures::test::dict(&[(
                "d",
                crate::fixtures::test::dict(&[("blob", Value::Data(vec![1]))]),
            )]),
        )]);
        let doc = SectionsDocument::from_value(tree).unwrap();
        let err = encode(&doc, &here(), FileFormat::Json5, None).unwrap_err();
        assert!(matches!(err, DotmacosError::WriteError { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_document(&dir.path().join("absent.json5"), FileFormat::Json5).unwrap_err();
        assert!(matches!(err, DotmacosError::IoError { .. }));
    }

    #[test]
    fn write_then_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("finder.toml");
        let doc = decode(FINDER_TOML, &here(), FileFormat::Toml).unwrap();

        write_document(&doc, &path, FileFormat::Toml).unwrap();

        assert_eq!(read_document(&path, FileFormat::Toml).unwrap(), doc);
    }

    #[test]
    fn toml_write_back_keeps_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("finder.toml");
        fs::write(&path, FINDER_TOML).unwrap();
        let doc = decode(
            "[user.\"com.apple.finder\"]\nShowPreviewPane = false\nShowPathbar = true\n",
            &path,
            FileFormat::Toml,
        )
        .unwrap();

        write_document(&doc, &path, FileFormat::Toml).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Finder tweaks"), "{content}");
        assert!(content.contains("ShowPreviewPane = false"), "{content}");
        assert!(content.contains("ShowPathbar = true"), "{content}");
    }
}
