//! Document persistence: patch preferences into TOML files while preserving
//! formatting, and write files to disk.
//!
//! Uses `toml_edit` for comment-preserving edits. Every declared key is
//! written into its `[section."domain"]` table, replacing only the value so
//! comments attached to the key survive. Creates parent directories as
//! needed.

use std::path::Path;

use chrono::SecondsFormat;
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table};

use crate::document::SectionsDocument;
use crate::error::DotmacosError;
use crate::validate;
use crate::value::Value;

/// Pure function: render `doc` as TOML on top of `existing` content.
///
/// Keys and tables already present keep their position, comments and
/// layout; new ones are appended. `path` is only used in error messages.
pub fn render_toml(
    doc: &SectionsDocument,
    path: &Path,
    existing: Option<&str>,
) -> Result<String, DotmacosError> {
    let mut out: DocumentMut =
        existing
            .unwrap_or_default()
            .parse()
            .map_err(|e: toml_edit::TomlError| DotmacosError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

    for (section, domains) in doc.iter() {
        let section_table = child_table(out.as_table_mut(), section.name());
        for (domain, prefs) in domains {
            let domain_table = child_table(section_table, domain);
            let at = validate::child(section.name(), domain);
            for (key, value) in prefs.iter() {
                set_item(domain_table, key, value, &validate::child(&at, key))
                    .map_err(|reason| DotmacosError::WriteError {
                        path: path.to_path_buf(),
                        reason,
                    })?;
            }
        }
    }

    Ok(out.to_string())
}

/// Write `content` to `path`, creating parent directories if needed.
pub fn write_file(path: &Path, content: &str) -> Result<(), DotmacosError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DotmacosError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| DotmacosError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// The sub-table `name` of `parent`, created as an implicit table if missing
/// or replaced if it holds something else.
fn child_table<'a>(parent: &'a mut Table, name: &str) -> &'a mut Table {
    let item = parent.entry(name).or_insert(Item::None);
    if !item.is_table() {
        let mut table = Table::new();
        table.set_implicit(true);
        *item = Item::Table(table);
    }
    match item {
        Item::Table(table) => table,
        _ => unreachable!("item was just made a table"),
    }
}

/// Set `key` in `table`. Dictionaries written over existing sub-tables are
/// merged into them key by key; anything else replaces the value in place,
/// keeping its trailing comment.
fn set_item(table: &mut Table, key: &str, value: &Value, at: &str) -> Result<(), String> {
    if let (Value::Dictionary(dict), Some(Item::Table(sub))) = (value, table.get_mut(key)) {
        for (child_key, child_value) in dict {
            set_item(sub, child_key, child_value, &validate::child(at, child_key))?;
        }
        return Ok(());
    }

    let mut new_value = to_edit_value(value, at)?;
    if let Some(old) = table.get(key).and_then(Item::as_value) {
        *new_value.decor_mut() = old.decor().clone();
    }
    table[key] = Item::Value(new_value);
    Ok(())
}

fn to_edit_value(value: &Value, at: &str) -> Result<toml_edit::Value, String> {
    Ok(match value {
        Value::Boolean(b) => (*b).into(),
        Value::Integer(i) => (*i).into(),
        Value::Real(r) => (*r).into(),
        Value::String(s) => s.as_str().into(),
        Value::Date(d) => {
            let text = d.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            let parsed: toml_edit::Datetime = text
                .parse()
                .map_err(|e| format!("{at}: date {text} cannot be written: {e}"))?;
            parsed.into()
        }
        Value::Data(_) => return Err(format!("{at}: binary data has no TOML representation")),
        Value::Array(items) => {
            let mut array = Array::new();
            for (i, item) in items.iter().enumerate() {
                array.push(to_edit_value(item, &format!("{at}[{i}]"))?);
            }
            toml_edit::Value::Array(array)
        }
        Value::Dictionary(dict) => {
            let mut inline = InlineTable::new();
            for (key, item) in dict {
                inline.insert(key.as_str(), to_edit_value(item, &validate::child(at, key))?);
            }
            toml_edit::Value::InlineTable(inline)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{FINDER_TOML, dict};
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn path() -> PathBuf {
        PathBuf::from("prefs.toml")
    }

    fn doc(domain_prefs: Value) -> SectionsDocument {
        SectionsDocument::from_value(dict(&[("user", dict(&[("com.apple.finder", domain_prefs)]))]))
            .unwrap()
    }

    #[test]
    fn renders_into_empty_document() {
        let rendered = render_toml(&doc(dict(&[("ShowPathbar", Value::from(true))])), &path(), None)
            .unwrap();
        assert!(rendered.contains("[user.\"com.apple.finder\"]"), "{rendered}");
        assert!(rendered.contains("ShowPathbar = true"), "{rendered}");
        assert!(!rendered.contains("[user]\n"), "{rendered}");
    }

    #[test]
    fn replaces_existing_value_and_keeps_comments() {
        let existing = "# Finder tweaks\n[user.\"com.apple.finder\"]\n# preview\nShowPreviewPane = true # on\n";
        let rendered = render_toml(
            &doc(dict(&[("ShowPreviewPane", Value::from(false))])),
            &path(),
            Some(existing),
        )
        .unwrap();
        assert!(rendered.contains("# Finder tweaks"), "{rendered}");
        assert!(rendered.contains("# preview"), "{rendered}");
        assert!(rendered.contains("ShowPreviewPane = false # on"), "{rendered}");
    }

    #[test]
    fn appends_new_keys_after_existing_ones() {
        let rendered = render_toml(
            &doc(dict(&[("ShowPreviewPane", Value::from(true)), ("ShowPathbar", Value::from(true))])),
            &path(),
            Some(FINDER_TOML),
        )
        .unwrap();
        let preview = rendered.find("ShowPreviewPane").unwrap();
        let pathbar = rendered.find("ShowPathbar").unwrap();
        assert!(preview < pathbar, "{rendered}");
    }

    #[test]
    fn nested_dictionary_merges_into_existing_sub_table() {
        let existing = "[user.\"com.apple.finder\".Panel]\n# px\nwidth = 100\n";
        let rendered = render_toml(
            &doc(dict(&[("Panel", dict(&[("width", Value::from(300i64)), ("height", Value::from(50i64))]))])),
            &path(),
            Some(existing),
        )
        .unwrap();
        assert!(rendered.contains("# px\nwidth = 300"), "{rendered}");
        assert!(rendered.contains("height = 50"), "{rendered}");
    }

    #[test]
    fn nested_dictionary_renders_inline_when_new() {
        let rendered = render_toml(
            &doc(dict(&[("Panel", dict(&[("width", Value::from(1i64))]))])),
            &path(),
            None,
        )
        .unwrap();
        assert!(rendered.contains("Panel = { width = 1 }"), "{rendered}");
    }

    #[test]
    fn dates_are_written_as_offset_datetimes() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let rendered = render_toml(&doc(dict(&[("when", Value::Date(when))])), &path(), None).unwrap();
        assert!(rendered.contains("when = 2024-03-01T12:00:00Z"), "{rendered}");
    }

    #[test]
    fn binary_data_is_a_write_error() {
        let err = render_toml(&doc(dict(&[("blob", Value::Data(vec![1]))])), &path(), None)
            .unwrap_err();
        match err {
            DotmacosError::WriteError { reason, .. } => {
                assert!(reason.contains("user.com.apple.finder.blob"), "{reason}")
            }
            other => panic!("Expected WriteError, got {other:?}"),
        }
    }

    #[test]
    fn malformed_existing_content_is_a_parse_error() {
        let err = render_toml(&doc(dict(&[])), &path(), Some("[user")).unwrap_err();
        assert!(matches!(err, DotmacosError::ParseError { .. }));
    }

    #[test]
    fn write_file_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("sub").join("dir").join("prefs.toml");
        write_file(&target, "x = 1\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "x = 1\n");
    }
}
