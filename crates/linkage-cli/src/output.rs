//! Group table writers.
//!
//! One row per group: a 1-based `group_id`, the member count, and the sorted
//! member keys. CSV joins the keys with `;`; JSON keeps them as an array.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use linkage_model::{Group, RecordKey};

/// Separator between member keys in the CSV `matches` column.
pub const MATCH_SEPARATOR: &str = ";";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Serialize)]
struct GroupRow<'a> {
    group_id: usize,
    size: usize,
    matches: Vec<&'a str>,
}

fn rows(groups: &[Group]) -> impl Iterator<Item = GroupRow<'_>> {
    groups.iter().enumerate().map(|(idx, group)| GroupRow {
        group_id: idx + 1,
        size: group.len(),
        matches: group.members().iter().map(RecordKey::as_str).collect(),
    })
}

/// `<dir>/<stem>.groups.<ext>` beside the records file.
pub fn default_output_path(records: &Path, format: OutputFormat) -> PathBuf {
    let stem = records
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("contacts");
    records.with_file_name(format!("{stem}.groups.{}", format.extension()))
}

pub fn write_groups_csv<W: Write>(writer: W, groups: &[Group]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["group_id", "size", "matches"])?;
    for row in rows(groups) {
        csv.write_record([
            row.group_id.to_string(),
            row.size.to_string(),
            row.matches.join(MATCH_SEPARATOR),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_groups_json<W: Write>(mut writer: W, groups: &[Group]) -> Result<()> {
    let rows: Vec<GroupRow<'_>> = rows(groups).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes the group table to `path`, replacing any existing file.
pub fn write_groups(path: &Path, groups: &[Group], format: OutputFormat) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let writer = BufWriter::new(file);
    match format {
        OutputFormat::Csv => write_groups_csv(writer, groups),
        OutputFormat::Json => write_groups_json(writer, groups),
    }
    .with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        let key = |v: &str| RecordKey::new(v).unwrap();
        vec![
            Group::new(vec![key("sf-2"), key("hs-1"), key("sf-9")]),
            Group::new(vec![key("zd-4")]),
        ]
    }

    fn render(write: fn(&mut Vec<u8>, &[Group]) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer, &groups()).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn csv_joins_member_keys() {
        let text = render(|w, g| write_groups_csv(w, g));
        insta::assert_snapshot!(text, @r"
        group_id,size,matches
        1,3,hs-1;sf-2;sf-9
        2,1,zd-4
        ");
    }

    #[test]
    fn json_keeps_member_arrays() {
        let text = render(|w, g| write_groups_json(w, g));
        insta::assert_snapshot!(text, @r#"
        [
          {
            "group_id": 1,
            "size": 3,
            "matches": [
              "hs-1",
              "sf-2",
              "sf-9"
            ]
          },
          {
            "group_id": 2,
            "size": 1,
            "matches": [
              "zd-4"
            ]
          }
        ]
        "#);
    }

    #[test]
    fn empty_group_list_still_has_header() {
        let mut buffer = Vec::new();
        write_groups_csv(&mut buffer, &[]).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "group_id,size,matches\n");
    }

    #[test]
    fn default_path_sits_beside_records() {
        let path = default_output_path(Path::new("/data/contacts.csv"), OutputFormat::Csv);
        assert_eq!(path, PathBuf::from("/data/contacts.groups.csv"));
        let path = default_output_path(Path::new("contacts.csv"), OutputFormat::Json);
        assert_eq!(path, PathBuf::from("contacts.groups.json"));
    }
}
