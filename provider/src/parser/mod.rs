//! Generic XML record loader with a filter/transform hook.
//!
//! The bibliographic exports share one shape:
//!
//! ```xml
//! <Records>
//!   <Record Id="42" Parent="17">
//!     <Field Label="Last name">Novák</Field>
//!     <Field Label="First name">Jan</Field>
//!   </Record>
//! </Records>
//! ```
//!
//! Every `Record` becomes a [`RawRecord`]. A transform then turns it into a
//! typed value or rejects it, see [`load_filtered`]. The OpenAIRE project
//! list uses a different schema and has its own reader, [`read_project_ids`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

use crate::error::{LoadError, LoadResult};

const RECORD_TAG: &[u8] = b"Record";
const PAIR_TAG: &[u8] = b"pair";
const STORED_VALUE_TAG: &[u8] = b"stored-value";

/// One `Record` element as found in the export, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// Value of the `Id` attribute.
    pub id: String,
    /// Value of the `Parent` attribute, present on attachments.
    pub parent: Option<String>,
    /// (label, text) pairs in document order. Empty elements carry `None`.
    pub fields: Vec<(String, Option<String>)>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_field(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.push((label.into(), Some(text.into())));
        self
    }
}

/// Value produced by a transform, optionally re-keyed.
///
/// When `key` is set it replaces the record's own `Id` as the map key.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived<T> {
    pub key: Option<String>,
    pub value: T,
}

impl<T> Derived<T> {
    /// Keep the value under the record's own id.
    pub fn new(value: T) -> Self {
        Self { key: None, value }
    }

    /// Store the value under an explicit key.
    pub fn keyed(key: impl Into<String>, value: T) -> Self {
        Self {
            key: Some(key.into()),
            value,
        }
    }
}

/// Parse all `Record` elements of an export.
pub fn parse_records(xml: &str, source: &str) -> LoadResult<Vec<RawRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<RawRecord> = None;
    // (label, text) of the field being read, if its element has a label
    let mut field: Option<(String, String)> = None;
    // element depth inside the current record, the record itself is 1
    let mut depth = 0usize;
    // elements opened anywhere in the document and not yet closed
    let mut open = 0usize;

    loop {
        match reader.read_event().map_err(|e| LoadError::xml(source, e))? {
            Event::Start(ref e) => {
                open += 1;
                if current.is_none() {
                    if e.name().as_ref() == RECORD_TAG {
                        current = Some(record_from_start(e, source)?);
                        depth = 1;
                    }
                    continue;
                }
                depth += 1;
                if depth == 2 {
                    field = field_label(e, source)?.map(|label| (label, String::new()));
                }
            }
            Event::Empty(ref e) => match current.as_mut() {
                None if e.name().as_ref() == RECORD_TAG => {
                    records.push(record_from_start(e, source)?);
                }
                None => {}
                Some(record) if depth == 1 => {
                    if let Some(label) = field_label(e, source)? {
                        record.fields.push((label, None));
                    }
                }
                Some(_) => {}
            },
            Event::Text(ref t) => {
                if let Some((_, text)) = field.as_mut() {
                    let unescaped = t.unescape().map_err(|e| LoadError::xml(source, e))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(ref c) => {
                if let Some((_, text)) = field.as_mut() {
                    text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(_) => {
                open = open.saturating_sub(1);
                let Some(record) = current.as_mut() else {
                    continue;
                };
                if depth == 2 {
                    if let Some((label, text)) = field.take() {
                        let text = if text.is_empty() { None } else { Some(text) };
                        record.fields.push((label, text));
                    }
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(done) = current.take() {
                        records.push(done);
                    }
                }
            }
            Event::Eof if open > 0 || current.is_some() => {
                return Err(LoadError::xml(source, "unexpected end of document"));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Read and parse an export file.
pub fn read_records(path: &Path) -> LoadResult<Vec<RawRecord>> {
    let xml = read_file(path)?;
    parse_records(&xml, &path.display().to_string())
}

/// Apply `transform` to every record, keeping those it accepts.
///
/// Values are stored under [`Derived::key`] when set, otherwise under the
/// record's `Id`. A later record with the same key replaces an earlier one.
pub fn retain_records<T, F>(records: &[RawRecord], source: &str, mut transform: F) -> BTreeMap<String, T>
where
    F: FnMut(&RawRecord) -> Option<Derived<T>>,
{
    let mut retained = BTreeMap::new();
    for record in records {
        if let Some(derived) = transform(record) {
            let key = derived.key.unwrap_or_else(|| record.id.clone());
            retained.insert(key, derived.value);
        }
    }
    info!("Found [{}] entries in [{}]", retained.len(), source);
    retained
}

/// Read an export and keep the records accepted by `transform`.
pub fn load_filtered<T, F>(path: &Path, transform: F) -> LoadResult<BTreeMap<String, T>>
where
    F: FnMut(&RawRecord) -> Option<Derived<T>>,
{
    let records = read_records(path)?;
    Ok(retain_records(&records, &path.display().to_string(), transform))
}

/// Parse the OpenAIRE project list, collecting every `pair/stored-value`.
pub fn parse_project_ids(xml: &str, source: &str) -> LoadResult<BTreeSet<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut value: Option<String> = None;
    let mut ids = BTreeSet::new();

    loop {
        match reader.read_event().map_err(|e| LoadError::xml(source, e))? {
            Event::Start(ref e) => {
                let name = e.name().as_ref().to_vec();
                if name == STORED_VALUE_TAG && stack.last().is_some_and(|p| p == PAIR_TAG) {
                    value = Some(String::new());
                }
                stack.push(name);
            }
            Event::Text(ref t) => {
                if let Some(v) = value.as_mut() {
                    v.push_str(&t.unescape().map_err(|e| LoadError::xml(source, e))?);
                }
            }
            Event::CData(ref c) => {
                if let Some(v) = value.as_mut() {
                    v.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(_) => {
                if stack.pop().is_some_and(|n| n == STORED_VALUE_TAG) {
                    if let Some(v) = value.take() {
                        let v = v.trim();
                        if !v.is_empty() {
                            ids.insert(v.to_string());
                        }
                    }
                }
            }
            Event::Eof if !stack.is_empty() => {
                return Err(LoadError::xml(source, "unexpected end of document"));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    info!("Found [{}] project ids in [{}]", ids.len(), source);
    Ok(ids)
}

/// Read the OpenAIRE project list from disk.
pub fn read_project_ids(path: &Path) -> LoadResult<BTreeSet<String>> {
    let xml = read_file(path)?;
    parse_project_ids(&xml, &path.display().to_string())
}

fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn record_from_start(e: &BytesStart<'_>, source: &str) -> LoadResult<RawRecord> {
    let id = attribute(e, "Id", source)?.ok_or_else(|| LoadError::MissingId {
        path: source.to_string(),
    })?;
    Ok(RawRecord {
        id,
        parent: attribute(e, "Parent", source)?,
        fields: Vec::new(),
    })
}

/// Field elements name themselves with `Label`, attachment exports with `Name`.
fn field_label(e: &BytesStart<'_>, source: &str) -> LoadResult<Option<String>> {
    match attribute(e, "Label", source)? {
        Some(label) => Ok(Some(label)),
        None => attribute(e, "Name", source),
    }
}

fn attribute(e: &BytesStart<'_>, name: &str, source: &str) -> LoadResult<Option<String>> {
    let Some(attr) = e
        .try_get_attribute(name)
        .map_err(|err| LoadError::xml(source, err))?
    else {
        return Ok(None);
    };
    let value = attr
        .unescape_value()
        .map_err(|err| LoadError::xml(source, err))?;
    Ok(Some(value.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const AUTHORS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Records>
  <Record Id="1">
    <Field Label="First name">Jan</Field>
    <Field Label="Last name">Nov&#225;k</Field>
  </Record>
  <Record Id="2">
    <Field Label="First name"/>
    <Field Label="Last name"><![CDATA[O'Brien & Sons]]></Field>
  </Record>
</Records>"#;

    #[test]
    fn test_parse_records() {
        let records = parse_records(AUTHORS, "authors.xml").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(
            records[0].fields,
            vec![
                ("First name".to_string(), Some("Jan".to_string())),
                ("Last name".to_string(), Some("Novák".to_string())),
            ]
        );
        assert_eq!(records[1].fields[0], ("First name".to_string(), None));
        assert_eq!(records[1].fields[1].1.as_deref(), Some("O'Brien & Sons"));
    }

    #[test]
    fn test_parent_and_name_attributes() {
        let xml = r#"<Files>
  <Record Id="900" Parent="42"><Field Name="Type">application/pdf</Field></Record>
</Files>"#;
        let records = parse_records(xml, "attachments.xml").unwrap();

        assert_eq!(records[0].parent.as_deref(), Some("42"));
        assert_eq!(records[0].fields[0].0, "Type");
    }

    #[test]
    fn test_missing_id_is_error() {
        let xml = "<Records><Record><Field Label=\"x\">y</Field></Record></Records>";
        let err = parse_records(xml, "broken.xml").unwrap_err();
        assert!(matches!(err, LoadError::MissingId { .. }));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let xml = "<Records><Record Id=\"1\"><Field Label=\"x\">y</Record></Records>";
        let err = parse_records(xml, "broken.xml").unwrap_err();
        assert!(matches!(err, LoadError::Xml { .. }));
    }

    #[test]
    fn test_truncated_export_is_error() {
        // second record cut off mid-file
        let xml = r#"<Records><Record Id="1"><Field Label="Last name">A</Field></Record><Record Id="2"><Field Label="Last name">B</Field>"#;
        let err = parse_records(xml, "grants.xml").unwrap_err();
        assert!(matches!(err, LoadError::Xml { .. }));

        // every record complete, root left open
        let xml = r#"<Records><Record Id="1"><Field Label="Last name">A</Field></Record>"#;
        assert!(parse_records(xml, "grants.xml").is_err());
    }

    #[test]
    fn test_retain_records_filters_and_rekeys() {
        let records = vec![
            RawRecord::new("a").with_parent("p1"),
            RawRecord::new("b"),
            RawRecord::new("c").with_parent("p1"),
        ];

        let kept = retain_records(&records, "test", |r| {
            if r.id == "b" {
                None
            } else {
                Some(Derived::keyed(r.parent.clone().unwrap(), r.id.clone()))
            }
        });

        // "c" overwrites "a" under the shared parent key
        assert_eq!(kept.len(), 1);
        assert_eq!(kept["p1"], "c");
    }

    #[test]
    fn test_retain_all_as_empty_records() {
        let records = vec![RawRecord::new("1"), RawRecord::new("2")];
        let kept = retain_records(&records, "test", |_| Some(Derived::new(())));
        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_load_filtered_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_filtered(&dir.path().join("nope.xml"), |_| Some(Derived::new(()))).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_parse_project_ids() {
        let xml = r#"<form-value-pairs>
  <value-pairs value-pairs-name="projects" dc-term="relation">
    <pair>
      <displayed-value>247762 - FAUST</displayed-value>
      <stored-value>info:eu-repo/grantAgreement/EC/FP7/247762/EU/FAUST</stored-value>
    </pair>
    <pair>
      <displayed-value>644402 - HimL</displayed-value>
      <stored-value>info:eu-repo/grantAgreement/EC/H2020/644402/EU/HimL</stored-value>
    </pair>
    <stored-value>outside-a-pair</stored-value>
  </value-pairs>
</form-value-pairs>"#;
        let ids = parse_project_ids(xml, "projects.xml").unwrap();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains("info:eu-repo/grantAgreement/EC/FP7/247762/EU/FAUST"));
        assert!(!ids.contains("outside-a-pair"));
    }

    #[test]
    fn test_truncated_project_list_is_error() {
        let xml = r#"<form-value-pairs><value-pairs><pair><stored-value>info:eu-repo/grantAgreement/EC/FP7/247762/EU/FAUST</stored-value></pair>"#;
        let err = parse_project_ids(xml, "projects.xml").unwrap_err();
        assert!(matches!(err, LoadError::Xml { .. }));
    }
}
