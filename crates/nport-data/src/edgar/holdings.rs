//! Tabular decoding of N-PORT filing documents.
//!
//! An N-PORT `primary_doc.xml` lists one `invstOrSec` element per security
//! position under `formData/invstOrSecs`. [`XmlTable::parse`] selects every
//! element matching a structural path and flattens it into one row: the
//! element's attributes plus the text of each direct child element.
//!
//! # Example
//!
//! ```
//! use nport_data::edgar::holdings::{XmlTable, DEFAULT_HOLDING_PATH};
//!
//! let xml = r#"<edgarSubmission><formData><invstOrSecs>
//!     <invstOrSec><name>Acme Corp</name><valUSD>1500.25</valUSD></invstOrSec>
//! </invstOrSecs></formData></edgarSubmission>"#;
//!
//! let table = XmlTable::parse(xml, DEFAULT_HOLDING_PATH).unwrap();
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.get(0, "name"), Some("Acme Corp"));
//! ```

use crate::error::{DataError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Path of the repeating holding element in an N-PORT document.
pub const DEFAULT_HOLDING_PATH: &str = "invstOrSecs/invstOrSec";

/// Column keywords kept by the per-filer export.
pub const DEFAULT_COLUMN_KEYWORDS: [&str; 2] = ["name", "value"];

/// Rows decoded from repeating XML elements.
///
/// Columns appear in first-seen order; cells missing from a row are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl XmlTable {
    /// Decode every element matching `path` into a row.
    ///
    /// `path` is a `/`-separated list of local element names matched against the
    /// tail of the current element path, so `invstOrSecs/invstOrSec` selects the
    /// holdings regardless of the enclosing elements or namespace prefixes. A
    /// leading `/` or `//` is ignored.
    ///
    /// # Errors
    /// Returns `DataError::XmlParse` for malformed documents. A well-formed
    /// document without matching elements yields an empty table.
    pub fn parse(xml: &str, path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(DataError::XmlParse("empty element path".to_string()));
        }

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<String> = Vec::new();
        let mut builder = TableBuilder::default();
        let mut row: Option<RowState> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    stack.push(local_name(&e));
                    match row.as_mut() {
                        Some(state) if stack.len() == state.depth + 1 => {
                            state.open_child(&stack[stack.len() - 1]);
                        }
                        Some(_) => {}
                        None if ends_with(&stack, &segments) => {
                            row = Some(RowState::open(stack.len(), &e)?);
                        }
                        None => {}
                    }
                }
                Event::Empty(e) => {
                    let name = local_name(&e);
                    match row.as_mut() {
                        Some(state) if stack.len() == state.depth => state.push(name, None),
                        Some(_) => {}
                        None => {
                            stack.push(name);
                            if ends_with(&stack, &segments) {
                                builder.push(RowState::open(stack.len(), &e)?.fields);
                            }
                            stack.pop();
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some(state) = row.as_mut()
                        && stack.len() == state.depth + 1
                    {
                        state.append_text(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(state) = row.as_mut()
                        && stack.len() == state.depth + 1
                    {
                        state.append_text(&String::from_utf8_lossy(&c));
                    }
                }
                Event::End(_) => {
                    let depth = stack.len();
                    match row.as_ref().map(|state| state.depth) {
                        Some(row_depth) if depth == row_depth + 1 => {
                            if let Some(state) = row.as_mut() {
                                state.close_child();
                            }
                        }
                        Some(row_depth) if depth == row_depth => {
                            if let Some(done) = row.take() {
                                builder.push(done.fields);
                            }
                        }
                        _ => {}
                    }
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(DataError::XmlParse(format!(
                "unexpected end of document inside <{}>",
                open
            )));
        }

        Ok(builder.finish())
    }

    /// Keep only the columns whose name contains one of `keywords`
    /// (case-insensitive substring match).
    pub fn select_columns<K: AsRef<str>>(&self, keywords: &[K]) -> Self {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                let lower = name.to_lowercase();
                keywords.iter().any(|k| lower.contains(k.as_str()))
            })
            .map(|(i, _)| i)
            .collect();

        Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Column names in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, each aligned with [`XmlTable::columns`].
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Cell value by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn ends_with(stack: &[String], segments: &[&str]) -> bool {
    stack.len() >= segments.len()
        && stack[stack.len() - segments.len()..]
            .iter()
            .zip(segments)
            .all(|(a, b)| a == b)
}

/// The row element currently being decoded.
struct RowState {
    depth: usize,
    fields: Vec<(String, Option<String>)>,
    current: Option<(String, String)>,
}

impl RowState {
    fn open(depth: usize, e: &BytesStart<'_>) -> Result<Self> {
        let mut state = Self {
            depth,
            fields: Vec::new(),
            current: None,
        };
        for attr in e.attributes() {
            let attr = attr.map_err(|err| DataError::XmlParse(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            state.push(key, Some(value));
        }
        Ok(state)
    }

    fn open_child(&mut self, name: &str) {
        self.current = Some((name.to_string(), String::new()));
    }

    fn append_text(&mut self, text: &str) {
        if let Some((_, buf)) = self.current.as_mut() {
            buf.push_str(text);
        }
    }

    fn close_child(&mut self) {
        if let Some((name, text)) = self.current.take() {
            let text = text.trim();
            let value = (!text.is_empty()).then(|| text.to_string());
            self.push(name, value);
        }
    }

    /// First occurrence of a column wins.
    fn push(&mut self, name: String, value: Option<String>) {
        if !self.fields.iter().any(|(n, _)| *n == name) {
            self.fields.push((name, value));
        }
    }
}

#[derive(Default)]
struct TableBuilder {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl TableBuilder {
    fn push(&mut self, fields: Vec<(String, Option<String>)>) {
        let mut row = vec![None; self.columns.len()];
        for (name, value) in fields {
            let col = match self.index.get(&name) {
                Some(&col) => col,
                None => {
                    self.columns.push(name.clone());
                    self.index.insert(name, self.columns.len() - 1);
                    row.push(None);
                    self.columns.len() - 1
                }
            };
            row[col] = value;
        }
        self.rows.push(row);
    }

    fn finish(self) -> XmlTable {
        let width = self.columns.len();
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();

        XmlTable {
            columns: self.columns,
            rows,
        }
    }
}
