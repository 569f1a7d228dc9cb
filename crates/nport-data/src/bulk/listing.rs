//! ListObjectsV2 response parsing.

use crate::error::{DataError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One page of a `ListObjectsV2` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBucketPage {
    /// Object keys on this page
    pub keys: Vec<String>,
    /// Whether more pages follow
    pub is_truncated: bool,
    /// Token for the next page
    pub next_continuation_token: Option<String>,
}

impl ListBucketPage {
    /// Parse a `ListBucketResult` document.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut page = Self::default();
        let mut path: Vec<String> = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if path.is_empty() && name == "ListBucketResult" {
                        saw_root = true;
                    }
                    path.push(name);
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    match path_tail(&path) {
                        ["Contents", "Key"] => page.keys.push(text.into_owned()),
                        ["ListBucketResult", "IsTruncated"] => {
                            page.is_truncated = text.eq_ignore_ascii_case("true");
                        }
                        ["ListBucketResult", "NextContinuationToken"] => {
                            page.next_continuation_token = Some(text.into_owned());
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(DataError::XmlParse(
                "missing ListBucketResult element".to_string(),
            ));
        }

        Ok(page)
    }
}

fn path_tail(path: &[String]) -> [&str; 2] {
    match path {
        [.., parent, leaf] => [parent.as_str(), leaf.as_str()],
        _ => ["", ""],
    }
}
