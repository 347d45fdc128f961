use std::sync::LazyLock;

use regex::{Captures, Regex};

static BLOB_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Blob>.*?<Name>(.*?)</Name>").expect("Invalid regex"));
static NEXT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<NextMarker>([^<]+)</NextMarker>").expect("Invalid regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(lt|gt|quot|apos|amp|#[0-9]+|#x[0-9A-Fa-f]+);").expect("Invalid regex")
});

/// One page of a `comp=list` response.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct BlobPage {
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

impl BlobPage {
    pub fn parse(xml: &str) -> Self {
        let names = BLOB_NAME
            .captures_iter(xml)
            .map(|captures| unescape(&captures[1]))
            .collect();
        let next_marker = NEXT_MARKER
            .captures(xml)
            .map(|captures| unescape(&captures[1]))
            .filter(|marker| !marker.is_empty());

        Self { names, next_marker }
    }
}

/// Resolves named and numeric character references in one pass.
/// References to invalid code points are kept verbatim.
fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |captures: &Captures| {
            let entity = &captures[1];
            let resolved = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => match entity.strip_prefix("#x") {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => entity[1..].parse().ok(),
                }
                .and_then(char::from_u32),
            };
            resolved.map_or_else(|| captures[0].to_owned(), String::from)
        })
        .into_owned()
}
