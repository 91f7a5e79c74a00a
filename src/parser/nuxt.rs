// Extraction of search results from the server-rendered list page.
//
// The site renders results with Nuxt and inlines the page state as a
// `window.__NUXT__ = {...}` assignment. The search payload sits somewhere
// under the state's `data` branch, keyed by a build-dependent hash, so the
// state tree is walked for the first node carrying an `items` array.
use crate::model::ParserError;
use crate::normalizer::{RawRecord, SsrRecord};
use crate::crawler::traits::SearchPayload;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::warn;

const STATE_MARKER: &str = "window.__NUXT__";

pub struct NuxtStateParser;

impl NuxtStateParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, html: &str) -> Result<SearchPayload, ParserError> {
        let document = Html::parse_document(html);
        let script_selector =
            Selector::parse("script").map_err(|_| ParserError::StateNotFound)?;

        let state_js = document
            .select(&script_selector)
            .map(|el| el.text().collect::<String>())
            .find(|text| text.contains(STATE_MARKER))
            .ok_or(ParserError::StateNotFound)?;

        let state_json = slice_object_literal(&state_js).ok_or(ParserError::StateNotFound)?;
        let state: Value = serde_json::from_str(state_json)
            .map_err(|e| ParserError::StateDecode(e.to_string()))?;

        let node = find_items_node(&state).ok_or(ParserError::PayloadNotFound)?;
        Ok(payload_from_node(node))
    }
}

impl Default for NuxtStateParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the balanced `{...}` literal assigned to the state marker.
fn slice_object_literal(js: &str) -> Option<&str> {
    let assign = js.find(STATE_MARKER)?;
    let start = assign + js[assign..].find('{')?;
    let bytes = js.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&js[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Depth-first search for the node holding the result list.
fn find_items_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if map.get("items").is_some_and(Value::is_array) {
                return Some(value);
            }
            map.values().find_map(find_items_node)
        }
        Value::Array(values) => values.iter().find_map(find_items_node),
        _ => None,
    }
}

fn payload_from_node(node: &Value) -> SearchPayload {
    let raw_items = node
        .get("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let items = raw_items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<SsrRecord>(item) {
            Ok(record) => Some(RawRecord::Ssr(record)),
            Err(e) => {
                warn!("Skipping undecodable listing record: {}", e);
                None
            }
        })
        .collect();

    let total = match node.get("total") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    };

    SearchPayload { items, total }
}
