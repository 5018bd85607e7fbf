//! YAML bytes -> ordered `Value` document stream.
//!
//! Built on `saphyr`'s `MarkedYamlOwned` loader (the teacher's parsing
//! engine throughout `source.rs`/`node.rs`), but the output is converted
//! into this crate's own `Value`/`OrderedMap` rather than exposed as
//! `saphyr` types -- the ordered value model is a first-class part of the
//! contract (spec §4.1), not an implementation detail of whichever YAML
//! engine happens to be underneath.

use std::collections::HashMap;

use crate::error::ParseError;
use crate::value::{OrderedMap, Value};
use saphyr::{LoadableYamlNode, MarkedYamlOwned, ScalarOwned, YamlDataOwned};

const MERGE_KEY: &str = "<<";

/// Parses a byte slice containing one or more `---`-separated YAML
/// documents into an ordered sequence of `Value`s, one per document.
///
/// An empty input yields a single `Null` document (spec §4.2).
pub fn parse(bytes: &[u8]) -> Result<Vec<Value>, ParseError> {
    let content = std::str::from_utf8(bytes).map_err(|e| ParseError {
        line: 0,
        column: 0,
        message: format!("input is not valid UTF-8: {e}"),
    })?;

    if content.trim().is_empty() {
        return Ok(vec![Value::Null]);
    }

    let documents = MarkedYamlOwned::load_from_str(content).map_err(|e| ParseError {
        line: e.marker().line(),
        column: e.marker().col(),
        message: e.to_string(),
    })?;

    // Anchors are scoped to a single document, so each document gets its own
    // table -- a `---`-separated stream can reuse the same anchor name in
    // two different documents without them colliding.
    Ok(documents
        .iter()
        .map(|doc| Converter::new(content).convert(doc))
        .collect())
}

/// Lazily yields parsed documents one at a time, so a caller processing an
/// untrusted blob with many `---` separators can bound how many documents
/// it is willing to materialise (spec §5: callers cap at 10,000 iterations).
pub struct DocumentStream {
    content: String,
    documents: std::vec::IntoIter<MarkedYamlOwned>,
}

impl DocumentStream {
    pub fn new(bytes: &[u8]) -> Result<Self, ParseError> {
        let content = std::str::from_utf8(bytes).map_err(|e| ParseError {
            line: 0,
            column: 0,
            message: format!("input is not valid UTF-8: {e}"),
        })?;

        if content.trim().is_empty() {
            return Ok(DocumentStream {
                content: content.to_string(),
                documents: vec![MarkedYamlOwned::value_from_str("")].into_iter(),
            });
        }

        let documents = MarkedYamlOwned::load_from_str(content).map_err(|e| ParseError {
            line: e.marker().line(),
            column: e.marker().col(),
            message: e.to_string(),
        })?;

        Ok(DocumentStream {
            content: content.to_string(),
            documents: documents.into_iter(),
        })
    }
}

impl Iterator for DocumentStream {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let node = self.documents.next()?;
        Some(Converter::new(&self.content).convert(&node))
    }
}

/// Walks a `saphyr` tree into our `Value` model, resolving `&anchor`/`*alias`
/// pairs along the way. `saphyr`'s owned tree keeps `Alias` nodes unresolved
/// (the teacher's own `node.rs`/`bin/linenums.rs` handle `YamlDataOwned::Alias`
/// for the same reason) and carries no anchor id on the anchored node itself,
/// so the table is built from the source text: whichever node's span starts
/// right after a `&name` token registers `name`, and an `Alias` node looks up
/// the name written at its own span start.
struct Converter<'a> {
    content: &'a str,
    line_starts: Vec<usize>,
    anchors: HashMap<String, Value>,
}

impl<'a> Converter<'a> {
    fn new(content: &'a str) -> Self {
        Converter {
            content,
            line_starts: line_start_offsets(content),
            anchors: HashMap::new(),
        }
    }

    fn offset_of(&self, node: &MarkedYamlOwned) -> usize {
        offset_of(
            self.content,
            &self.line_starts,
            node.span.start.line(),
            node.span.start.col(),
        )
    }

    fn convert(&mut self, node: &MarkedYamlOwned) -> Value {
        let value = match &node.data {
            YamlDataOwned::Value(scalar) => convert_scalar(scalar),
            YamlDataOwned::Representation(s, _style, tag) => convert_representation(s, tag.as_deref()),
            YamlDataOwned::Sequence(items) => {
                Value::List(items.iter().map(|item| self.convert(item)).collect())
            }
            YamlDataOwned::Mapping(mapping) => Value::Map(self.convert_mapping(mapping)),
            YamlDataOwned::Tagged(_tag, inner) => self.convert(inner),
            YamlDataOwned::Alias(_) => {
                let offset = self.offset_of(node);
                match alias_name_at(self.content, offset).and_then(|name| self.anchors.get(&name)) {
                    Some(resolved) => resolved.clone(),
                    None => {
                        log::debug!(
                            "encountered a YAML alias with no matching anchor in this document; \
                             degrading to null"
                        );
                        Value::Null
                    }
                }
            }
            YamlDataOwned::BadValue => Value::Null,
        };

        let offset = self.offset_of(node);
        if let Some(name) = preceding_anchor_name(self.content, offset) {
            self.anchors.insert(name, value.clone());
        }

        value
    }

    /// Converts a mapping node, resolving `<<` merge keys eagerly (spec
    /// §4.2). Explicit keys always win over merged-in ones; when several
    /// mappings are merged, the earliest one listed wins ties between
    /// themselves.
    fn convert_mapping(
        &mut self,
        mapping: &saphyr::AnnotatedMapping<MarkedYamlOwned, MarkedYamlOwned>,
    ) -> OrderedMap {
        let mut merged = OrderedMap::new();
        let mut explicit: Vec<(String, Value)> = Vec::new();

        for (key, value) in mapping.iter() {
            let key_str = self.mapping_key_string(key);
            if key_str == MERGE_KEY {
                for source in self.merge_sources(value) {
                    for (k, v) in source.iter() {
                        if !merged.contains_key(k) {
                            merged.insert(k.to_string(), v.clone());
                        }
                    }
                }
            } else {
                let converted = self.convert(value);
                explicit.push((key_str, converted));
            }
        }

        for (k, v) in explicit {
            merged.insert(k, v);
        }
        merged
    }

    /// Expands the value of a `<<` entry into the mappings it refers to:
    /// either a single (possibly aliased) mapping, or a list of them -- the
    /// two forms YAML's merge key convention allows.
    fn merge_sources(&mut self, value: &MarkedYamlOwned) -> Vec<OrderedMap> {
        match self.convert(value) {
            Value::Map(m) => vec![m],
            Value::List(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::Map(m) => Some(m),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Mapping keys are themselves YAML nodes; everything downstream expects
    /// a `String` key, so non-string keys fall back to their scalar
    /// rendering. (This is the source of the numeric-key-vs-list-entry
    /// ambiguity noted as an open question in spec §9.)
    fn mapping_key_string(&mut self, key: &MarkedYamlOwned) -> String {
        match self.convert(key) {
            Value::String(s) => s,
            other => other.scalar_display(),
        }
    }
}

/// Byte offset of the start of each line in `content`, indexed from 0 so
/// `line_starts[line - 1]` matches `saphyr`'s 1-based `Marker::line()`.
fn line_start_offsets(content: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Converts a `Marker`'s 1-based line / 0-based char column into a byte
/// offset into `content`, using `line_starts` from [`line_start_offsets`].
fn offset_of(content: &str, line_starts: &[usize], line: usize, col: usize) -> usize {
    let line_idx = line.saturating_sub(1);
    let line_start = line_starts.get(line_idx).copied().unwrap_or(content.len());
    let line_end = line_starts
        .get(line_idx + 1)
        .map(|&s| s.saturating_sub(1))
        .unwrap_or(content.len());
    let line_end = line_end.max(line_start).min(content.len());
    let line_text = &content[line_start..line_end];
    let byte_offset_in_line: usize = line_text.chars().take(col).map(char::len_utf8).sum();
    line_start + byte_offset_in_line
}

/// Looks immediately before `offset` for a `&name` anchor token, skipping
/// trailing whitespace. Returns the anchor name if the node starting at
/// `offset` was just anchored.
fn preceding_anchor_name(content: &str, offset: usize) -> Option<String> {
    let before = &content[..offset.min(content.len())];
    let trimmed = before.trim_end();
    let token_start = trimmed
        .rfind(|c: char| c.is_whitespace() || c == ':' || c == '-')
        .map(|i| i + 1)
        .unwrap_or(0);
    let token = &trimmed[token_start..];
    token.strip_prefix('&').and_then(|name| {
        (!name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-'))
            .then(|| name.to_string())
    })
}

/// Reads the alias name written at an `Alias` node's own span start, which
/// `saphyr` points at either the `*` itself or the name right after it.
fn alias_name_at(content: &str, offset: usize) -> Option<String> {
    let rest = &content[offset.min(content.len())..];
    let rest = rest.strip_prefix('*').unwrap_or(rest);
    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    (!name.is_empty()).then_some(name)
}

fn convert_scalar(scalar: &ScalarOwned) -> Value {
    match scalar {
        ScalarOwned::Null => Value::Null,
        ScalarOwned::Boolean(b) => Value::Bool(*b),
        ScalarOwned::Integer(i) => Value::Int(*i),
        ScalarOwned::FloatingPoint(fp) => Value::Float((*fp).into()),
        ScalarOwned::String(s) => Value::String(s.clone()),
    }
}

/// A bare string representation reaches here when the scanner didn't need
/// to resolve it to a typed scalar; re-derive the type the same way the
/// resolved path would (spec §4.2: int/float/string by lexeme, null/bool by
/// tag).
fn convert_representation(raw: &str, tag: Option<&str>) -> Value {
    if let Some(tag) = tag {
        match tag {
            "tag:yaml.org,2002:null" => return Value::Null,
            "tag:yaml.org,2002:bool" => {
                if let Ok(b) = raw.parse::<bool>() {
                    return Value::Bool(b);
                }
            }
            "tag:yaml.org,2002:str" => return Value::String(raw.to_string()),
            _ => {}
        }
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    match raw {
        "null" | "~" | "" => Value::Null,
        "true" | "false" => Value::Bool(raw == "true"),
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_single_null_document() {
        let docs = parse(b"").unwrap();
        assert_eq!(docs, vec![Value::Null]);
    }

    #[test]
    fn parses_scalars_by_lexeme() {
        let docs = parse(b"timeout: 30\nratio: 1.5\nname: hello\nenabled: true\n").unwrap();
        let Value::Map(m) = &docs[0] else {
            panic!("expected a map")
        };
        assert_eq!(m.get("timeout"), Some(&Value::Int(30)));
        assert_eq!(m.get("ratio"), Some(&Value::Float(1.5)));
        assert_eq!(m.get("name"), Some(&Value::String("hello".to_string())));
        assert_eq!(m.get("enabled"), Some(&Value::Bool(true)));
    }

    #[test]
    fn splits_multiple_documents() {
        let docs = parse(b"---\na: 1\n---\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn preserves_mapping_key_order() {
        let docs = parse(b"z: 1\na: 2\nm: 3\n").unwrap();
        let Value::Map(m) = &docs[0] else {
            panic!("expected a map")
        };
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn resolves_merge_keys_with_explicit_keys_winning() {
        let docs = parse(
            b"defaults: &defaults\n  color: red\n  size: large\nitem:\n  <<: *defaults\n  color: blue\n",
        )
        .unwrap();
        let Value::Map(root) = &docs[0] else {
            panic!("expected a map")
        };
        let Some(Value::Map(item)) = root.get("item") else {
            panic!("expected item to be a map")
        };
        assert_eq!(item.get("color"), Some(&Value::String("blue".to_string())));
        assert_eq!(item.get("size"), Some(&Value::String("large".to_string())));
    }
}
