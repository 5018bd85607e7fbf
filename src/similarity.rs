//! Similarity index: represents a document as a multiset of DJB-hashed
//! lines of its canonical YAML serialisation, used by rename detection to
//! score candidate pairs on content rather than identity (spec §4.6).

use crate::value::Value;
use std::collections::HashMap;

/// `h <- 5381; h <- h*33 + b` over each byte, wrapping at 32 bits -- the
/// classic DJB2 hash, chosen for speed over cryptographic strength since
/// this is a similarity heuristic, not an identity check.
fn djb_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 5381;
    for &b in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(b as u32);
    }
    hash
}

/// A document's content fingerprint: a multiset of line hashes, keyed by
/// hash with an occurrence count.
pub struct LineIndex {
    counts: HashMap<u32, usize>,
    total: usize,
}

impl LineIndex {
    /// Builds the index from a document's canonical serialisation, skipping
    /// blank and whitespace-only lines.
    pub fn build(value: &Value) -> Self {
        let serialized = canonical_lines(value);
        let mut counts = HashMap::new();
        let mut total = 0usize;
        for line in serialized {
            if line.trim().is_empty() {
                continue;
            }
            *counts.entry(djb_hash(line.as_bytes())).or_insert(0) += 1;
            total += 1;
        }
        LineIndex { counts, total }
    }

    /// Byte length of the underlying serialisation, used for the early
    /// rejection heuristic before a full score is computed.
    pub fn byte_len(value: &Value) -> usize {
        canonical_lines(value).join("\n").len()
    }
}

/// `100 * matching / max(|A|, |B|)`, where `matching` sums `min(A[h], B[h])`
/// over every hash `h`. Zero when both sides are empty.
pub fn score(a: &LineIndex, b: &LineIndex) -> u32 {
    if a.total == 0 && b.total == 0 {
        return 0;
    }
    let matching: usize = a
        .counts
        .iter()
        .map(|(hash, &count)| count.min(*b.counts.get(hash).unwrap_or(&0)))
        .sum();
    let denominator = a.total.max(b.total);
    if denominator == 0 {
        return 0;
    }
    ((matching * 100) / denominator) as u32
}

/// Before computing a full score, reject pairs whose serialised byte
/// lengths differ too much to plausibly be a rename: `min/max * 100 < 60`.
pub fn passes_length_heuristic(left_len: usize, right_len: usize) -> bool {
    let (min, max) = if left_len <= right_len {
        (left_len, right_len)
    } else {
        (right_len, left_len)
    };
    if max == 0 {
        return true;
    }
    (min * 100) / max >= 60
}

/// A minimal canonical serialisation: one line per scalar, nested
/// structures flattened depth-first. It doesn't need to be valid YAML, only
/// stable and content-sensitive -- it's hashed, never parsed back.
fn canonical_lines(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    write_lines(value, 0, &mut lines);
    lines
}

fn write_lines(value: &Value, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Map(map) => {
            for (key, val) in map.iter() {
                if val.is_scalar() {
                    out.push(format!("{indent}{key}: {}", val.scalar_display()));
                } else {
                    out.push(format!("{indent}{key}:"));
                    write_lines(val, depth + 1, out);
                }
            }
        }
        Value::List(items) => {
            for item in items {
                if item.is_scalar() {
                    out.push(format!("{indent}- {}", item.scalar_display()));
                } else {
                    out.push(format!("{indent}-"));
                    write_lines(item, depth + 1, out);
                }
            }
        }
        // A bare top-level scalar only reaches this arm for the document
        // itself (nested scalars go through the map/list branches above,
        // which always prefix a key or `- `). A null document has no
        // content to fingerprint, so it must not contribute the `<nil>`
        // sentinel as a line -- otherwise two empty documents would share
        // one "matching" line instead of being correctly both-empty.
        Value::Null => {}
        scalar => out.push(format!("{indent}{}", scalar.scalar_display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OrderedMap;

    fn doc(name: &str, replicas: i64) -> Value {
        let mut m = OrderedMap::new();
        m.insert("name", Value::String(name.to_string()));
        m.insert("replicas", Value::Int(replicas));
        Value::Map(m)
    }

    #[test]
    fn identical_documents_score_one_hundred() {
        let a = LineIndex::build(&doc("web", 3));
        let b = LineIndex::build(&doc("web", 3));
        assert_eq!(score(&a, &b), 100);
    }

    #[test]
    fn both_empty_scores_zero() {
        let a = LineIndex::build(&Value::Null);
        let b = LineIndex::build(&Value::Null);
        assert_eq!(score(&a, &b), 0);
    }

    #[test]
    fn mostly_different_documents_score_low() {
        let a = LineIndex::build(&doc("web", 3));
        let b = LineIndex::build(&doc("totally-different-name", 99));
        assert!(score(&a, &b) < 60);
    }

    #[test]
    fn length_heuristic_rejects_wildly_different_sizes() {
        assert!(!passes_length_heuristic(1, 1000));
        assert!(passes_length_heuristic(90, 100));
    }

    #[test]
    fn djb_hash_is_deterministic() {
        assert_eq!(djb_hash(b"hello"), djb_hash(b"hello"));
        assert_ne!(djb_hash(b"hello"), djb_hash(b"world"));
    }
}
