//! Document matcher: pairs documents across two streams using positional,
//! Kubernetes-identifier, and similarity-based rename strategies (spec
//! §4.5).

use crate::identifier::{is_kubernetes_resource, kubernetes_identifier};
use crate::similarity::{self, LineIndex};
use crate::value::Value;
use std::collections::HashMap;

const RENAME_SCORE_THRESHOLD: u32 = 60;
const RENAME_RESIDUAL_GUARD: usize = 50;

/// A partial injection `from_index -> to_index`, plus whatever from both
/// sides is left unmatched.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: Vec<(usize, usize)>,
    pub unmatched_from: Vec<usize>,
    pub unmatched_to: Vec<usize>,
}

pub struct MatcherOptions {
    pub detect_kubernetes: bool,
    pub detect_renames: bool,
    pub ignore_api_version: bool,
}

pub fn match_documents(from: &[Value], to: &[Value], options: &MatcherOptions) -> MatchResult {
    let mut unmatched_from: Vec<usize> = (0..from.len()).collect();
    let mut unmatched_to: Vec<usize> = (0..to.len()).collect();
    let mut matched = Vec::new();

    if options.detect_kubernetes {
        kubernetes_match(from, to, options.ignore_api_version, &mut matched, &mut unmatched_from, &mut unmatched_to);

        if options.detect_renames && !unmatched_from.is_empty() && !unmatched_to.is_empty() {
            rename_match(from, to, &mut matched, &mut unmatched_from, &mut unmatched_to);
        }
    }

    positional_match(&mut matched, &mut unmatched_from, &mut unmatched_to);

    MatchResult {
        matched,
        unmatched_from,
        unmatched_to,
    }
}

/// First-occurrence-wins lookup from Kubernetes identifier to the `to`
/// index it first appeared at; non-resources and empty identifiers are
/// left unmatched by this pass.
fn kubernetes_match(
    from: &[Value],
    to: &[Value],
    ignore_api_version: bool,
    matched: &mut Vec<(usize, usize)>,
    unmatched_from: &mut Vec<usize>,
    unmatched_to: &mut Vec<usize>,
) {
    let mut to_index: HashMap<String, usize> = HashMap::new();
    for &i in unmatched_to.iter() {
        let identifier = kubernetes_identifier(&to[i], ignore_api_version);
        if !identifier.is_empty() {
            to_index.entry(identifier).or_insert(i);
        }
    }

    let mut used_to: Vec<usize> = Vec::new();
    unmatched_from.retain(|&i| {
        let identifier = kubernetes_identifier(&from[i], ignore_api_version);
        if identifier.is_empty() {
            return true;
        }
        if let Some(&j) = to_index.get(&identifier) {
            matched.push((i, j));
            used_to.push(j);
            false
        } else {
            true
        }
    });
    unmatched_to.retain(|i| !used_to.contains(i));
}

/// Greedily pairs unmatched Kubernetes resources by descending similarity
/// score, skipping entirely when the larger residual exceeds the cost
/// guard.
fn rename_match(
    from: &[Value],
    to: &[Value],
    matched: &mut Vec<(usize, usize)>,
    unmatched_from: &mut Vec<usize>,
    unmatched_to: &mut Vec<usize>,
) {
    if unmatched_from.len().max(unmatched_to.len()) > RENAME_RESIDUAL_GUARD {
        return;
    }

    let from_candidates: Vec<usize> = unmatched_from
        .iter()
        .copied()
        .filter(|&i| is_kubernetes_resource(&from[i]))
        .collect();
    let to_candidates: Vec<usize> = unmatched_to
        .iter()
        .copied()
        .filter(|&i| is_kubernetes_resource(&to[i]))
        .collect();

    let from_lens: HashMap<usize, usize> = from_candidates
        .iter()
        .map(|&i| (i, LineIndex::byte_len(&from[i])))
        .collect();
    let to_lens: HashMap<usize, usize> = to_candidates
        .iter()
        .map(|&i| (i, LineIndex::byte_len(&to[i])))
        .collect();

    let mut candidates: Vec<(u32, usize, usize)> = Vec::new();
    for &i in &from_candidates {
        for &j in &to_candidates {
            if !similarity::passes_length_heuristic(from_lens[&i], to_lens[&j]) {
                continue;
            }
            let score = similarity::score(&LineIndex::build(&from[i]), &LineIndex::build(&to[j]));
            if score >= RENAME_SCORE_THRESHOLD {
                candidates.push((score, i, j));
            }
        }
    }

    // Descending score; ties broken by ascending from-index then ascending to-index.
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut used_from = std::collections::HashSet::new();
    let mut used_to = std::collections::HashSet::new();
    for (_, i, j) in candidates {
        if used_from.contains(&i) || used_to.contains(&j) {
            continue;
        }
        matched.push((i, j));
        used_from.insert(i);
        used_to.insert(j);
    }

    unmatched_from.retain(|i| !used_from.contains(i));
    unmatched_to.retain(|j| !used_to.contains(j));
}

fn positional_match(
    matched: &mut Vec<(usize, usize)>,
    unmatched_from: &mut Vec<usize>,
    unmatched_to: &mut Vec<usize>,
) {
    unmatched_from.sort_unstable();
    unmatched_to.sort_unstable();

    let pairs = unmatched_from.len().min(unmatched_to.len());
    for k in 0..pairs {
        matched.push((unmatched_from[k], unmatched_to[k]));
    }
    *unmatched_from = unmatched_from.split_off(pairs);
    *unmatched_to = unmatched_to.split_off(pairs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OrderedMap;

    fn config_map(name: &str, data_value: &str) -> Value {
        let mut metadata = OrderedMap::new();
        metadata.insert("name", Value::String(name.to_string()));
        let mut data = OrderedMap::new();
        data.insert("key", Value::String(data_value.to_string()));
        let mut map = OrderedMap::new();
        map.insert("apiVersion", Value::String("v1".to_string()));
        map.insert("kind", Value::String("ConfigMap".to_string()));
        map.insert("metadata", Value::Map(metadata));
        map.insert("data", Value::Map(data));
        Value::Map(map)
    }

    fn options(detect_kubernetes: bool, detect_renames: bool) -> MatcherOptions {
        MatcherOptions {
            detect_kubernetes,
            detect_renames,
            ignore_api_version: false,
        }
    }

    #[test]
    fn positional_fallback_pairs_by_slot() {
        let from = vec![Value::Int(1), Value::Int(2)];
        let to = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        let result = match_documents(&from, &to, &options(false, false));
        assert_eq!(result.matched, vec![(0, 0), (1, 1)]);
        assert_eq!(result.unmatched_from, Vec::<usize>::new());
        assert_eq!(result.unmatched_to, vec![2]);
    }

    #[test]
    fn kubernetes_identifier_match_survives_reordering() {
        let from = vec![config_map("a", "1"), config_map("b", "1")];
        let to = vec![config_map("b", "2"), config_map("a", "1")];
        let result = match_documents(&from, &to, &options(true, false));
        assert!(result.matched.contains(&(0, 1)));
        assert!(result.matched.contains(&(1, 0)));
        assert!(result.unmatched_from.is_empty());
        assert!(result.unmatched_to.is_empty());
    }

    #[test]
    fn rename_requires_detect_renames_flag() {
        let mut renamed = config_map("web-new", "same-value");
        if let Value::Map(m) = &mut renamed {
            m.insert("metadata", {
                let mut md = OrderedMap::new();
                md.insert("name", Value::String("web-new".to_string()));
                Value::Map(md)
            });
        }
        let from = vec![config_map("web-old", "same-value")];
        let to = vec![renamed];
        let result = match_documents(&from, &to, &options(true, false));
        assert!(result.matched.is_empty());
        assert_eq!(result.unmatched_from, vec![0]);
        assert_eq!(result.unmatched_to, vec![0]);
    }
}
