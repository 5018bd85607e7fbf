//! Difference sorter (spec §4.9): a stable sort with six tie-breaking
//! rules, applied in order until one of them actually distinguishes a pair.

use crate::diff::{DiffKind, Difference};
use crate::order::PathOrder;
use crate::value::Value;

/// Sorts `diffs` in place per the rules below, stable across equal keys.
pub fn sort(diffs: &mut [Difference], order: &PathOrder) {
    diffs.sort_by(|a, b| compare(a, b, order));
}

fn compare(a: &Difference, b: &Difference, order: &PathOrder) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let a_root_first = is_root_level_addition(a);
    let b_root_first = is_root_level_addition(b);
    match (a_root_first, b_root_first) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    let a_root = root_component(&a.path);
    let b_root = root_component(&b.path);
    if a_root != b_root {
        return match (order.index_of(a_root), order.index_of(b_root)) {
            (Some(ai), Some(bi)) => ai.cmp(&bi),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a_root.cmp(b_root),
        };
    }

    if let (Some(ai), Some(bi)) = (order.index_of(&a.path), order.index_of(&b.path)) {
        if ai != bi {
            return ai.cmp(&bi);
        }
    }

    if let (Some(ai), Some(bi)) = (nearest_indexed_ancestor(&a.path, order), nearest_indexed_ancestor(&b.path, order)) {
        if ai != bi {
            return ai.cmp(&bi);
        }
    }

    let a_depth = a.path.matches('.').count();
    let b_depth = b.path.matches('.').count();
    if a_depth != b_depth {
        return a_depth.cmp(&b_depth);
    }

    a.path.cmp(&b.path)
}

/// Root-level additions: kind is `Added`, path has no `.`, and it isn't a
/// list entry (heuristic: doesn't end in `]`, tail after the last `.` isn't
/// purely digits, and the value isn't a map carrying `name`/`id`).
fn is_root_level_addition(diff: &Difference) -> bool {
    if diff.kind != DiffKind::Added {
        return false;
    }
    if diff.path.contains('.') {
        return false;
    }
    if diff.path.ends_with(']') {
        return false;
    }
    if !diff.path.is_empty() && diff.path.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if let Some(Value::Map(m)) = &diff.to {
        if m.contains_key("name") || m.contains_key("id") {
            return false;
        }
    }
    true
}

fn root_component(path: &str) -> &str {
    match path.find('.') {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Strips trailing `.`-delimited segments repeatedly until a prefix that's
/// present in the path-order index is found.
fn nearest_indexed_ancestor(path: &str, order: &PathOrder) -> Option<usize> {
    let mut candidate = path;
    loop {
        if let Some(index) = order.index_of(candidate) {
            return Some(index);
        }
        match candidate.rfind('.') {
            Some(pos) => candidate = &candidate[..pos],
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Difference;

    #[test]
    fn root_additions_sort_first() {
        let order = PathOrder::new();
        let mut diffs = vec![
            Difference::modified("existing", Value::Int(1), Value::Int(2), 0),
            Difference::added("brand_new", Value::Int(3), 0),
        ];
        sort(&mut diffs, &order);
        assert_eq!(diffs[0].path, "brand_new");
    }

    #[test]
    fn depth_breaks_ties_when_unindexed() {
        let order = PathOrder::new();
        let mut diffs = vec![
            Difference::modified("a.b.c", Value::Int(1), Value::Int(2), 0),
            Difference::modified("a", Value::Int(1), Value::Int(2), 0),
        ];
        sort(&mut diffs, &order);
        assert_eq!(diffs[0].path, "a");
    }

    #[test]
    fn alphabetical_is_the_final_tiebreak() {
        let order = PathOrder::new();
        let mut diffs = vec![
            Difference::modified("zeta", Value::Int(1), Value::Int(2), 0),
            Difference::modified("alpha", Value::Int(1), Value::Int(2), 0),
        ];
        sort(&mut diffs, &order);
        assert_eq!(diffs[0].path, "alpha");
    }
}
