//! Structural comparator and list comparator (spec §4.7, §4.8): the
//! recursive walk over two matched values that produces a flat sequence of
//! `Difference` records.

use crate::diff::{Difference, Options};
use crate::identifier::{is_identifier_matchable, list_item_identifier};
use crate::path::Path;
use crate::value::{OrderedMap, ScalarToken, Value};
use std::collections::HashMap;

pub struct CompareContext<'a> {
    pub options: &'a Options,
    pub document_index: u32,
}

/// Compares two matched documents from the root, or any nested pair of
/// values reached during the walk.
pub fn compare_values(from: &Value, to: &Value, path: &Path, ctx: &CompareContext) -> Vec<Difference> {
    match (from, to) {
        (Value::Null, Value::Null) => Vec::new(),
        (Value::Map(a), Value::Map(b)) => compare_maps(a, b, path, ctx),
        (Value::List(a), Value::List(b)) => compare_lists(a, b, path, ctx),
        _ if from.is_scalar() && to.is_scalar() => compare_scalars(from, to, path, ctx),
        _ => {
            if ctx.options.ignore_value_changes {
                Vec::new()
            } else {
                vec![Difference::modified(
                    path.to_dot_string(),
                    from.clone(),
                    to.clone(),
                    ctx.document_index,
                )]
            }
        }
    }
}

fn compare_scalars(from: &Value, to: &Value, path: &Path, ctx: &CompareContext) -> Vec<Difference> {
    if scalars_equal(from, to, ctx.options) {
        return Vec::new();
    }
    if ctx.options.ignore_value_changes {
        return Vec::new();
    }
    vec![Difference::modified(
        path.to_dot_string(),
        from.clone(),
        to.clone(),
        ctx.document_index,
    )]
}

fn scalars_equal(from: &Value, to: &Value, options: &Options) -> bool {
    if from == to {
        return true;
    }
    if options.ignore_whitespace_changes {
        if let (Value::String(a), Value::String(b)) = (from, to) {
            return strip_whitespace(a) == strip_whitespace(b);
        }
    }
    false
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn compare_maps(a: &OrderedMap, b: &OrderedMap, path: &Path, ctx: &CompareContext) -> Vec<Difference> {
    let mut diffs = Vec::new();

    for key in a.keys() {
        let child = path.push(key);
        match b.get(key) {
            None => diffs.push(Difference::removed(
                child.to_dot_string(),
                a.get(key).expect("key came from a.keys()").clone(),
                ctx.document_index,
            )),
            Some(bv) => diffs.extend(compare_values(
                a.get(key).expect("key came from a.keys()"),
                bv,
                &child,
                ctx,
            )),
        }
    }

    for key in b.keys() {
        if !a.contains_key(key) {
            let child = path.push(key);
            diffs.push(Difference::added(
                child.to_dot_string(),
                b.get(key).expect("key came from b.keys()").clone(),
                ctx.document_index,
            ));
        }
    }

    diffs
}

fn compare_lists(from: &[Value], to: &[Value], path: &Path, ctx: &CompareContext) -> Vec<Difference> {
    let additional = &ctx.options.additional_identifiers;
    let mut diffs = Vec::new();

    if !ctx.options.ignore_order_changes {
        if let Some(()) = detect_order_change(from, to, additional) {
            diffs.push(Difference::order_changed(
                path.to_dot_string(),
                Value::List(from.to_vec()),
                Value::List(to.to_vec()),
                ctx.document_index,
            ));
        }
    }

    if is_identifier_matchable(from, additional) && is_identifier_matchable(to, additional) {
        diffs.extend(compare_by_identifier(from, to, path, ctx));
    } else {
        diffs.extend(compare_positional(from, to, 0, path, ctx));
    }

    diffs
}

fn token_key(token: &ScalarToken) -> String {
    token.to_string()
}

fn first_occurrence_index(items: &[Value], additional: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        if let Some(id) = list_item_identifier(item, additional) {
            index.entry(token_key(&id)).or_insert(i);
        }
    }
    index
}

fn compare_by_identifier(from: &[Value], to: &[Value], path: &Path, ctx: &CompareContext) -> Vec<Difference> {
    let additional = &ctx.options.additional_identifiers;
    let from_index = first_occurrence_index(from, additional);
    let to_index = first_occurrence_index(to, additional);

    let mut diffs = Vec::new();
    let mut unidentified_from = Vec::new();
    let mut unidentified_to = Vec::new();

    for item in from {
        match list_item_identifier(item, additional) {
            Some(id) => {
                let key = token_key(&id);
                let child = path.push(key.as_str());
                match to_index.get(&key) {
                    Some(&j) => diffs.extend(compare_values(item, &to[j], &child, ctx)),
                    None => diffs.push(Difference::removed(
                        child.to_dot_string(),
                        item.clone(),
                        ctx.document_index,
                    )),
                }
            }
            None => unidentified_from.push(item),
        }
    }

    for item in to {
        match list_item_identifier(item, additional) {
            Some(id) => {
                let key = token_key(&id);
                if !from_index.contains_key(&key) {
                    let child = path.push(key.as_str());
                    diffs.push(Difference::added(
                        child.to_dot_string(),
                        item.clone(),
                        ctx.document_index,
                    ));
                }
            }
            None => unidentified_to.push(item),
        }
    }

    diffs.extend(compare_unidentified(&unidentified_from, &unidentified_to, path, ctx));
    diffs
}

/// Unidentified items within an identifier-matchable list fall through to
/// a positional comparison amongst themselves, indexed independently of
/// their position in the full list.
fn compare_unidentified(from: &[&Value], to: &[&Value], path: &Path, ctx: &CompareContext) -> Vec<Difference> {
    let mut diffs = Vec::new();
    let min = from.len().min(to.len());
    for k in 0..min {
        diffs.extend(compare_values(from[k], to[k], &path.push(k), ctx));
    }
    for (k, item) in from.iter().enumerate().skip(min) {
        diffs.push(Difference::removed(
            path.push(k).to_dot_string(),
            (*item).clone(),
            ctx.document_index,
        ));
    }
    for (k, item) in to.iter().enumerate().skip(min) {
        diffs.push(Difference::added(
            path.push(k).to_dot_string(),
            (*item).clone(),
            ctx.document_index,
        ));
    }
    diffs
}

fn compare_positional(from: &[Value], to: &[Value], offset: usize, path: &Path, ctx: &CompareContext) -> Vec<Difference> {
    let mut diffs = Vec::new();
    let min = from.len().min(to.len());
    for k in 0..min {
        diffs.extend(compare_values(&from[k], &to[k], &path.push(offset + k), ctx));
    }
    for (k, item) in from.iter().enumerate().skip(min) {
        diffs.push(Difference::removed(
            path.push(offset + k).to_dot_string(),
            item.clone(),
            ctx.document_index,
        ));
    }
    for (k, item) in to.iter().enumerate().skip(min) {
        diffs.push(Difference::added(
            path.push(offset + k).to_dot_string(),
            item.clone(),
            ctx.document_index,
        ));
    }
    diffs
}

/// An order-comparable token per item: its identifier if it has one, else
/// its scalar value. A list containing a non-comparable item (a nested map
/// or list without an identifier) can't participate in order detection.
fn order_tokens(items: &[Value], additional: &[String]) -> Option<Vec<ScalarToken>> {
    items
        .iter()
        .map(|item| list_item_identifier(item, additional).or_else(|| item.comparable_scalar()))
        .collect()
}

fn detect_order_change(from: &[Value], to: &[Value], additional: &[String]) -> Option<()> {
    let from_tokens = order_tokens(from, additional)?;
    let to_tokens = order_tokens(to, additional)?;
    if from_tokens.len() != to_tokens.len() {
        return None;
    }
    if from_tokens == to_tokens {
        return None;
    }
    if multiset_eq(&from_tokens, &to_tokens) {
        Some(())
    } else {
        None
    }
}

fn multiset_eq(a: &[ScalarToken], b: &[ScalarToken]) -> bool {
    let mut counts: HashMap<&ScalarToken, i64> = HashMap::new();
    for token in a {
        *counts.entry(token).or_insert(0) += 1;
    }
    for token in b {
        *counts.entry(token).or_insert(0) -= 1;
    }
    counts.values().all(|&count| count == 0)
}
