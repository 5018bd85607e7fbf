//! Computes and reports structural differences between two YAML inputs.
//!
//! The pipeline is linear: parse, chroot, match, compare, sort. Filtering
//! and rendering are companion entry points a caller invokes separately --
//! `compare` itself never drops or formats anything.

pub mod chroot;
pub mod comparator;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod identifier;
pub mod matcher;
pub mod order;
pub mod parser;
pub mod path;
pub mod render;
pub mod similarity;
pub mod sorter;
pub mod value;

use comparator::CompareContext;
use diff::{Difference, Options};
use error::Error;
use matcher::{MatcherOptions, match_documents};
use order::PathOrder;
use path::Path;

/// Parses both inputs, matches their documents, recursively compares each
/// matched pair, and returns the stably sorted difference list. Does not
/// filter or render -- see `filter` and `render::render_detailed`.
pub fn compare(from_bytes: &[u8], to_bytes: &[u8], options: &Options) -> Result<Vec<Difference>, Error> {
    // `swap` trades which input plays the `from`/`to` role before anything
    // else runs, so `compare(a, b, swap=true) == compare(b, a, swap=false)`
    // (spec §8) -- `chroot_from`/`chroot_to` keep addressing whichever
    // stream ends up in that role, unchanged.
    let (from_bytes, to_bytes) = if options.swap {
        (to_bytes, from_bytes)
    } else {
        (from_bytes, to_bytes)
    };

    let from_docs = parser::parse(from_bytes)?;
    let to_docs = parser::parse(to_bytes)?;

    let from_docs = match options.chroot_from() {
        Some(path) => chroot::apply_chroot_to_stream(&from_docs, path, options.list_to_documents)?,
        None => from_docs,
    };
    let to_docs = match options.chroot_to() {
        Some(path) => chroot::apply_chroot_to_stream(&to_docs, path, options.list_to_documents)?,
        None => to_docs,
    };

    let matcher_options = MatcherOptions {
        detect_kubernetes: options.detect_kubernetes,
        detect_renames: options.detect_renames,
        ignore_api_version: options.ignore_api_version,
    };
    let matched = match_documents(&from_docs, &to_docs, &matcher_options);

    let mut diffs = Vec::new();
    for (from_index, to_index) in &matched.matched {
        let ctx = CompareContext {
            options,
            document_index: *from_index as u32,
        };
        diffs.extend(comparator::compare_values(
            &from_docs[*from_index],
            &to_docs[*to_index],
            &Path::root(),
            &ctx,
        ));
    }
    for &from_index in &matched.unmatched_from {
        diffs.push(Difference::removed(
            format!("[{from_index}]"),
            from_docs[from_index].clone(),
            from_index as u32,
        ));
    }
    for &to_index in &matched.unmatched_to {
        diffs.push(Difference::added(
            format!("[{to_index}]"),
            to_docs[to_index].clone(),
            to_index as u32,
        ));
    }

    let mut order = PathOrder::new();
    for doc in from_docs.iter().chain(to_docs.iter()) {
        order.record(doc, &options.additional_identifiers);
    }
    sorter::sort(&mut diffs, &order);

    Ok(diffs)
}

/// Applies include/exclude path and regex filters to an already-sorted
/// difference list.
pub fn filter(diffs: Vec<Difference>, options: &filter::FilterOptions) -> Result<Vec<Difference>, Error> {
    Ok(filter::filter(diffs, options)?)
}

/// Renders a sorted, filtered difference list as the canonical detailed
/// report.
pub fn render_detailed(diffs: &[Difference], options: &render::FormatOptions) -> String {
    render::render_detailed(diffs, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexivity_compare_a_with_itself_is_empty() {
        let yaml = b"timeout: 30\nname: app\n";
        let diffs = compare(yaml, yaml, &Options::default()).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn scalar_change_is_detected() {
        let from = b"timeout: 30\n";
        let to = b"timeout: 60\n";
        let diffs = compare(from, to, &Options::default()).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "timeout");
    }

    #[test]
    fn chroot_narrows_the_comparison() {
        let from = b"root:\n  data:\n    name: from\n";
        let to = b"root:\n  data:\n    name: to\n";
        let options = Options {
            chroot: Some("root.data".to_string()),
            ..Options::default()
        };
        let diffs = compare(from, to, &options).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "name");
    }

    #[test]
    fn swap_produces_mirrored_diff() {
        let from = b"timeout: 30\n";
        let to = b"timeout: 60\n";
        let forward = compare(from, to, &Options::default()).unwrap();
        let backward = compare(to, from, &Options::default()).unwrap();
        assert_eq!(forward[0].from, backward[0].to);
        assert_eq!(forward[0].to, backward[0].from);
    }

    #[test]
    fn swap_option_matches_swapped_arguments() {
        let a = b"timeout: 30\n";
        let b = b"timeout: 60\n";
        let swapped = Options {
            swap: true,
            ..Options::default()
        };
        let via_flag = compare(a, b, &swapped).unwrap();
        let via_args = compare(b, a, &Options::default()).unwrap();
        assert_eq!(via_flag, via_args);
    }

    #[test]
    fn per_side_chroot_narrows_each_input_independently() {
        let from = b"a:\n  shared: 1\nleft_only:\n  value: 1\n";
        let to = b"a:\n  shared: 2\nright_only:\n  value: 2\n";
        let options = Options {
            chroot_from: Some("left_only".to_string()),
            chroot_to: Some("right_only".to_string()),
            ..Options::default()
        };
        let diffs = compare(from, to, &options).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, diff::DiffKind::Modified);
        assert_eq!(diffs[0].path, "value");
    }
}
