//! The `Difference` record and the `Options` that govern how the pipeline
//! produces them (spec §3).

use crate::value::Value;
use serde::Deserialize;

/// A single structural difference between a `from` document and a `to`
/// document.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    pub path: String,
    pub kind: DiffKind,
    pub from: Option<Value>,
    pub to: Option<Value>,
    pub document_index: u32,
}

impl Difference {
    pub fn added(path: impl Into<String>, to: Value, document_index: u32) -> Self {
        Difference {
            path: path.into(),
            kind: DiffKind::Added,
            from: None,
            to: Some(to),
            document_index,
        }
    }

    pub fn removed(path: impl Into<String>, from: Value, document_index: u32) -> Self {
        Difference {
            path: path.into(),
            kind: DiffKind::Removed,
            from: Some(from),
            to: None,
            document_index,
        }
    }

    pub fn modified(path: impl Into<String>, from: Value, to: Value, document_index: u32) -> Self {
        Difference {
            path: path.into(),
            kind: DiffKind::Modified,
            from: Some(from),
            to: Some(to),
            document_index,
        }
    }

    pub fn order_changed(path: impl Into<String>, from: Value, to: Value, document_index: u32) -> Self {
        Difference {
            path: path.into(),
            kind: DiffKind::OrderChanged,
            from: Some(from),
            to: Some(to),
            document_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
    OrderChanged,
}

/// Differences batched per source file, the unit structured formatters
/// operate over when comparing a directory pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffGroup {
    pub file_path: String,
    pub diffs: Vec<Difference>,
}

/// Configuration of the core pipeline (spec §3).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    pub ignore_order_changes: bool,
    pub ignore_whitespace_changes: bool,
    pub ignore_value_changes: bool,
    pub detect_kubernetes: bool,
    pub detect_renames: bool,
    pub ignore_api_version: bool,
    pub additional_identifiers: Vec<String>,
    pub chroot: Option<String>,
    /// Overrides `chroot` for the `from` side only.
    pub chroot_from: Option<String>,
    /// Overrides `chroot` for the `to` side only.
    pub chroot_to: Option<String>,
    pub list_to_documents: bool,
    /// When set, `compare` diffs `to` against `from` and swaps the result
    /// back, so `compare(a, b, swap=true) == compare(b, a, swap=false)`
    /// (spec §8).
    pub swap: bool,
}

impl Options {
    /// The chroot path to apply to the `from` side: `chroot_from` if set,
    /// otherwise the shared `chroot`.
    pub fn chroot_from(&self) -> Option<&str> {
        self.chroot_from.as_deref().or(self.chroot.as_deref())
    }

    /// The chroot path to apply to the `to` side: `chroot_to` if set,
    /// otherwise the shared `chroot`.
    pub fn chroot_to(&self) -> Option<&str> {
        self.chroot_to.as_deref().or(self.chroot.as_deref())
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            ignore_order_changes: false,
            ignore_whitespace_changes: false,
            ignore_value_changes: false,
            detect_kubernetes: false,
            detect_renames: false,
            ignore_api_version: false,
            additional_identifiers: Vec::new(),
            chroot: None,
            chroot_from: None,
            chroot_to: None,
            list_to_documents: false,
            swap: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let opts = Options::default();
        assert!(!opts.detect_kubernetes);
        assert!(!opts.detect_renames);
        assert!(opts.additional_identifiers.is_empty());
        assert!(opts.chroot.is_none());
        assert!(!opts.swap);
        assert!(opts.chroot_from.is_none() && opts.chroot_to.is_none());
    }

    #[test]
    fn per_side_chroot_falls_back_to_shared_chroot() {
        let opts = Options {
            chroot: Some("spec".to_string()),
            chroot_from: Some("spec.from".to_string()),
            ..Options::default()
        };
        assert_eq!(opts.chroot_from(), Some("spec.from"));
        assert_eq!(opts.chroot_to(), Some("spec"));
    }

    #[test]
    fn constructors_fill_from_to_per_kind() {
        let added = Difference::added("a", Value::Int(1), 0);
        assert!(added.from.is_none() && added.to.is_some());

        let removed = Difference::removed("a", Value::Int(1), 0);
        assert!(removed.from.is_some() && removed.to.is_none());

        let modified = Difference::modified("a", Value::Int(1), Value::Int(2), 0);
        assert!(modified.from.is_some() && modified.to.is_some());
    }
}
