//! Path/regex filter (spec §4.10): include and exclude lists applied after
//! sorting, before rendering.

use crate::diff::Difference;
use crate::error::FilterError;
use regex::Regex;

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub include_paths: Vec<String>,
    pub include_patterns: Vec<String>,
    pub exclude_paths: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

enum Matcher {
    Prefix(String),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, path: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => path_matches_prefix(path, prefix),
            Matcher::Pattern(re) => re.is_match(path),
        }
    }
}

fn compile(paths: &[String], patterns: &[String]) -> Result<Vec<Matcher>, FilterError> {
    let mut matchers: Vec<Matcher> = paths.iter().cloned().map(Matcher::Prefix).collect();
    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| FilterError {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        matchers.push(Matcher::Pattern(re));
    }
    Ok(matchers)
}

/// A path matches a filter when it equals the filter exactly, or the
/// filter is a proper prefix ending at a `.` or `[` boundary in the target
/// path -- so `config` matches `config.name` but not `configuration`.
fn path_matches_prefix(path: &str, filter: &str) -> bool {
    if path == filter {
        return true;
    }
    if let Some(rest) = path.strip_prefix(filter) {
        return rest.starts_with('.') || rest.starts_with('[');
    }
    false
}

/// Applies include then exclude filters. If any include filter is
/// configured, a diff survives only when it matches at least one include;
/// exclude filters then drop any surviving match. An invalid regex fails
/// the whole call -- no partial filtering.
pub fn filter(diffs: Vec<Difference>, options: &FilterOptions) -> Result<Vec<Difference>, FilterError> {
    let includes = compile(&options.include_paths, &options.include_patterns)?;
    let excludes = compile(&options.exclude_paths, &options.exclude_patterns)?;

    Ok(diffs
        .into_iter()
        .filter(|d| {
            if !includes.is_empty() && !includes.iter().any(|m| m.matches(&d.path)) {
                return false;
            }
            !excludes.iter().any(|m| m.matches(&d.path))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn diff(path: &str) -> Difference {
        Difference::modified(path, Value::Int(1), Value::Int(2), 0)
    }

    #[test]
    fn prefix_matches_at_dot_boundary_only() {
        assert!(path_matches_prefix("config.name", "config"));
        assert!(!path_matches_prefix("configuration", "config"));
        assert!(path_matches_prefix("config", "config"));
    }

    #[test]
    fn prefix_matches_at_bracket_boundary() {
        assert!(path_matches_prefix("items[0].name", "items"));
    }

    #[test]
    fn no_includes_means_everything_survives_exclude_only() {
        let diffs = vec![diff("a"), diff("b")];
        let opts = FilterOptions {
            exclude_paths: vec!["a".to_string()],
            ..Default::default()
        };
        let result = filter(diffs, &opts).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, "b");
    }

    #[test]
    fn includes_restrict_to_matches() {
        let diffs = vec![diff("a"), diff("b")];
        let opts = FilterOptions {
            include_paths: vec!["a".to_string()],
            ..Default::default()
        };
        let result = filter(diffs, &opts).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, "a");
    }

    #[test]
    fn regex_patterns_match_anywhere() {
        let diffs = vec![diff("spec.containers.app.image")];
        let opts = FilterOptions {
            include_patterns: vec!["containers\\..*\\.image".to_string()],
            ..Default::default()
        };
        assert_eq!(filter(diffs, &opts).unwrap().len(), 1);
    }

    #[test]
    fn invalid_regex_fails_the_whole_call() {
        let diffs = vec![diff("a")];
        let opts = FilterOptions {
            include_patterns: vec!["(unclosed".to_string()],
            ..Default::default()
        };
        assert!(filter(diffs, &opts).is_err());
    }
}
