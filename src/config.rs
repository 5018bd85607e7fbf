//! Loads `Options` overrides from an optional `everdiff.config.yaml` in the
//! current directory, so a project can check in its comparison defaults
//! instead of repeating flags on every invocation.

use crate::diff::Options;

pub fn config_from_env() -> Option<Options> {
    let raw = std::fs::read_to_string("everdiff.config.yaml").ok()?;
    serde_saphyr::from_str(&raw)
        .inspect_err(|err| {
            log::warn!("failed to deserialize everdiff.config.yaml: {err}");
        })
        .ok()
}
