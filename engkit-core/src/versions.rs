use std::collections::BTreeMap;

/// Names logged by default in `Cli::print_versions`.
pub const ENGKIT_CRATES: &[&str] = &["engkit-core", "engkit-exec", "engkit-log"];

/// engkit crates whose versions are worth logging alongside a tool's own.
pub fn third_party() -> Vec<(&'static str, &'static str)> {
    vec![
        ("engkit-core", env!("CARGO_PKG_VERSION")),
        ("engkit-exec", engkit_exec::VERSION),
        ("engkit-log", engkit_log::VERSION),
    ]
}

/// Versions for the requested names; unknown names are skipped.
pub fn get_versions(names: &[&str]) -> BTreeMap<String, String> {
    let known = third_party();
    names
        .iter()
        .filter_map(|name| {
            known
                .iter()
                .find(|(k, _)| k == name)
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}
