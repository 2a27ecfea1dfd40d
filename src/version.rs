//! Build identification.

/// Crate version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit hash injected at build time via `KAHOOK_GIT_COMMIT`.
pub const GIT_COMMIT: &str = match option_env!("KAHOOK_GIT_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

/// Build timestamp injected at build time via `KAHOOK_BUILD_TIME`.
pub const BUILD_TIME: &str = match option_env!("KAHOOK_BUILD_TIME") {
    Some(time) => time,
    None => "unknown",
};

/// `kahook <version> (commit: <commit>, built: <time>)`
pub fn version_string() -> String {
    format!("kahook {VERSION} (commit: {GIT_COMMIT}, built: {BUILD_TIME})")
}
