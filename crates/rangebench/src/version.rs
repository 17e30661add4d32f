//! Version information.

/// Crate version.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Version with the package name, as written to run reports.
#[must_use]
pub fn full_version() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), version())
}
