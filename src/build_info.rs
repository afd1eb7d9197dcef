//! Commit hash and build date, embedded by `build.rs`.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// "<version> <date> (<commit>)" as printed by `--version`
pub fn version_string() -> String {
    format!("{} {} ({})", PACKAGE_VERSION, BUILD_DATE, BUILD_COMMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_is_short_hash_or_unknown() {
        assert!(BUILD_COMMIT == "unknown" || BUILD_COMMIT.len() == 7);
    }

    #[test]
    fn test_date_is_iso() {
        assert_eq!(BUILD_DATE.len(), 10);
        assert_eq!(BUILD_DATE.matches('-').count(), 2);
    }

    #[test]
    fn test_version_string_starts_with_package_version() {
        let version = version_string();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(BUILD_DATE));
        assert!(version.contains(BUILD_COMMIT));
    }
}
