//! Version information stamped at build time.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_SHA: &str = env!("IFCHECK_GIT_SHA");
pub const BUILD_DATE: &str = env!("IFCHECK_BUILD_DATE");

/// "0.3.0 (abc1234, 2026-10-16)"
pub fn long_version() -> String {
    format!("{} ({}, {})", VERSION, GIT_SHA, BUILD_DATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_starts_with_package_version() {
        assert!(long_version().starts_with(VERSION));
    }

    #[test]
    fn test_build_date_is_calendar_date() {
        let parts: Vec<&str> = BUILD_DATE.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
        assert!(!GIT_SHA.is_empty());
    }
}
