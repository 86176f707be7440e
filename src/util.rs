use std::iter::repeat;
use std::path::{Path, PathBuf};

use base64::engine::GeneralPurpose;

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

pub fn base64_engine() -> GeneralPurpose {
    base64::engine::GeneralPurpose::new(
        &base64::alphabet::URL_SAFE,
        base64::engine::GeneralPurposeConfig::new(),
    )
}

#[cfg(feature = "validation-regex")]
pub fn is_email(value: &str) -> bool {
    use regex::Regex;
    use std::sync::OnceLock;

    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .map(|re| re.is_match(value))
        .unwrap_or_else(|| value.contains('@'))
}

#[cfg(not(feature = "validation-regex"))]
pub fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check_requires_both_parts() {
        assert!(is_email("student@example.com"));
        assert!(!is_email("student"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("student@"));
    }

    #[test]
    fn first_subpath_is_picked_in_order() {
        let found = find_first_subpath("/config", &["a.yml", "b.yml"], |p| {
            p.ends_with("b.yml")
        });
        assert_eq!(found, Some(PathBuf::from("/config/b.yml")));
    }
}
