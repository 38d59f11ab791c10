//! OpenAPI version constants and support checking.

/// OpenAPI version written into new documents
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Supported OpenAPI major version
pub const OPENAPI_MAJOR: u32 = 3;

/// Supported OpenAPI minor version
pub const OPENAPI_MINOR: u32 = 0;

/// Checks whether a document's `openapi` value is a 3.0.x version.
///
/// Other versions are still imported; this only drives a warning since no
/// migration between dialects is performed.
///
/// # Examples
///
/// ```
/// use docket::version::is_supported;
///
/// assert!(is_supported("3.0.0"));
/// assert!(is_supported("3.0.3"));
/// assert!(!is_supported("3.1.0"));
/// assert!(!is_supported("2.0"));
/// ```
pub fn is_supported(openapi_version: &str) -> bool {
    let parts: Vec<&str> = openapi_version.trim().split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }

    let major = parts[0].parse::<u32>().ok();
    let minor = parts[1].parse::<u32>().ok();
    let patch_ok = parts.get(2).map_or(true, |p| p.parse::<u32>().is_ok());

    match (major, minor) {
        (Some(major), Some(minor)) => {
            major == OPENAPI_MAJOR && minor == OPENAPI_MINOR && patch_ok
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(is_supported("3.0.0"));
        assert!(is_supported("3.0.2"));
        // YAML `openapi: 3.0` loads as a two-part version
        assert!(is_supported("3.0"));

        assert!(!is_supported("3.1.0"));
        assert!(!is_supported("2.0"));
        assert!(!is_supported("3"));
        assert!(!is_supported("3.0.x"));
        assert!(!is_supported(""));
    }
}
