//! Destination file naming

use url::Url;

/// Longest sanitized display name kept in a filename, in characters
pub const MAX_NAME_CHARS: usize = 100;

/// Extension used when the payload location has none
pub const DEFAULT_EXTENSION: &str = ".zip";

/// Reduce a display name to alphanumerics, spaces, hyphens and underscores
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    kept.trim().chars().take(MAX_NAME_CHARS).collect()
}

/// Extension (with leading dot) of the last path segment of `url`
pub fn file_extension(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// `<sanitized-name>_<uid><ext>`
///
/// The uid keeps names unique even when two display names sanitize to the
/// same string, or to nothing at all.
pub fn destination_filename(name: &str, uid: &str, location: &Url) -> String {
    format!("{}_{}{}", sanitize_name(name), uid, file_extension(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_sanitize_strips_path_unsafe_characters() {
        assert_eq!(sanitize_name("Robot/Model:v2*"), "RobotModelv2");
        assert_eq!(sanitize_name("  Low-poly tree_01 <final>  "), "Low-poly tree_01 final");
        assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
    }

    #[test]
    fn test_sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_name("Château №5"), "Château 5");
    }

    #[test]
    fn test_sanitize_truncates_to_100_chars() {
        let long = "x".repeat(250);
        assert_eq!(sanitize_name(&long).chars().count(), MAX_NAME_CHARS);

        let wide = "é".repeat(150);
        assert_eq!(sanitize_name(&wide).chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_sanitize_can_be_empty() {
        assert_eq!(sanitize_name("***"), "");
        assert_eq!(sanitize_name(""), "");
    }

    #[test]
    fn test_extension_from_path() {
        assert_eq!(file_extension(&url("https://cdn.example.com/a/model.zip")), ".zip");
        assert_eq!(
            file_extension(&url("https://cdn.example.com/a/scene.gltf.zip?X-Sig=abc.def&e=1")),
            ".zip"
        );
        assert_eq!(file_extension(&url("https://cdn.example.com/a/model.blend")), ".blend");
    }

    #[test]
    fn test_extension_defaults_to_archive() {
        assert_eq!(file_extension(&url("https://cdn.example.com/a/archive")), ".zip");
        assert_eq!(file_extension(&url("https://cdn.example.com/")), ".zip");
        assert_eq!(file_extension(&url("https://cdn.example.com/a/file.")), ".zip");
    }

    #[test]
    fn test_destination_filename_unique_per_uid() {
        let location = url("https://cdn.example.com/x/model.zip");
        let a = destination_filename("Robot/Model:v2*", "uid1", &location);
        let b = destination_filename("Robot Model v2?", "uid2", &location);
        assert_eq!(a, "RobotModelv2_uid1.zip");
        assert_ne!(a, b);

        assert_eq!(destination_filename("???", "uid3", &location), "_uid3.zip");
    }
}
