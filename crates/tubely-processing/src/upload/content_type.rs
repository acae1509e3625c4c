/// Media type essence of a `Content-Type` value: parameters dropped, trimmed, lowercased.
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_content_type("video/mp4"), "video/mp4");
        assert_eq!(normalize_content_type(" Video/MP4 ; codecs=avc1"), "video/mp4");
        assert_eq!(normalize_content_type(""), "");
    }
}
