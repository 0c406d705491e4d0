//! Common utilities

use xxhash_rust::xxh3::xxh3_64;

/// Compute the content hash recorded in manifest entries (XXH3, 16 hex chars)
pub fn hash_content(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

/// Truncate string to max bytes, returning (truncated_string, was_truncated)
pub fn truncate_string(s: &str, max_bytes: usize) -> (String, bool) {
    if s.len() <= max_bytes {
        return (s.to_string(), false);
    }

    // Find a valid UTF-8 boundary
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    (s[..end].to_string(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content() {
        let hash = hash_content(b"hello world");
        assert_eq!(hash.len(), 16); // 64-bit hex
        assert_eq!(hash, hash_content(b"hello world"));
        assert_ne!(hash, hash_content(b"hello world!"));
    }

    #[test]
    fn test_hash_empty_content() {
        assert_eq!(hash_content(b"").len(), 16);
    }

    #[test]
    fn test_truncate_string() {
        let s = "hello world";
        let (truncated, was_truncated) = truncate_string(s, 5);
        assert_eq!(truncated, "hello");
        assert!(was_truncated);

        let (not_truncated, was_truncated) = truncate_string(s, 100);
        assert_eq!(not_truncated, s);
        assert!(!was_truncated);
    }

    #[test]
    fn test_truncate_string_utf8() {
        let s = "你好世界";
        let (truncated, _) = truncate_string(s, 6);
        assert_eq!(truncated, "你好"); // Each Chinese char is 3 bytes
    }
}
