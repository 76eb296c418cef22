use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_TAG_LEN: usize = 64;

static TAG_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    // letters, digits, '_' and '-', plus kana, CJK and hangul ranges
    Regex::new(r"^[a-zA-Z0-9\u{3040}-\u{309F}\u{30A0}-\u{30FF}\u{4E00}-\u{9FAF}\u{3400}-\u{4DBF}\u{AC00}-\u{D7AF}_-]+$").unwrap()
});

/// Canonical form of a user-entered tag, or `None` when nothing usable is left.
pub fn normalize_tag_name(raw: &str) -> Option<String> {
    let t = raw.trim().trim_start_matches('#');
    let t: String = t.chars().take(MAX_TAG_LEN).collect::<String>().to_lowercase();
    if t.is_empty() || !TAG_NAME_RE.is_match(&t) {
        return None;
    }
    Some(t)
}

/// Normalise every name, dropping invalid ones and repeats. First occurrence wins.
pub fn normalize_tag_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    use std::collections::HashSet;
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in raw {
        if let Some(n) = normalize_tag_name(name.as_ref()) {
            if seen.insert(n.clone()) {
                out.push(n);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_hash_and_case() {
        assert_eq!(normalize_tag_name("  #Rust "), Some("rust".to_string()));
        assert_eq!(normalize_tag_name("日本語"), Some("日本語".to_string()));
    }

    #[test]
    fn rejects_empty_and_invalid() {
        assert_eq!(normalize_tag_name("   "), None);
        assert_eq!(normalize_tag_name("#"), None);
        assert_eq!(normalize_tag_name("two words"), None);
    }

    #[test]
    fn truncates_on_char_boundary() {
        let long = "あ".repeat(MAX_TAG_LEN + 10);
        let n = normalize_tag_name(&long).unwrap();
        assert_eq!(n.chars().count(), MAX_TAG_LEN);
    }

    #[test]
    fn dedupes_after_normalising() {
        let names = normalize_tag_names(["Go", "#go", "rust", "", "GO "]);
        assert_eq!(names, vec!["go".to_string(), "rust".to_string()]);
    }
}
