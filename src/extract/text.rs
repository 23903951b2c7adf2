//! Text cleanup helpers shared by the extractor.

use url::Url;

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every `<...>` tag from raw markup, keeping the text between them.
///
/// Tags are replaced by a space so adjacent words do not run together.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Resolve a possibly relative reference against the page URL.
///
/// Values that cannot be resolved pass through unchanged.
pub fn resolve_url(base: Option<&Url>, reference: &str) -> String {
    let reference = reference.trim();
    if reference.is_empty() {
        return String::new();
    }
    base.and_then(|base| base.join(reference).ok())
        .map_or_else(|| reference.to_string(), |url| url.to_string())
}

/// Pull a language hint out of a `class` attribute.
///
/// Recognizes the `language-rust` and `lang-rust` conventions.
pub fn language_from_class(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find_map(|token| {
            token
                .strip_prefix("language-")
                .or_else(|| token.strip_prefix("lang-"))
        })
        .filter(|lang| !lang.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_strip_tags_keeps_text() {
        let stripped = strip_tags("<div><span>broken");
        assert_eq!(normalize_whitespace(&stripped), "broken");
        assert_eq!(normalize_whitespace(&strip_tags("a<br>b")), "a b");
    }

    #[test]
    fn test_resolve_url_relative_and_absolute() {
        let base = Url::parse("https://a.com/posts/one").ok();
        assert_eq!(resolve_url(base.as_ref(), "/x"), "https://a.com/x");
        assert_eq!(resolve_url(base.as_ref(), "two"), "https://a.com/posts/two");
        assert_eq!(
            resolve_url(base.as_ref(), "https://b.org/y"),
            "https://b.org/y"
        );
    }

    #[test]
    fn test_resolve_url_without_base_passes_through() {
        assert_eq!(resolve_url(None, "/x"), "/x");
        let base = Url::parse("https://a.com").ok();
        assert_eq!(resolve_url(base.as_ref(), "http://[bad"), "http://[bad");
    }

    #[test]
    fn test_language_from_class() {
        assert_eq!(
            language_from_class("hljs language-rust"),
            Some("rust".to_string())
        );
        assert_eq!(language_from_class("lang-go"), Some("go".to_string()));
        assert_eq!(language_from_class("language-"), None);
        assert_eq!(language_from_class("highlight"), None);
    }
}
