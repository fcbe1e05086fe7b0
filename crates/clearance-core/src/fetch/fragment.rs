//! GitHub-style line-range fragments (`#L3`, `#L3-L9`)

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^L(\d+)(?:-L(\d+))?$").expect("line fragment pattern is valid"));

/// Inclusive, 1-indexed line range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Parse the fragment part of a URL (without the leading `#`)
    ///
    /// Returns `None` for anything that is not `L<n>` or `L<n>-L<m>` with
    /// `1 <= n <= m`.
    pub fn parse(fragment: &str) -> Option<Self> {
        let caps = LINE_FRAGMENT.captures(fragment)?;
        let start: usize = caps.get(1)?.as_str().parse().ok()?;
        let end: usize = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => start,
        };
        if start == 0 || end < start {
            return None;
        }
        Some(Self { start, end })
    }

    /// Keep only the lines inside the range
    ///
    /// Line endings are kept as found (`\r\n` stays `\r\n`); a final line
    /// without one is terminated by `\n`.
    pub fn extract(&self, text: &str) -> String {
        let mut out = String::new();
        let selected = text
            .split_inclusive('\n')
            .skip(self.start - 1)
            .take(self.end - self.start + 1);
        for line in selected {
            out.push_str(line);
            if !line.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

/// Split `url` into the part to fetch and its fragment, if any
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "one\ntwo\nthree\nfour\nfive\n";

    #[test]
    fn test_parse_range() {
        assert_eq!(LineRange::parse("L2-L3"), Some(LineRange { start: 2, end: 3 }));
        assert_eq!(LineRange::parse("L4"), Some(LineRange { start: 4, end: 4 }));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(LineRange::parse("readme"), None);
        assert_eq!(LineRange::parse("L"), None);
        assert_eq!(LineRange::parse("L0"), None);
        assert_eq!(LineRange::parse("L5-L2"), None);
        assert_eq!(LineRange::parse("L2-3"), None);
        assert_eq!(LineRange::parse("L99999999999999999999999"), None);
    }

    #[test]
    fn test_extract() {
        let range = LineRange::parse("L2-L3").unwrap();
        assert_eq!(range.extract(DOC), "two\nthree\n");
        let single = LineRange::parse("L4").unwrap();
        assert_eq!(single.extract(DOC), "four\n");
    }

    #[test]
    fn test_extract_keeps_crlf() {
        let crlf = "one\r\ntwo\r\nthree\r\n";
        assert_eq!(LineRange::parse("L2-L3").unwrap().extract(crlf), "two\r\nthree\r\n");
    }

    #[test]
    fn test_extract_unterminated_last_line() {
        assert_eq!(LineRange::parse("L2").unwrap().extract("one\ntwo"), "two\n");
    }

    #[test]
    fn test_extract_past_end() {
        let range = LineRange::parse("L4-L10").unwrap();
        assert_eq!(range.extract(DOC), "four\nfive\n");
        assert_eq!(LineRange::parse("L9").unwrap().extract(DOC), "");
    }

    #[test]
    fn test_split_fragment() {
        assert_eq!(
            split_fragment("https://example/file.txt#L2-L3"),
            ("https://example/file.txt", Some("L2-L3"))
        );
        assert_eq!(split_fragment("https://example/file.txt"), ("https://example/file.txt", None));
    }
}
