//! Column allow-list and path unescaping

use std::collections::HashSet;

use crate::error::{CoreError, Result};

/// Decode a percent-encoded path segment.
///
/// Every `%` must introduce two hex digits and the decoded bytes must be
/// UTF-8. `+` is left as is.
pub fn unescape(s: &str) -> Result<String> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            let valid = escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(CoreError::InvalidEncoding(format!(
                    "invalid URL escape \"{}\"",
                    String::from_utf8_lossy(&bytes[i..end])
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CoreError::InvalidEncoding(format!("invalid UTF-8 after unescaping: {}", e)))
}

/// Set of column names a caller asked for. Empty means every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    names: HashSet<String>,
}

impl ColumnFilter {
    /// Build the filter from a comma-separated list of percent-encoded names
    pub fn parse(raw: &str) -> Result<Self> {
        let names = raw
            .split(',')
            .filter(|token| !token.is_empty())
            .map(unescape)
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self { names })
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether a column passes, matching either its raw or its cased name
    pub fn allows(&self, raw_header: &str, cased_key: &str) -> bool {
        self.is_empty() || self.contains(cased_key) || self.contains(raw_header)
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("Sheet%201").unwrap(), "Sheet 1");
        assert_eq!(unescape("a+b").unwrap(), "a+b");
        assert_eq!(unescape("%E5%90%8D").unwrap(), "名");
        assert_eq!(unescape("plain").unwrap(), "plain");
    }

    #[test]
    fn test_unescape_rejects_bad_escapes() {
        let err = unescape("bad%zzname").unwrap_err();
        assert_eq!(err, CoreError::InvalidEncoding("invalid URL escape \"%zz\"".into()));

        assert!(unescape("trailing%").is_err());
        assert!(unescape("short%4").is_err());
        assert!(unescape("%FF").is_err());
    }

    #[test]
    fn test_parse_empty() {
        let filter = ColumnFilter::parse("").unwrap();
        assert!(filter.is_empty());
        assert!(filter.allows("Anything", "anything"));

        let filter = ColumnFilter::parse(",,").unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_decodes_tokens() {
        let filter = ColumnFilter::parse("Full%20Name,age,").unwrap();
        assert!(filter.contains("Full Name"));
        assert!(filter.contains("age"));
        assert!(!filter.contains("Full%20Name"));
    }

    #[test]
    fn test_parse_invalid_token() {
        assert!(matches!(
            ColumnFilter::parse("ok,bad%g1"),
            Err(CoreError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_allows_raw_or_cased() {
        let filter = ColumnFilter::from_iter(["Full Name", "age"]);
        assert!(filter.allows("Full Name", "fullName"));
        assert!(filter.allows("Age", "age"));
        assert!(!filter.allows("Email", "email"));
    }
}
