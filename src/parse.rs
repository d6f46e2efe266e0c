//! Attribute option parser: `key: value; key2: value2`.
//!
//! Keys end at the first `:`. Values may carry their own `:` and `;`, so a
//! value runs to its first `;` and then extends to the last `;` that comes
//! before the next `:`. With no further `:` the value swallows the rest of
//! the source up to its last `;`. A trailing fragment without a `:` is
//! dropped. Parsing never fails.
//!
//! The source is lexed with logos into delimiter and text runs; the scan then
//! works on delimiter offsets only.

use indexmap::IndexMap;
use logos::Logos;

/// Lexical pieces of an attribute string.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    /// Anything between delimiters, whitespace included.
    #[regex(r"[^:;]+")]
    Text,
}

/// Byte offsets of every `:` and `;`, in source order.
fn delimiters(source: &str) -> Vec<(usize, Token)> {
    Token::lexer(source)
        .spanned()
        .filter_map(|(token, span)| match token {
            Ok(tok @ (Token::Colon | Token::Semicolon)) => Some((span.start, tok)),
            _ => None,
        })
        .collect()
}

/// Parse `source` into an ordered string map.
///
/// Later duplicates overwrite earlier keys but keep the first key's position.
pub fn parse_attribute(source: &str) -> IndexMap<String, String> {
    parse_attribute_with(source, str::to_owned)
}

/// Parse `source`, passing every trimmed value through `replacer`.
pub fn parse_attribute_with<T, F>(source: &str, mut replacer: F) -> IndexMap<String, T>
where
    F: FnMut(&str) -> T,
{
    let mut result = IndexMap::new();
    if source.is_empty() {
        return result;
    }

    let delims = delimiters(source);
    let mut last_stop = 0;
    let mut next = 0;

    while let Some(colon) = (next..delims.len()).find(|&i| delims[i].1 == Token::Colon) {
        let key_end = delims[colon].0;
        let key = source[last_stop..key_end].trim();
        let value_start = key_end + 1;

        // The value closes at the first `;` after the key...
        let first_semi = (colon + 1..delims.len()).find(|&i| delims[i].1 == Token::Semicolon);

        // ...then extends to the last `;` before the next `:`.
        let stop = first_semi.map(|first| {
            let mut stop = first;
            for (i, &(_, tok)) in delims.iter().enumerate().skip(first + 1) {
                match tok {
                    Token::Semicolon => stop = i,
                    _ => break,
                }
            }
            stop
        });

        let value_end = stop.map_or(source.len(), |i| delims[i].0);
        result.insert(key.to_owned(), replacer(source[value_start..value_end].trim()));

        match stop {
            Some(i) => {
                last_stop = delims[i].0 + 1;
                next = i + 1;
            }
            None => {
                last_stop = source.len();
                next = delims.len();
            }
        }
    }

    if last_stop < source.len() && !source[last_stop..].trim().is_empty() {
        tracing::trace!(fragment = &source[last_stop..], "dropping unparsable attribute fragment");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(source: &str) -> Vec<(String, String)> {
        parse_attribute(source).into_iter().collect()
    }

    fn expect(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn basic_pairs_with_trailing_semicolon() {
        assert_eq!(
            pairs("type: MyControl; id: foo; name: bar; age: 99;"),
            expect(&[("type", "MyControl"), ("id", "foo"), ("name", "bar"), ("age", "99")])
        );
    }

    #[test]
    fn irregular_whitespace_and_no_trailing_semicolon() {
        assert_eq!(
            pairs("type:   MyControl;    id: foo;name: bar"),
            expect(&[("type", "MyControl"), ("id", "foo"), ("name", "bar")])
        );
    }

    #[test]
    fn empty_source() {
        assert!(parse_attribute("").is_empty());
    }

    #[test]
    fn value_less_key_is_empty_string() {
        assert_eq!(pairs("a:;b:2"), expect(&[("a", ""), ("b", "2")]));
        assert_eq!(pairs("a:"), expect(&[("a", "")]));
    }

    #[test]
    fn embedded_semicolons_stay_in_value() {
        assert_eq!(
            pairs("style: color:red; width: 10px;;b: 1"),
            expect(&[("style", "color:red"), ("width", "10px;"), ("b", "1")])
        );
        assert_eq!(pairs("a: x;y; b: 2"), expect(&[("a", "x;y"), ("b", "2")]));
    }

    #[test]
    fn embedded_colon_before_first_semicolon() {
        assert_eq!(
            pairs("url: http://example.com; id: x"),
            expect(&[("url", "http://example.com"), ("id", "x")])
        );
    }

    #[test]
    fn last_value_swallows_remaining_semicolons() {
        assert_eq!(pairs("a: 1; 2; 3;"), expect(&[("a", "1; 2; 3")]));
    }

    #[test]
    fn trailing_fragment_without_colon_is_dropped() {
        assert_eq!(pairs("a:1;garbage"), expect(&[("a", "1")]));
        assert!(parse_attribute("no delimiters here").is_empty());
        assert!(parse_attribute(";;;").is_empty());
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let parsed = parse_attribute("id: a; name: n; id: b");
        assert_eq!(parsed.get("id").map(String::as_str), Some("b"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn replacer_sees_trimmed_values() {
        let parsed = parse_attribute_with("n: 3 ; m: x", |v| v.len());
        assert_eq!(parsed.get("n"), Some(&1));
        assert_eq!(parsed.get("m"), Some(&1));
    }
}
