/*!
Quoting of haystacks and regexps for fixture files.

A quoted string is wrapped in double quotes, where `\` and `"` are escaped
with a backslash and a newline is written as `\n`. Every other byte, including
invalid UTF-8, is written as is. This keeps every string on exactly one line.
*/

use bstr::{BString, ByteSlice};

use crate::error::Error;

/// The maximum length of a quoted string, including both quotes.
///
/// Every string quoted by the harness is bounded by its configured size
/// limits, so exceeding this is a bug in the harness.
pub const ESCAPE_CAPACITY: usize = 512;

/// Quote the given bytes.
///
/// # Panics
///
/// When the quoted string would be longer than [`ESCAPE_CAPACITY`].
///
/// # Example
///
/// ```
/// use regex_exhaustive::escape::escape;
///
/// assert_eq!(r#""a\"b\\c\n""#, escape(b"a\"b\\c\n"));
/// ```
pub fn escape<B: AsRef<[u8]>>(bytes: B) -> BString {
    let bytes = bytes.as_ref();
    let mut buf = Vec::with_capacity(bytes.len() + 2);
    buf.push(b'"');
    for &b in bytes.iter() {
        match b {
            b'\\' | b'"' => {
                buf.push(b'\\');
                buf.push(b);
            }
            b'\n' => buf.extend_from_slice(br"\n"),
            _ => buf.push(b),
        }
        // Leave room for the closing quote.
        if buf.len() + 1 > ESCAPE_CAPACITY {
            panic!(
                "escaped form of {:?} exceeds {} bytes",
                bytes.as_bstr(),
                ESCAPE_CAPACITY,
            );
        }
    }
    buf.push(b'"');
    BString::from(buf)
}

/// Reverses [`escape`].
///
/// This returns an error when the given string isn't wrapped in quotes,
/// contains an unescaped quote, or uses an escape sequence `escape` never
/// produces.
///
/// # Example
///
/// ```
/// use regex_exhaustive::escape::unescape;
///
/// assert_eq!(b"a\nb", unescape(br#""a\nb""#)?.as_slice());
/// assert!(unescape(br#""a\tb""#).is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn unescape<B: AsRef<[u8]>>(quoted: B) -> Result<BString, Error> {
    let quoted = quoted.as_ref();
    let inner = quoted
        .strip_prefix(b"\"")
        .and_then(|rest| rest.strip_suffix(b"\""))
        .ok_or_else(|| {
            Error::escape(format!(
                "{:?} is not wrapped in double quotes",
                quoted.as_bstr()
            ))
        })?;
    let mut buf = Vec::with_capacity(inner.len());
    let mut it = inner.iter().copied();
    while let Some(b) = it.next() {
        match b {
            b'\\' => match it.next() {
                Some(b'\\') => buf.push(b'\\'),
                Some(b'"') => buf.push(b'"'),
                Some(b'n') => buf.push(b'\n'),
                Some(other) => {
                    return Err(Error::escape(format!(
                        "unknown escape sequence '\\{}' in {:?}",
                        char::from(other).escape_default(),
                        quoted.as_bstr(),
                    )))
                }
                None => {
                    return Err(Error::escape(format!(
                        "unterminated escape sequence in {:?}",
                        quoted.as_bstr(),
                    )))
                }
            },
            b'"' => {
                return Err(Error::escape(format!(
                    "unescaped double quote in {:?}",
                    quoted.as_bstr(),
                )))
            }
            _ => buf.push(b),
        }
    }
    Ok(BString::from(buf))
}

#[cfg(test)]
mod tests {
    use quickcheck::QuickCheck;

    use super::*;

    #[test]
    fn escapes() {
        assert_eq!(r#""""#, escape(""));
        assert_eq!(r#""abc""#, escape("abc"));
        assert_eq!(r#""\\\"""#, escape(r#"\""#));
        assert_eq!(r#""a\nb""#, escape("a\nb"));
        assert_eq!(b"\"\xFF\r\"".as_bstr(), escape(b"\xFF\r").as_bstr());
    }

    #[test]
    fn capacity_boundary() {
        let quoted = escape("\\".repeat(255));
        assert_eq!(ESCAPE_CAPACITY, quoted.len());
        let quoted = escape("a".repeat(ESCAPE_CAPACITY - 2));
        assert_eq!(ESCAPE_CAPACITY, quoted.len());
    }

    #[test]
    #[should_panic]
    fn capacity_overflow_backslashes() {
        escape("\\".repeat(256));
    }

    #[test]
    #[should_panic]
    fn capacity_overflow_plain() {
        escape("a".repeat(ESCAPE_CAPACITY - 1));
    }

    #[test]
    fn unescape_errors() {
        assert!(unescape("abc").is_err());
        assert!(unescape("\"").is_err());
        assert!(unescape(r#""a"b""#).is_err());
        assert!(unescape(r#""a\""#).is_err());
        assert!(unescape(r#""\x""#).is_err());
    }

    #[test]
    fn roundtrip() {
        fn prop(mut bytes: Vec<u8>) -> bool {
            bytes.truncate((ESCAPE_CAPACITY - 2) / 2);
            let quoted = escape(&bytes);
            !quoted[1..quoted.len() - 1].contains(&b'\n')
                && unescape(&quoted).map(|b| b == bytes).unwrap_or(false)
        }
        QuickCheck::new().tests(1_000).quickcheck(prop as fn(Vec<u8>) -> bool);
    }
}
