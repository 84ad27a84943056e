use crate::error::Error;

/// A look-around assertion supported by the engine under test.
///
/// Only the ASCII variants of the assertions `regex-syntax` can produce are
/// supported. Since patterns are always parsed with Unicode mode disabled,
/// Unicode word boundaries only show up when a pattern explicitly re-enables
/// Unicode mode, and such patterns are rejected at compile time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Look {
    /// Match the beginning of text.
    Start,
    /// Match the end of text.
    End,
    /// Match the beginning of a line or the beginning of text.
    StartLF,
    /// Match the end of a line or the end of text.
    EndLF,
    /// Like `StartLF`, but also treats `\r` as a line terminator, without
    /// ever matching between a `\r` and a `\n`.
    StartCRLF,
    /// Like `EndLF`, but also treats `\r` as a line terminator, without ever
    /// matching between a `\r` and a `\n`.
    EndCRLF,
    /// An ASCII word boundary.
    Word,
    /// The negation of an ASCII word boundary.
    WordNegate,
    /// The start of an ASCII word.
    WordStart,
    /// The end of an ASCII word.
    WordEnd,
    /// The start half of an ASCII word boundary.
    WordStartHalf,
    /// The end half of an ASCII word boundary.
    WordEndHalf,
}

impl Look {
    /// Converts a look-around assertion from `regex-syntax` into one this
    /// engine can execute.
    pub(crate) fn from_hir(
        look: regex_syntax::hir::Look,
    ) -> Result<Look, Error> {
        use regex_syntax::hir::Look as L;

        Ok(match look {
            L::Start => Look::Start,
            L::End => Look::End,
            L::StartLF => Look::StartLF,
            L::EndLF => Look::EndLF,
            L::StartCRLF => Look::StartCRLF,
            L::EndCRLF => Look::EndCRLF,
            L::WordAscii => Look::Word,
            L::WordAsciiNegate => Look::WordNegate,
            L::WordStartAscii => Look::WordStart,
            L::WordEndAscii => Look::WordEnd,
            L::WordStartHalfAscii => Look::WordStartHalf,
            L::WordEndHalfAscii => Look::WordEndHalf,
            _ => {
                return Err(Error::unsupported(
                    "Unicode word boundaries are not supported",
                ))
            }
        })
    }

    /// Returns true if the given position in the given haystack matches this
    /// look-around assertion.
    pub(crate) fn is_match(&self, haystack: &[u8], at: usize) -> bool {
        use self::Look::*;

        let word_before = at > 0 && is_word_byte(haystack[at - 1]);
        let word_after = at < haystack.len() && is_word_byte(haystack[at]);
        match *self {
            Start => at == 0,
            End => at == haystack.len(),
            StartLF => at == 0 || haystack[at - 1] == b'\n',
            EndLF => at == haystack.len() || haystack[at] == b'\n',
            StartCRLF => {
                at == 0
                    || haystack[at - 1] == b'\n'
                    || (haystack[at - 1] == b'\r'
                        && (at >= haystack.len() || haystack[at] != b'\n'))
            }
            EndCRLF => {
                at == haystack.len()
                    || haystack[at] == b'\r'
                    || (haystack[at] == b'\n'
                        && (at == 0 || haystack[at - 1] != b'\r'))
            }
            Word => word_before != word_after,
            WordNegate => word_before == word_after,
            WordStart => !word_before && word_after,
            WordEnd => word_before && !word_after,
            WordStartHalf => !word_before,
            WordEndHalf => !word_after,
        }
    }
}

/// Returns true if and only if the given byte is considered a word character.
/// This only applies to ASCII.
fn is_word_byte(b: u8) -> bool {
    matches!(b, b'_' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_anchors() {
        assert!(Look::StartLF.is_match(b"a\nb", 2));
        assert!(!Look::StartLF.is_match(b"a\nb", 1));
        assert!(Look::EndLF.is_match(b"a\nb", 1));
        assert!(Look::EndLF.is_match(b"a\nb", 3));
        assert!(!Look::EndCRLF.is_match(b"\r\n", 1));
        assert!(!Look::StartCRLF.is_match(b"\r\n", 1));
    }

    #[test]
    fn word_boundaries() {
        assert!(Look::Word.is_match(b"ab", 0));
        assert!(!Look::Word.is_match(b"ab", 1));
        assert!(Look::WordNegate.is_match(b"ab", 1));
        assert!(Look::WordEnd.is_match(b"a ", 1));
        assert!(!Look::WordStart.is_match(b"a ", 1));
        assert!(Look::WordStartHalf.is_match(b"", 0));
        assert!(Look::WordEndHalf.is_match(b"", 0));
    }
}
