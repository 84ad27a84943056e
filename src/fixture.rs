/*!
Writing and reading fixtures.

A fixture records, for a set of regexps and a set of haystacks, the match
found under each of four combinations of anchoring and match semantics. It is
a line oriented text format meant for validating a different regex engine
offline:

```text
strings
""
"a"
regexps
"(?:a*)"
0-0;0-0;0-0;0-0
0-1;0-1;0-1;0-1
```

A block starts with the `strings` header followed by one quoted haystack per
line (see [`crate::escape`]). The `regexps` header follows, and then every
regexp is written as one quoted line followed by one record per haystack, in
the same order as the haystacks. A record holds four results separated by
`;`, in the order given by [`RESULT_ORDER`]. A result is `-` when there is no
match. Otherwise, it is a space separated list of one token per capture
group, group 0 first, where each token is either `start-end` or `-` when the
group didn't participate in the match.

A single stream may hold more than one block.
*/

use std::io;

use bstr::{BString, ByteSlice};

use crate::{
    engine::{Anchor, Captures, MatchKind, Span},
    error::Error,
    escape::{escape, unescape},
    tester::{Engine, Tester},
};

/// The anchor mode and match semantics of each result in a fixture record,
/// in order.
pub const RESULT_ORDER: [(Anchor, MatchKind); 4] = [
    (Anchor::Both, MatchKind::LeftmostFirst),
    (Anchor::Unanchored, MatchKind::LeftmostFirst),
    (Anchor::Both, MatchKind::LeftmostLongest),
    (Anchor::Unanchored, MatchKind::LeftmostLongest),
];

/// The four results of one regexp on one haystack, in [`RESULT_ORDER`].
pub type Record = [Option<Captures>; 4];

/// Formats a single match result the way it appears in a fixture.
///
/// # Example
///
/// ```
/// use regex_exhaustive::{engine::{Captures, Span}, fixture::format_result};
///
/// assert_eq!("-", format_result(None));
/// let caps = Captures::new(vec![Some(Span { start: 0, end: 2 }), None]);
/// assert_eq!("0-2 -", format_result(Some(&caps)));
/// ```
pub fn format_result(caps: Option<&Captures>) -> String {
    let Some(caps) = caps else { return "-".to_string() };
    let tokens: Vec<String> = caps
        .iter()
        .map(|span| match span {
            None => "-".to_string(),
            Some(span) => format!("{}-{}", span.start, span.end),
        })
        .collect();
    tokens.join(" ")
}

/// Computes the record of a compiled regexp on a haystack. When the regexp
/// didn't compile, every result in the record is "no match".
pub fn record<T: Tester>(tester: Option<&mut T>, haystack: &[u8]) -> Record {
    let mut record: Record = [None, None, None, None];
    if let Some(tester) = tester {
        for (i, &(anchor, kind)) in RESULT_ORDER.iter().enumerate() {
            record[i] = tester.captures(haystack, anchor, kind);
        }
    }
    record
}

/// A writer of fixtures.
#[derive(Debug)]
pub struct FixtureLog<W> {
    wtr: W,
    /// Whether the haystacks of the current block have been written.
    has_strings: bool,
}

impl<W: io::Write> FixtureLog<W> {
    /// Create a fixture writer that writes to the given writer.
    pub fn new(wtr: W) -> FixtureLog<W> {
        FixtureLog { wtr, has_strings: false }
    }

    /// Returns true once the haystacks of a block have been written.
    pub fn has_strings(&self) -> bool {
        self.has_strings
    }

    /// Starts a new block by writing its haystacks.
    pub fn write_strings<I, S>(&mut self, strings: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.wtr.write_all(b"strings\n")?;
        for s in strings {
            self.write_line(escape(s))?;
        }
        self.wtr.write_all(b"regexps\n")?;
        self.has_strings = true;
        Ok(())
    }

    /// Writes the line that introduces a regexp. It must be followed by one
    /// record for every haystack in the current block.
    pub fn write_regexp(&mut self, regexp: &str) -> Result<(), Error> {
        self.write_line(escape(regexp))
    }

    /// Writes the record of the current regexp for the next haystack.
    pub fn write_record(&mut self, record: &Record) -> Result<(), Error> {
        let fields: Vec<String> =
            record.iter().map(|caps| format_result(caps.as_ref())).collect();
        self.write_line(fields.join(";"))
    }

    fn write_line<B: AsRef<[u8]>>(&mut self, line: B) -> Result<(), Error> {
        self.wtr.write_all(line.as_ref())?;
        self.wtr.write_all(b"\n")?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.wtr.flush()?;
        Ok(())
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

/// A fixture that was read back.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fixture {
    blocks: Vec<Block>,
}

/// A set of haystacks and the records of every regexp on them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Block {
    strings: Vec<BString>,
    entries: Vec<Entry>,
}

/// A regexp and its records, one for each haystack of its block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    regexp: String,
    line: usize,
    records: Vec<Record>,
}

/// A difference between a fixture and an engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mismatch {
    /// The regexp.
    pub regexp: String,
    /// The line of the fixture that introduced the regexp.
    pub line: usize,
    /// The haystack.
    pub haystack: BString,
    /// The anchor mode of the search.
    pub anchor: Anchor,
    /// The match semantics of the search.
    pub kind: MatchKind,
    /// The result recorded in the fixture.
    pub expected: Option<Captures>,
    /// The result reported by the engine.
    pub got: Option<Captures>,
}

impl core::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "line {}: regexp {:?} on {:?} ({:?}, {:?}): expected {}, got {}",
            self.line,
            self.regexp,
            self.haystack,
            self.anchor,
            self.kind,
            format_result(self.expected.as_ref()),
            format_result(self.got.as_ref()),
        )
    }
}

impl Fixture {
    /// Parse a fixture.
    ///
    /// This returns an error that includes the offending line number when
    /// the fixture is malformed.
    pub fn parse(data: &[u8]) -> Result<Fixture, Error> {
        Parser::new(data).parse()
    }

    /// Returns every block in this fixture, in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Replays every regexp in this fixture with the given engine and
    /// returns every result that differs.
    ///
    /// A regexp the engine refuses to compile is treated as never matching.
    /// Any other error from the engine is returned.
    pub fn verify<E: Engine>(
        &self,
        engine: &E,
    ) -> Result<Vec<Mismatch>, Error> {
        let mut mismatches = vec![];
        for block in self.blocks.iter() {
            for entry in block.entries.iter() {
                let mut tester = match engine.compile(&entry.regexp) {
                    Ok(tester) => Some(tester),
                    Err(err) if err.is_compile_error() => {
                        log::debug!(
                            "fixture regexp {:?} did not compile: {}",
                            entry.regexp,
                            err,
                        );
                        None
                    }
                    Err(err) => return Err(err),
                };
                for (haystack, expected) in
                    block.strings.iter().zip(entry.records.iter())
                {
                    let got = record(tester.as_mut(), haystack);
                    for (i, &(anchor, kind)) in RESULT_ORDER.iter().enumerate()
                    {
                        if expected[i] == got[i] {
                            continue;
                        }
                        mismatches.push(Mismatch {
                            regexp: entry.regexp.clone(),
                            line: entry.line,
                            haystack: haystack.clone(),
                            anchor,
                            kind,
                            expected: expected[i].clone(),
                            got: got[i].clone(),
                        });
                    }
                }
            }
        }
        Ok(mismatches)
    }
}

impl Block {
    /// Returns the haystacks of this block.
    pub fn strings(&self) -> &[BString] {
        &self.strings
    }

    /// Returns every regexp in this block with its records.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

impl Entry {
    /// Returns the regexp.
    pub fn regexp(&self) -> &str {
        &self.regexp
    }

    /// Returns one record for each haystack of the block, in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

struct Parser<'a> {
    lines: core::iter::Peekable<core::iter::Enumerate<bstr::Lines<'a>>>,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Parser<'a> {
        Parser { lines: data.lines().enumerate().peekable() }
    }

    fn parse(mut self) -> Result<Fixture, Error> {
        let mut fixture = Fixture::default();
        while let Some((i, line)) = self.lines.next() {
            if line != b"strings" {
                return Err(Error::fixture(
                    i + 1,
                    format!("expected 'strings', got {:?}", line.as_bstr()),
                ));
            }
            fixture.blocks.push(self.parse_block(i + 1)?);
        }
        Ok(fixture)
    }

    fn parse_block(&mut self, header: usize) -> Result<Block, Error> {
        let mut block = Block::default();
        loop {
            let Some((i, line)) = self.lines.next() else {
                return Err(Error::fixture(header, "missing 'regexps' header"));
            };
            if line == b"regexps" {
                break;
            }
            let s = unescape(line)
                .map_err(|err| Error::fixture(i + 1, err.to_string()))?;
            block.strings.push(s);
        }
        while let Some(&(i, line)) = self.lines.peek() {
            if line == b"strings" {
                break;
            }
            self.lines.next();
            let regexp = unescape(line)
                .map_err(|err| Error::fixture(i + 1, err.to_string()))?;
            let regexp = String::from_utf8(Vec::from(regexp))
                .map_err(|_| Error::fixture(i + 1, "regexp is not UTF-8"))?;
            let mut records = Vec::with_capacity(block.strings.len());
            for _ in 0..block.strings.len() {
                let Some((j, line)) = self.lines.next() else {
                    return Err(Error::fixture(
                        i + 1,
                        format!("regexp {:?} is missing records", regexp),
                    ));
                };
                records.push(parse_record(line).map_err(|msg| {
                    Error::fixture(j + 1, msg)
                })?);
            }
            block.entries.push(Entry { regexp, line: i + 1, records });
        }
        Ok(block)
    }
}

fn parse_record(line: &[u8]) -> Result<Record, String> {
    let line = line
        .to_str()
        .map_err(|_| format!("record {:?} is not UTF-8", line.as_bstr()))?;
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() != 4 {
        return Err(format!(
            "expected 4 results separated by ';', got {} in {:?}",
            fields.len(),
            line,
        ));
    }
    let mut record: Record = [None, None, None, None];
    for (result, field) in record.iter_mut().zip(fields) {
        *result = parse_result(field)?;
    }
    Ok(record)
}

fn parse_result(field: &str) -> Result<Option<Captures>, String> {
    if field == "-" {
        return Ok(None);
    }
    let mut spans = vec![];
    for token in field.split(' ') {
        if token == "-" {
            spans.push(None);
            continue;
        }
        let span = token
            .split_once('-')
            .and_then(|(start, end)| {
                let (start, end) = (start.parse().ok()?, end.parse().ok()?);
                Some(Span { start, end })
            })
            .filter(|span| span.start <= span.end)
            .ok_or_else(|| format!("malformed span {:?}", token))?;
        spans.push(Some(span));
    }
    if spans[0].is_none() {
        return Err(format!("result {:?} has no overall match", field));
    }
    Ok(Some(Captures::new(spans)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(spans: &[Option<(usize, usize)>]) -> Captures {
        Captures::new(
            spans
                .iter()
                .map(|s| s.map(|(start, end)| Span { start, end }))
                .collect(),
        )
    }

    #[test]
    fn format_results() {
        assert_eq!("-", format_result(None));
        assert_eq!("0-1", format_result(Some(&caps(&[Some((0, 1))]))));
        assert_eq!(
            "1-3 - 2-3",
            format_result(Some(&caps(&[Some((1, 3)), None, Some((2, 3))]))),
        );
    }

    #[test]
    fn writes_blocks() {
        let mut log = FixtureLog::new(vec![]);
        assert!(!log.has_strings());
        log.write_strings(["", "a\"b"]).unwrap();
        assert!(log.has_strings());
        log.write_regexp("a|b").unwrap();
        log.write_record(&[None, None, None, None]).unwrap();
        let m = Some(caps(&[Some((0, 1)), None]));
        log.write_record(&[None, m.clone(), None, m]).unwrap();
        let got = String::from_utf8(log.into_inner()).unwrap();
        let expected = "\
strings
\"\"
\"a\\\"b\"
regexps
\"a|b\"
-;-;-;-
-;0-1 -;-;0-1 -
";
        assert_eq!(expected, got);
    }

    #[test]
    fn parses_blocks() {
        let data = b"\
strings
\"\"
\"a\"
regexps
\"(a)|b\"
-;-;-;-
0-1 0-1;0-1 0-1;0-1 0-1;0-1 0-1
\"b\"
-;-;-;-
-;-;-;-
strings
\"b\"
regexps
\"b\"
0-1;0-1;0-1;0-1
";
        let fixture = Fixture::parse(data).unwrap();
        assert_eq!(2, fixture.blocks().len());
        let block = &fixture.blocks()[0];
        assert_eq!(2, block.strings().len());
        assert_eq!("a", block.strings()[1]);
        assert_eq!(2, block.entries().len());
        assert_eq!("(a)|b", block.entries()[0].regexp());
        let record = &block.entries()[0].records()[1];
        assert_eq!(Some(caps(&[Some((0, 1)), Some((0, 1))])), record[0]);
        assert_eq!(1, fixture.blocks()[1].entries().len());
    }

    #[test]
    fn parse_errors_have_line_numbers() {
        let err = Fixture::parse(b"regexps\n").unwrap_err();
        assert!(err.to_string().contains("line 1"), "{}", err);

        let data = b"strings\n\"\"\nregexps\n\"a\"\n-;-;-\n";
        let err = Fixture::parse(data).unwrap_err();
        assert!(err.to_string().contains("line 5"), "{}", err);

        let data = b"strings\n\"\"\nregexps\n\"a\"\n1-x;-;-;-\n";
        let err = Fixture::parse(data).unwrap_err();
        assert!(err.to_string().contains("line 5"), "{}", err);

        let data = b"strings\n\"\\t\"\nregexps\n";
        let err = Fixture::parse(data).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);

        let data = b"strings\n\"\"\nregexps\n\"a\"\n";
        let err = Fixture::parse(data).unwrap_err();
        assert!(err.to_string().contains("line 4"), "{}", err);

        let data = b"strings\n\"\"\nregexps\n\"a\"\n- 0-0;-;-;-\n";
        assert!(Fixture::parse(data).is_err());
    }

    #[test]
    fn empty_fixture() {
        assert_eq!(0, Fixture::parse(b"").unwrap().blocks().len());
    }
}
