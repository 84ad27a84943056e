/*!
A small byte oriented regex engine with more than one way to search.

The harness needs an engine under test whose independent matching strategies
can be cross-checked. This engine compiles a pattern once into a Thompson NFA
and exposes two strategies that execute it:

* [`Strategy::PikeVM`], a linear time NFA simulation that tracks capture
groups.
* [`Strategy::Backtrack`], a naive backtracking search that explores one path
at a time in priority order. It is the reference that every other strategy is
compared against.

Both strategies support leftmost-first and leftmost-longest semantics, and
searches that are unanchored, anchored at the start or anchored at both ends.

Patterns are parsed with Unicode mode disabled and may match invalid UTF-8.
Everything is searched byte by byte.

# Example

```
use regex_exhaustive::engine::{Anchor, MatchKind, Regex, Search, Span};

let re = Regex::new(r"a(b*)")?;
let mut cache = re.create_cache();
let search = Search::new().kind(MatchKind::LeftmostLongest);
let caps = re.search(&mut cache, b"xabb", search).unwrap();
assert_eq!(Some(Span { start: 1, end: 4 }), caps.get(0));
assert_eq!(Some(Span { start: 2, end: 4 }), caps.get(1));

let search = Search::new().anchor(Anchor::Both);
assert!(re.search(&mut cache, b"xabb", search).is_none());

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use crate::{error::Error, int::NonMaxUsize};

use self::{backtrack::Backtracker, nfa::NFA, pikevm::PikeVM};

mod backtrack;
mod look;
mod nfa;
mod pikevm;

/// Where a match is required to be in the haystack.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Anchor {
    /// A match may occur anywhere in the haystack.
    Unanchored,
    /// A match must start at the beginning of the haystack.
    Start,
    /// A match must start at the beginning and end at the end of the
    /// haystack.
    Both,
}

/// Which match to report when more than one is possible.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatchKind {
    /// Report the match a backtracking engine would find first. That is,
    /// the leftmost match where alternations and repetitions prefer their
    /// earlier (or greedier) branches.
    LeftmostFirst,
    /// Report the longest match among those starting at the leftmost
    /// position. Among paths producing that same match, capture groups come
    /// from the one a backtracking engine would find first.
    LeftmostLongest,
}

/// The matching strategy used to execute a search.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Strategy {
    /// The PikeVM, i.e., a Thompson NFA simulation.
    PikeVM,
    /// The naive backtracking reference matcher.
    Backtrack,
}

/// The parameters of a single search.
///
/// The default is an unanchored leftmost-first search with the PikeVM.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Search {
    anchor: Anchor,
    kind: MatchKind,
    strategy: Strategy,
}

impl Search {
    /// Create the default search parameters.
    pub fn new() -> Search {
        Search {
            anchor: Anchor::Unanchored,
            kind: MatchKind::LeftmostFirst,
            strategy: Strategy::PikeVM,
        }
    }

    /// Set the anchor mode of this search.
    pub fn anchor(self, anchor: Anchor) -> Search {
        Search { anchor, ..self }
    }

    /// Set the match semantics of this search.
    pub fn kind(self, kind: MatchKind) -> Search {
        Search { kind, ..self }
    }

    /// Set the strategy that executes this search.
    pub fn strategy(self, strategy: Strategy) -> Search {
        Search { strategy, ..self }
    }

    /// Returns the anchor mode of this search.
    pub fn get_anchor(&self) -> Anchor {
        self.anchor
    }

    /// Returns the match semantics of this search.
    pub fn get_kind(&self) -> MatchKind {
        self.kind
    }

    /// Returns the strategy that executes this search.
    pub fn get_strategy(&self) -> Strategy {
        self.strategy
    }
}

impl Default for Search {
    fn default() -> Search {
        Search::new()
    }
}

/// A half-open range of byte offsets, `[start, end)`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Span {
    /// The start offset, inclusive.
    pub start: usize,
    /// The end offset, exclusive.
    pub end: usize,
}

impl Span {
    /// Returns this span as a range.
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }
}

/// The capture groups of a single match.
///
/// Group `0` always corresponds to the overall match and is always present.
/// Every other group is present only when it participated in the match.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Captures {
    spans: Vec<Option<Span>>,
}

impl Captures {
    /// Create a new set of capture groups from their spans.
    ///
    /// # Panics
    ///
    /// When `spans` is empty or when its first span is absent.
    pub fn new(spans: Vec<Option<Span>>) -> Captures {
        assert!(
            spans.first().map_or(false, |s| s.is_some()),
            "group 0 must always be present in a match",
        );
        Captures { spans }
    }

    /// Builds capture groups from pairs of slots. Returns `None` when there
    /// is no overall match.
    fn from_slots(slots: &[Option<NonMaxUsize>]) -> Option<Captures> {
        let spans: Vec<Option<Span>> = slots
            .chunks(2)
            .map(|pair| match (pair[0], pair.get(1).copied().flatten()) {
                (Some(start), Some(end)) => {
                    Some(Span { start: start.get(), end: end.get() })
                }
                _ => None,
            })
            .collect();
        if spans.first().map_or(true, |s| s.is_none()) {
            return None;
        }
        Some(Captures { spans })
    }

    /// Returns the span of the given group, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied().flatten()
    }

    /// Returns the span of the overall match.
    pub fn span(&self) -> Span {
        // OK because a Captures value always has group 0.
        self.spans[0].unwrap_or(Span { start: 0, end: 0 })
    }

    /// Returns the total number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns an iterator over every group, in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<Span>> + '_ {
        self.spans.iter().copied()
    }
}

/// A compiled regular expression that can be searched with more than one
/// strategy.
#[derive(Clone)]
pub struct Regex {
    pikevm: PikeVM,
    backtrack: Backtracker,
}

impl Regex {
    /// Parse and compile the given pattern.
    ///
    /// A pattern that doesn't parse, or that uses a construct this engine
    /// doesn't support (like a Unicode word boundary), returns an error for
    /// which [`Error::is_compile_error`] is true.
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        let hir = regex_syntax::ParserBuilder::new()
            .unicode(false)
            .utf8(false)
            .build()
            .parse(pattern)
            .map_err(Error::syntax)?;
        let nfa = NFA::new(nfa::Config::default(), pattern.to_string(), &hir)?;
        log::trace!("compiled regexp {:?} to {:?}", pattern, nfa);
        Ok(Regex {
            pikevm: PikeVM::new(nfa.clone()),
            backtrack: Backtracker::new(nfa),
        })
    }

    /// Returns the pattern this regex was compiled from.
    pub fn as_str(&self) -> &str {
        self.pikevm.nfa().pattern()
    }

    /// Returns the number of capture groups, including group 0.
    pub fn group_len(&self) -> usize {
        self.pikevm.nfa().group_len()
    }

    /// Create a cache that can be used with searches on this regex.
    pub fn create_cache(&self) -> Cache {
        Cache {
            pikevm: pikevm::Cache::new(&self.pikevm),
            backtrack: backtrack::Cache::new(),
        }
    }

    /// Search the haystack and report every capture group of the match.
    pub fn search(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        search: Search,
    ) -> Option<Captures> {
        let mut slots = vec![None; self.pikevm.nfa().slot_len()];
        if !self.search_slots(cache, haystack, search, &mut slots) {
            return None;
        }
        Captures::from_slots(&slots)
    }

    /// Search the haystack and report only the overall match.
    ///
    /// The strategy tracks no capture group other than group 0 in this case.
    pub fn find(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        search: Search,
    ) -> Option<Span> {
        let mut slots = [None, None];
        if !self.search_slots(cache, haystack, search, &mut slots) {
            return None;
        }
        Captures::from_slots(&slots).map(|caps| caps.span())
    }

    /// Returns true if and only if the haystack matches.
    ///
    /// The strategy tracks no capture group at all in this case.
    pub fn is_match(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        search: Search,
    ) -> bool {
        self.search_slots(cache, haystack, search, &mut [])
    }

    fn search_slots(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        search: Search,
        slots: &mut [Option<NonMaxUsize>],
    ) -> bool {
        match search.strategy {
            Strategy::PikeVM => self.pikevm.search(
                &mut cache.pikevm,
                haystack,
                search.anchor,
                search.kind,
                slots,
            ),
            Strategy::Backtrack => self.backtrack.search(
                &mut cache.backtrack,
                haystack,
                search.anchor,
                search.kind,
                slots,
            ),
        }
    }
}

impl core::fmt::Debug for Regex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Regex").field(&self.as_str()).finish()
    }
}

/// Mutable scratch space used by every strategy of a [`Regex`].
///
/// A cache may only be used with the regex that created it.
#[derive(Clone, Debug)]
pub struct Cache {
    pikevm: pikevm::Cache,
    backtrack: backtrack::Cache,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Option<Span> {
        Some(Span { start, end })
    }

    fn spans(
        pattern: &str,
        haystack: &[u8],
        search: Search,
    ) -> Option<Vec<Option<Span>>> {
        let re = Regex::new(pattern).unwrap();
        let mut cache = re.create_cache();
        let pike = re
            .search(&mut cache, haystack, search.strategy(Strategy::PikeVM))
            .map(|caps| caps.iter().collect::<Vec<_>>());
        let back = re
            .search(&mut cache, haystack, search.strategy(Strategy::Backtrack))
            .map(|caps| caps.iter().collect::<Vec<_>>());
        assert_eq!(pike, back, "strategies disagree on {:?}", pattern);
        pike
    }

    #[test]
    fn leftmost_first_prefers_earlier_branch() {
        let got = spans("a|ab", b"ab", Search::new());
        assert_eq!(Some(vec![span(0, 1)]), got);
    }

    #[test]
    fn leftmost_longest_prefers_longer_branch() {
        let search = Search::new().kind(MatchKind::LeftmostLongest);
        let got = spans("a|ab", b"ab", search);
        assert_eq!(Some(vec![span(0, 2)]), got);
        let got = spans("(a|ab)(c|bcd)", b"abcd", search);
        assert_eq!(Some(vec![span(0, 4), span(0, 1), span(1, 4)]), got);
    }

    #[test]
    fn leftmost_longest_prefers_earlier_start() {
        let search = Search::new().kind(MatchKind::LeftmostLongest);
        let got = spans("abcd|bc", b"abcd", search);
        assert_eq!(Some(vec![span(0, 4)]), got);
    }

    #[test]
    fn lazy_repetition() {
        let got = spans("a+?", b"aaa", Search::new());
        assert_eq!(Some(vec![span(0, 1)]), got);
        let search = Search::new().kind(MatchKind::LeftmostLongest);
        let got = spans("a+?", b"aaa", search);
        assert_eq!(Some(vec![span(0, 3)]), got);
    }

    #[test]
    fn anchors() {
        let search = Search::new().anchor(Anchor::Start);
        assert_eq!(None, spans("b", b"ab", search));
        assert_eq!(Some(vec![span(0, 1)]), spans("a", b"ab", search));

        let search = Search::new().anchor(Anchor::Both);
        assert_eq!(None, spans("a", b"ab", search));
        assert_eq!(Some(vec![span(0, 2)]), spans("a|ab", b"ab", search));
    }

    #[test]
    fn empty_loop_captures() {
        let got = spans("(a*)*", b"b", Search::new());
        assert_eq!(Some(vec![span(0, 0), span(0, 0)]), got);
        let got = spans("(a*)+$", b"b", Search::new());
        assert_eq!(Some(vec![span(1, 1), span(1, 1)]), got);
    }

    #[test]
    fn unset_groups() {
        let got = spans("(a)|(b)", b"b", Search::new());
        assert_eq!(Some(vec![span(0, 1), None, span(0, 1)]), got);
    }

    #[test]
    fn find_and_is_match() {
        let re = Regex::new("(b+)").unwrap();
        let mut cache = re.create_cache();
        for &strategy in &[Strategy::PikeVM, Strategy::Backtrack] {
            for &kind in
                &[MatchKind::LeftmostFirst, MatchKind::LeftmostLongest]
            {
                let search = Search::new().strategy(strategy).kind(kind);
                assert_eq!(
                    Some(Span { start: 1, end: 3 }),
                    re.find(&mut cache, b"abbc", search)
                );
                assert!(re.is_match(&mut cache, b"abbc", search));
                assert!(!re.is_match(&mut cache, b"ac", search));
            }
        }
    }

    #[test]
    fn invalid_utf8_haystack() {
        let got = spans(r"(?-u:\xFF)+", b"a\xFF\xFF", Search::new());
        assert_eq!(Some(vec![span(1, 3)]), got);
    }

    #[test]
    fn compile_errors() {
        assert!(Regex::new("[").unwrap_err().is_compile_error());
        assert!(Regex::new(r"(?u)\b").unwrap_err().is_compile_error());
        assert!(Regex::new(r"(?u)\w").unwrap_err().is_compile_error());
        assert!(Regex::new(r"(?u:[a-z])").is_ok());
    }

    #[test]
    fn group_len() {
        assert_eq!(1, Regex::new("a").unwrap().group_len());
        assert_eq!(3, Regex::new("(a)(?:b)(c)").unwrap().group_len());
    }
}
