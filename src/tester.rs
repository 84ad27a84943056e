/*!
The matching oracle: compiles a candidate regexp and decides whether every
matching strategy agrees on a haystack.

The exhaustive driver is generic over [`Engine`], so any engine that can
report agreement on a haystack (and the match it found, for fixtures) can be
tested. [`Differential`] is the engine provided by this crate. It cross-checks
the strategies of [`crate::engine::Regex`] against each other and against the
PikeVM from `regex-automata`.
*/

use bstr::BStr;

use regex_automata::{
    nfa::thompson::{self, pikevm},
    util::{captures::Captures as AutomataCaptures, syntax},
    Anchored, Input,
};

use crate::{
    engine::{
        self, Anchor, Captures, MatchKind, Regex, Search, Span, Strategy,
    },
    error::Error,
};

/// All anchor modes, in the order they are checked.
pub const ANCHORS: [Anchor; 3] =
    [Anchor::Unanchored, Anchor::Start, Anchor::Both];

/// All match kinds, in the order they are checked.
pub const KINDS: [MatchKind; 2] =
    [MatchKind::LeftmostFirst, MatchKind::LeftmostLongest];

/// Something that can compile a regexp into a [`Tester`].
pub trait Engine {
    /// The compiled form of a single regexp.
    type Tester: Tester;

    /// Compile the given regexp.
    ///
    /// When the engine refuses the regexp, implementations should return an
    /// error for which [`Error::is_compile_error`] is true. The driver skips
    /// such regexps without counting a failure.
    fn compile(&self, regexp: &str) -> Result<Self::Tester, Error>;
}

/// A compiled regexp that can be checked against haystacks.
pub trait Tester {
    /// Returns true if and only if every matching strategy agrees on the
    /// given haystack.
    fn test_input(&mut self, haystack: &[u8]) -> bool;

    /// Returns the match for the given haystack under the given anchor mode
    /// and match semantics, as determined by the engine's reference matcher.
    fn captures(
        &mut self,
        haystack: &[u8],
        anchor: Anchor,
        kind: MatchKind,
    ) -> Option<Captures>;
}

impl<E: Engine + ?Sized> Engine for &E {
    type Tester = E::Tester;

    fn compile(&self, regexp: &str) -> Result<E::Tester, Error> {
        (**self).compile(regexp)
    }
}

/// The engine that cross-checks every strategy this crate knows about.
///
/// For each anchor mode and each match kind, a haystack is searched with:
///
/// * the backtracker, which is the reference,
/// * the PikeVM reporting every capture group,
/// * the PikeVM and the backtracker reporting only the overall match,
/// * the PikeVM reporting only whether there is a match,
/// * the PikeVM from `regex-automata`, for leftmost-first semantics.
///
/// Every result must agree with the reference.
#[derive(Clone, Debug, Default)]
pub struct Differential {
    _priv: (),
}

impl Differential {
    /// Create a new differential engine.
    pub fn new() -> Differential {
        Differential::default()
    }
}

impl Engine for Differential {
    type Tester = DifferentialTester;

    fn compile(&self, regexp: &str) -> Result<DifferentialTester, Error> {
        let re = Regex::new(regexp)?;
        let cache = re.create_cache();
        let automata = match Automata::new(regexp) {
            Ok(automata) => Some(automata),
            Err(err) => {
                log::debug!(
                    "regex-automata rejected {:?}, skipping it: {}",
                    regexp,
                    err,
                );
                None
            }
        };
        Ok(DifferentialTester { re, cache, automata })
    }
}

/// A regexp compiled by [`Differential`].
#[derive(Debug)]
pub struct DifferentialTester {
    re: Regex,
    cache: engine::Cache,
    automata: Option<Automata>,
}

impl DifferentialTester {
    fn search(
        &mut self,
        haystack: &[u8],
        anchor: Anchor,
        kind: MatchKind,
        strategy: Strategy,
    ) -> Option<Captures> {
        let search =
            Search::new().anchor(anchor).kind(kind).strategy(strategy);
        self.re.search(&mut self.cache, haystack, search)
    }

    /// Checks every strategy against the reference for one anchor mode and
    /// one match kind.
    fn check(
        &mut self,
        haystack: &[u8],
        anchor: Anchor,
        kind: MatchKind,
    ) -> bool {
        let reference =
            self.search(haystack, anchor, kind, Strategy::Backtrack);
        let want_span = reference.as_ref().map(|caps| caps.span());
        let mut ok = true;

        let got = self.search(haystack, anchor, kind, Strategy::PikeVM);
        ok &= self.agree("PikeVM", haystack, anchor, kind, &reference, &got);

        for &strategy in &[Strategy::PikeVM, Strategy::Backtrack] {
            let search =
                Search::new().anchor(anchor).kind(kind).strategy(strategy);
            let got = self.re.find(&mut self.cache, haystack, search);
            let name = match strategy {
                Strategy::PikeVM => "PikeVM (span only)",
                Strategy::Backtrack => "backtracker (span only)",
            };
            ok &= self.agree(name, haystack, anchor, kind, &want_span, &got);
        }

        let search = Search::new().anchor(anchor).kind(kind);
        let got = self.re.is_match(&mut self.cache, haystack, search);
        ok &= self.agree(
            "PikeVM (is match)",
            haystack,
            anchor,
            kind,
            &reference.is_some(),
            &got,
        );

        if kind == MatchKind::LeftmostFirst {
            if let Some(ref mut automata) = self.automata {
                let got = automata.captures(haystack, anchor);
                ok &= self.agree(
                    "regex-automata PikeVM",
                    haystack,
                    anchor,
                    kind,
                    &reference,
                    &got,
                );
            }
        }
        ok
    }

    fn agree<T: PartialEq + core::fmt::Debug>(
        &self,
        strategy: &str,
        haystack: &[u8],
        anchor: Anchor,
        kind: MatchKind,
        want: &T,
        got: &T,
    ) -> bool {
        if want == got {
            return true;
        }
        log::warn!(
            "{} disagrees with the backtracker on regexp {:?}, \
             haystack {:?}, {:?}, {:?}: expected {:?}, got {:?}",
            strategy,
            self.re.as_str(),
            BStr::new(haystack),
            anchor,
            kind,
            want,
            got,
        );
        false
    }
}

impl Tester for DifferentialTester {
    fn test_input(&mut self, haystack: &[u8]) -> bool {
        log::trace!("testing haystack {:?}", BStr::new(haystack));
        let mut ok = true;
        for &anchor in ANCHORS.iter() {
            for &kind in KINDS.iter() {
                ok &= self.check(haystack, anchor, kind);
            }
        }
        ok
    }

    fn captures(
        &mut self,
        haystack: &[u8],
        anchor: Anchor,
        kind: MatchKind,
    ) -> Option<Captures> {
        self.search(haystack, anchor, kind, Strategy::Backtrack)
    }
}

/// The `regex-automata` PikeVM, configured to match the syntax and byte
/// semantics of this crate's engine.
///
/// `regex-automata` has no leftmost-longest mode and no way to require a
/// match to end at the end of the haystack, so the latter is emulated by
/// compiling a second regex with a trailing `\z`.
#[derive(Debug)]
struct Automata {
    re: pikevm::PikeVM,
    cache: pikevm::Cache,
    caps: AutomataCaptures,
    both: pikevm::PikeVM,
    both_cache: pikevm::Cache,
    both_caps: AutomataCaptures,
}

impl Automata {
    fn new(pattern: &str) -> Result<Automata, thompson::BuildError> {
        let re = Automata::build(pattern)?;
        let both = Automata::build(&format!(r"(?:{})\z", pattern))?;
        let (cache, caps) = (re.create_cache(), re.create_captures());
        let (both_cache, both_caps) =
            (both.create_cache(), both.create_captures());
        Ok(Automata { re, cache, caps, both, both_cache, both_caps })
    }

    fn build(pattern: &str) -> Result<pikevm::PikeVM, thompson::BuildError> {
        pikevm::PikeVM::builder()
            .syntax(syntax::Config::new().unicode(false).utf8(false))
            .thompson(thompson::Config::new().utf8(false))
            .build(pattern)
    }

    fn captures(
        &mut self,
        haystack: &[u8],
        anchor: Anchor,
    ) -> Option<Captures> {
        let input = Input::new(haystack);
        let caps = match anchor {
            Anchor::Unanchored => {
                self.re.search(&mut self.cache, &input, &mut self.caps);
                &self.caps
            }
            Anchor::Start => {
                let input = input.anchored(Anchored::Yes);
                self.re.search(&mut self.cache, &input, &mut self.caps);
                &self.caps
            }
            Anchor::Both => {
                let input = input.anchored(Anchored::Yes);
                self.both.search(
                    &mut self.both_cache,
                    &input,
                    &mut self.both_caps,
                );
                &self.both_caps
            }
        };
        if !caps.is_match() {
            return None;
        }
        let spans = caps
            .iter()
            .map(|span| span.map(|s| Span { start: s.start, end: s.end }))
            .collect();
        Some(Captures::new(spans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_on_simple_regexps() {
        let engine = Differential::new();
        for pattern in &["a", "a|ab", "(a*)*", "(?:a+)?b", r"\bb", "(a|b)+$"] {
            let mut tester = engine.compile(pattern).unwrap();
            for haystack in &["", "a", "ab", "ba", "aab", "b b"] {
                assert!(
                    tester.test_input(haystack.as_bytes()),
                    "{:?} on {:?}",
                    pattern,
                    haystack,
                );
            }
        }
    }

    #[test]
    fn compile_error() {
        let err = Differential::new().compile("a(").unwrap_err();
        assert!(err.is_compile_error());
    }

    #[test]
    fn captures_are_reference_results() {
        let mut tester = Differential::new().compile("(a)|(b)").unwrap();
        let caps = tester
            .captures(b"cb", Anchor::Unanchored, MatchKind::LeftmostFirst)
            .unwrap();
        assert_eq!(Some(Span { start: 1, end: 2 }), caps.get(0));
        assert_eq!(None, caps.get(1));
        assert_eq!(Some(Span { start: 1, end: 2 }), caps.get(2));
        assert!(tester
            .captures(b"cb", Anchor::Both, MatchKind::LeftmostFirst)
            .is_none());
    }
}
