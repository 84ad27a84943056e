/*!
The exhaustive driver.

An [`ExhaustiveTester`] pulls every regexp out of a [`RegexpGenerator`],
wraps it in the configured templates, compiles it with an [`Engine`] and then
checks it against every haystack from a [`StringGenerator`]. Regexps the
engine refuses to compile are skipped. For every other regexp, each haystack
that makes the engine's strategies disagree is counted as a failure, and
testing of that regexp stops once it has produced
[`Config::max_bad_inputs`] failures.

Instead of comparing, a tester built with [`ExhaustiveTester::fixture`] writes
the match of every regexp on every haystack to a fixture. See
[`crate::fixture`] for the format.

The functions [`exhaustive_test`], [`egrep_test`] and [`random_test`] run a
whole test matrix, print a summary line and panic if there were any failures.

# Example

```
use regex_exhaustive::{
    exhaustive::{run, Config, Params},
    generate::{egrep_ops, explode},
    tester::Differential,
};

let params = Params::new(2, 1, explode("ab"), egrep_ops(), 2, explode("ab"))
    .top_wrapper("^(?:%s)$");
let config = Config::new().reduced_scale(false);
let summary = run(Differential::new(), params, config)?;
assert_eq!(0, summary.failures);
assert_eq!(18, summary.regexps);

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use std::io::{self, Write};

use crate::{
    error::Error,
    fixture::{record, FixtureLog},
    generate::{
        count_args, egrep_ops, explode, format_template, RegexpGenerator,
        StringGenerator,
    },
    tester::{Differential, Engine, Tester},
};

/// The seed of the random regexps used by [`random_test`] when none is
/// given on the command line.
pub const DEFAULT_REGEXP_SEED: u64 = 404;
/// The number of random regexps used by [`random_test`] by default.
pub const DEFAULT_REGEXP_COUNT: usize = 100;
/// The seed of the random haystacks used by [`random_test`] by default.
pub const DEFAULT_STRING_SEED: u64 = 200;
/// The number of random haystacks used by [`random_test`] by default.
pub const DEFAULT_STRING_COUNT: usize = 100;

/// The top level wrappers used by [`egrep_test`]: no anchor, anchored at
/// the start, anchored at the end and anchored at both ends.
pub const EGREP_TOPS: [&str; 4] = ["", "^(?:%s)", "(?:%s)$", "^(?:%s)$"];

/// The bounds and the vocabulary of a test matrix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Params {
    /// The maximum number of atoms in a regexp.
    pub max_atoms: usize,
    /// The maximum number of operators in a regexp.
    pub max_ops: usize,
    /// The atoms regexps are built from.
    pub alphabet: Vec<String>,
    /// The operators regexps are built with. Each is a template with one or
    /// two `%s` placeholders.
    pub ops: Vec<String>,
    /// The maximum number of symbols in a haystack.
    pub max_strlen: usize,
    /// The symbols haystacks are built from.
    pub str_alphabet: Vec<String>,
    /// A template with a single `%s`, applied to every generated regexp.
    /// Empty means no wrapper.
    pub wrapper: String,
    /// A template with a single `%s`, applied after `wrapper`. Empty means
    /// no wrapper.
    pub top_wrapper: String,
}

impl Params {
    /// Create a new set of parameters without any wrappers.
    pub fn new(
        max_atoms: usize,
        max_ops: usize,
        alphabet: Vec<String>,
        ops: Vec<String>,
        max_strlen: usize,
        str_alphabet: Vec<String>,
    ) -> Params {
        Params {
            max_atoms,
            max_ops,
            alphabet,
            ops,
            max_strlen,
            str_alphabet,
            wrapper: String::new(),
            top_wrapper: String::new(),
        }
    }

    /// Set the template applied to every generated regexp.
    pub fn wrapper(self, wrapper: &str) -> Params {
        Params { wrapper: wrapper.to_string(), ..self }
    }

    /// Set the template applied to every regexp after the wrapper.
    pub fn top_wrapper(self, top_wrapper: &str) -> Params {
        Params { top_wrapper: top_wrapper.to_string(), ..self }
    }

    /// Returns these parameters with every bound greater than one shrunk by
    /// one.
    pub fn reduced(&self) -> Params {
        let shrink = |n: usize| if n > 1 { n - 1 } else { n };
        Params {
            max_atoms: shrink(self.max_atoms),
            max_ops: shrink(self.max_ops),
            max_strlen: shrink(self.max_strlen),
            ..self.clone()
        }
    }

    /// Returns these parameters shrunk the way random tests are: one atom
    /// and one operator fewer, and half the haystack length. No bound drops
    /// below one.
    pub fn reduced_random(&self) -> Params {
        Params {
            max_atoms: self.max_atoms.saturating_sub(1).max(1),
            max_ops: self.max_ops.saturating_sub(1).max(1),
            max_strlen: (self.max_strlen / 2).max(1),
            ..self.clone()
        }
    }

    fn validate(&self) -> Result<(), Error> {
        for (name, template) in
            [("wrapper", &self.wrapper), ("top wrapper", &self.top_wrapper)]
        {
            if !template.is_empty() && count_args(template) != 1 {
                return Err(Error::config(format!(
                    "{} {:?} must have exactly one %s placeholder",
                    name, template,
                )));
            }
        }
        if let Some(op) = self.ops.iter().find(|op| count_args(op) == 0) {
            return Err(Error::config(format!(
                "operator {:?} has no %s placeholder",
                op,
            )));
        }
        Ok(())
    }
}

/// The configuration of an [`ExhaustiveTester`].
#[derive(Clone, Debug)]
pub struct Config {
    show_progress: bool,
    max_bad_inputs: usize,
    random_strings: Option<(u64, usize)>,
    reduced_scale: bool,
}

impl Config {
    /// Return a new default configuration.
    pub fn new() -> Config {
        Config {
            show_progress: false,
            max_bad_inputs: 1,
            random_strings: None,
            reduced_scale: cfg!(debug_assertions),
        }
    }

    /// When enabled, every regexp is printed to stdout right before it is
    /// tested. A tester writing a fixture prints to stderr instead.
    ///
    /// This is disabled by default.
    pub fn show_progress(self, yes: bool) -> Config {
        Config { show_progress: yes, ..self }
    }

    /// Set the number of failing haystacks after which testing of a regexp
    /// stops. This must be at least `1`.
    ///
    /// This is `1` by default.
    pub fn max_bad_inputs(self, limit: usize) -> Config {
        Config { max_bad_inputs: limit, ..self }
    }

    /// Test every regexp against `count` random haystacks drawn from a
    /// generator seeded with `seed`, instead of every possible haystack.
    /// The empty haystack is always tested too.
    ///
    /// This can't be combined with fixture logging.
    pub fn random_strings(self, seed: u64, count: usize) -> Config {
        Config { random_strings: Some((seed, count)), ..self }
    }

    /// When enabled, the run drivers shrink every bound before testing, so
    /// that slower builds finish in a reasonable amount of time.
    ///
    /// This is enabled by default when debug assertions are enabled.
    pub fn reduced_scale(self, yes: bool) -> Config {
        Config { reduced_scale: yes, ..self }
    }

    /// Returns whether progress is shown.
    pub fn get_show_progress(&self) -> bool {
        self.show_progress
    }

    /// Returns the number of failures after which a regexp is abandoned.
    pub fn get_max_bad_inputs(&self) -> usize {
        self.max_bad_inputs
    }

    /// Returns the seed and count of random haystacks, if enabled.
    pub fn get_random_strings(&self) -> Option<(u64, usize)> {
        self.random_strings
    }

    /// Returns whether the run drivers shrink their bounds.
    pub fn get_reduced_scale(&self) -> bool {
        self.reduced_scale
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

/// The counters of an [`ExhaustiveTester`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counters {
    /// The number of regexps visited, including those that didn't compile.
    pub regexps: usize,
    /// The number of haystacks tested.
    pub tests: usize,
    /// The number of haystacks on which the strategies disagreed.
    pub failures: usize,
}

/// What a tester does with each regexp.
#[derive(Debug)]
enum Mode<W> {
    /// Check that every strategy agrees.
    Compare,
    /// Write every match to a fixture.
    Fixture(FixtureLog<W>),
}

/// Tests every regexp in a bounded space against every haystack in a
/// bounded space.
#[derive(Debug)]
pub struct ExhaustiveTester<E, W = io::Sink> {
    engine: E,
    params: Params,
    config: Config,
    regexps: RegexpGenerator,
    strings: StringGenerator,
    mode: Mode<W>,
    counters: Counters,
}

impl<E: Engine> ExhaustiveTester<E, io::Sink> {
    /// Create a tester that checks the strategies of the given engine
    /// against each other.
    ///
    /// This returns an error when a wrapper template doesn't have exactly
    /// one `%s`, when an operator has none, or when
    /// [`Config::max_bad_inputs`] is zero.
    pub fn new(
        engine: E,
        params: Params,
        config: Config,
    ) -> Result<ExhaustiveTester<E, io::Sink>, Error> {
        ExhaustiveTester::with_mode(engine, params, config, Mode::Compare)
    }
}

impl<E: Engine, W: io::Write> ExhaustiveTester<E, W> {
    /// Create a tester that writes the match of every regexp on every
    /// haystack to the given writer, instead of comparing strategies.
    ///
    /// In addition to the errors returned by [`ExhaustiveTester::new`], this
    /// returns an error when random haystacks are configured, since a
    /// fixture must be reproducible.
    pub fn fixture(
        engine: E,
        params: Params,
        config: Config,
        wtr: W,
    ) -> Result<ExhaustiveTester<E, W>, Error> {
        if config.random_strings.is_some() {
            return Err(Error::config(
                "fixture logging cannot be combined with random strings",
            ));
        }
        let mode = Mode::Fixture(FixtureLog::new(wtr));
        ExhaustiveTester::with_mode(engine, params, config, mode)
    }

    fn with_mode(
        engine: E,
        params: Params,
        config: Config,
        mode: Mode<W>,
    ) -> Result<ExhaustiveTester<E, W>, Error> {
        params.validate()?;
        if config.max_bad_inputs == 0 {
            return Err(Error::config("max bad inputs must be at least 1"));
        }
        let regexps = RegexpGenerator::new(
            params.max_atoms,
            params.max_ops,
            params.alphabet.clone(),
            params.ops.clone(),
        );
        let strings = StringGenerator::new(
            params.max_strlen,
            params.str_alphabet.clone(),
        );
        Ok(ExhaustiveTester {
            engine,
            params,
            config,
            regexps,
            strings,
            mode,
            counters: Counters::default(),
        })
    }

    /// Switch the regexp source to `count` random regexps drawn from a
    /// generator seeded with `seed`.
    pub fn random_regexps(&mut self, seed: u64, count: usize) {
        self.regexps.random(seed, count);
    }

    /// Test every regexp from the regexp source.
    pub fn generate(&mut self) -> Result<(), Error> {
        self.regexps.reset();
        while let Some(regexp) = self.regexps.next() {
            self.handle_regexp(&regexp)?;
        }
        if let Mode::Fixture(ref mut log) = self.mode {
            log.flush()?;
        }
        log::debug!(
            "finished: {} regexps, {} tests, {} failures",
            self.counters.regexps,
            self.counters.tests,
            self.counters.failures,
        );
        Ok(())
    }

    /// Test a single generated regexp.
    ///
    /// The regexp is wrapped in the configured templates first. A regexp
    /// the engine refuses to compile is skipped. Only errors that aren't
    /// compile errors, like I/O errors while writing a fixture, are
    /// returned.
    pub fn handle_regexp(&mut self, candidate: &str) -> Result<(), Error> {
        self.counters.regexps += 1;
        let regexp = self.wrap(candidate);
        if self.config.show_progress {
            self.show_progress(&regexp)?;
        }
        match self.mode {
            Mode::Compare => self.compare(&regexp),
            Mode::Fixture(_) => self.log(&regexp),
        }
    }

    /// Returns the number of regexps visited so far.
    pub fn regexps(&self) -> usize {
        self.counters.regexps
    }

    /// Returns the number of haystacks tested so far.
    pub fn tests(&self) -> usize {
        self.counters.tests
    }

    /// Returns the number of failing haystacks found so far.
    pub fn failures(&self) -> usize {
        self.counters.failures
    }

    /// Returns all counters.
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Returns the parameters of this tester.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the summary of everything tested so far.
    pub fn summary(&self) -> Summary {
        Summary {
            regexps: self.counters.regexps,
            tests: self.counters.tests,
            failures: self.counters.failures,
            max_strlen: self.params.max_strlen,
            str_alphabet_len: self.params.str_alphabet.len(),
        }
    }

    /// Returns the fixture writer, if this tester writes a fixture.
    pub fn into_writer(self) -> Option<W> {
        match self.mode {
            Mode::Compare => None,
            Mode::Fixture(log) => Some(log.into_inner()),
        }
    }

    /// Prints the regexp about to be tested over the previous one. A fixture
    /// may be written to stdout, so progress goes to stderr in fixture mode.
    fn show_progress(&self, regexp: &str) -> Result<(), Error> {
        if self.progress_on_stderr() {
            let mut stderr = io::stderr().lock();
            write!(stderr, "\r{}", regexp)?;
            stderr.flush()?;
        } else {
            let mut stdout = io::stdout().lock();
            write!(stdout, "\r{}", regexp)?;
            stdout.flush()?;
        }
        Ok(())
    }

    fn progress_on_stderr(&self) -> bool {
        matches!(self.mode, Mode::Fixture(_))
    }

    /// Returns `top_wrapper(wrapper(candidate))`.
    fn wrap(&self, candidate: &str) -> String {
        let mut regexp = candidate.to_string();
        for template in [&self.params.wrapper, &self.params.top_wrapper] {
            if !template.is_empty() {
                regexp = format_template(template, &[&regexp]);
            }
        }
        regexp
    }

    fn compile(&self, regexp: &str) -> Result<Option<E::Tester>, Error> {
        match self.engine.compile(regexp) {
            Ok(tester) => Ok(Some(tester)),
            Err(err) if err.is_compile_error() => {
                log::debug!("skipping {:?}: {}", regexp, err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn compare(&mut self, regexp: &str) -> Result<(), Error> {
        let Some(mut tester) = self.compile(regexp)? else { return Ok(()) };
        self.strings.reset();
        self.strings.force_empty();
        if let Some((seed, count)) = self.config.random_strings {
            self.strings.random(seed, count);
        }
        let mut bad_inputs = 0;
        for haystack in self.strings.by_ref() {
            self.counters.tests += 1;
            log::trace!("testing {:?} on {:?}", regexp, haystack);
            if tester.test_input(haystack.as_bytes()) {
                continue;
            }
            self.counters.failures += 1;
            bad_inputs += 1;
            if bad_inputs >= self.config.max_bad_inputs {
                log::debug!(
                    "giving up on {:?} after {} bad input(s)",
                    regexp,
                    bad_inputs,
                );
                break;
            }
        }
        Ok(())
    }

    fn log(&mut self, regexp: &str) -> Result<(), Error> {
        let mut tester = self.compile(regexp)?;
        let Mode::Fixture(ref mut log) = self.mode else { return Ok(()) };
        if !log.has_strings() {
            self.strings.reset();
            log.write_strings(self.strings.by_ref())?;
        }
        log.write_regexp(regexp)?;
        self.strings.reset();
        for haystack in self.strings.by_ref() {
            let record = record(tester.as_mut(), haystack.as_bytes());
            log.write_record(&record)?;
        }
        Ok(())
    }
}

/// The outcome of a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Summary {
    /// The number of regexps visited.
    pub regexps: usize,
    /// The number of haystacks tested.
    pub tests: usize,
    /// The number of failing haystacks.
    pub failures: usize,
    /// The maximum haystack length that was used.
    pub max_strlen: usize,
    /// The number of symbols haystacks were built from.
    pub str_alphabet_len: usize,
}

impl Summary {
    /// Panics if there were any failures.
    pub fn assert(&self) {
        if self.failures == 0 {
            return;
        }
        panic!(
            "found {} failures:\n{}\n{}\n{}\n\n\
             Set RUST_LOG=warn to see every disagreement.\n",
            self.failures,
            "~".repeat(79),
            self,
            "~".repeat(79),
        )
    }
}

impl core::fmt::Display for Summary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} regexps, {} tests, {} failures [{}/{} str]",
            self.regexps,
            self.tests,
            self.failures,
            self.max_strlen,
            self.str_alphabet_len,
        )
    }
}

/// Runs every regexp against every haystack and returns the summary,
/// without asserting anything.
///
/// When [`Config::reduced_scale`] is enabled, the bounds are shrunk with
/// [`Params::reduced`] first.
pub fn run<E: Engine>(
    engine: E,
    params: Params,
    config: Config,
) -> Result<Summary, Error> {
    let params = if config.reduced_scale { params.reduced() } else { params };
    let mut tester = ExhaustiveTester::new(engine, params, config)?;
    tester.generate()?;
    Ok(tester.summary())
}

/// Runs every regexp against every haystack with [`Differential`], prints
/// the summary line and panics if there were any failures.
///
/// # Panics
///
/// When there is at least one failure, or when the parameters or the
/// configuration are invalid.
pub fn exhaustive_test(params: Params, config: Config) -> Summary {
    let summary = match run(Differential::new(), params, config) {
        Ok(summary) => summary,
        Err(err) => panic!("exhaustive test could not run: {}", err),
    };
    println!("{}", summary);
    summary.assert();
    summary
}

/// Returns the parameters of the four runs of [`egrep_test`], one for each
/// of [`EGREP_TOPS`].
pub fn egrep_params(
    max_atoms: usize,
    max_ops: usize,
    alphabet: &str,
    max_strlen: usize,
    str_alphabet: &str,
    wrapper: &str,
) -> Vec<Params> {
    EGREP_TOPS
        .iter()
        .map(|top| {
            Params::new(
                max_atoms,
                max_ops,
                explode(alphabet),
                egrep_ops(),
                max_strlen,
                explode(str_alphabet),
            )
            .wrapper(wrapper)
            .top_wrapper(top)
        })
        .collect()
}

/// Runs [`exhaustive_test`] with the egrep operators once for each of the
/// four anchoring wrappers in [`EGREP_TOPS`].
///
/// Both alphabets are split into single character symbols.
///
/// # Panics
///
/// When any of the runs has a failure.
pub fn egrep_test(
    max_atoms: usize,
    max_ops: usize,
    alphabet: &str,
    max_strlen: usize,
    str_alphabet: &str,
    wrapper: &str,
) -> Vec<Summary> {
    egrep_params(
        max_atoms,
        max_ops,
        alphabet,
        max_strlen,
        str_alphabet,
        wrapper,
    )
    .into_iter()
    .map(|params| exhaustive_test(params, Config::default()))
    .collect()
}

/// Runs `regexp_count` random regexps, drawn from a generator seeded with
/// `regexp_seed`, against random haystacks and returns the summary, without
/// asserting anything.
///
/// When `config` doesn't set random strings, [`DEFAULT_STRING_SEED`] and
/// [`DEFAULT_STRING_COUNT`] are used. When [`Config::reduced_scale`] is
/// enabled, the bounds are shrunk with [`Params::reduced_random`].
pub fn run_random<E: Engine>(
    engine: E,
    params: Params,
    config: Config,
    regexp_seed: u64,
    regexp_count: usize,
) -> Result<Summary, Error> {
    let params =
        if config.reduced_scale { params.reduced_random() } else { params };
    let config = match config.random_strings {
        Some(_) => config,
        None => {
            config.random_strings(DEFAULT_STRING_SEED, DEFAULT_STRING_COUNT)
        }
    };
    let mut tester = ExhaustiveTester::new(engine, params, config)?;
    tester.random_regexps(regexp_seed, regexp_count);
    tester.generate()?;
    Ok(tester.summary())
}

/// Like [`run_random`] with [`Differential`], but prints the summary line
/// and panics if there were any failures.
///
/// # Panics
///
/// When there is at least one failure, or when the parameters or the
/// configuration are invalid.
pub fn random_test(
    params: Params,
    config: Config,
    regexp_seed: u64,
    regexp_count: usize,
) -> Summary {
    let result = run_random(
        Differential::new(),
        params,
        config,
        regexp_seed,
        regexp_count,
    );
    let summary = match result {
        Ok(summary) => summary,
        Err(err) => panic!("random test could not run: {}", err),
    };
    println!("{}", summary);
    summary.assert();
    summary
}

/// Writes a fixture for every regexp and every haystack to `wtr` and
/// returns the summary of the run along with the writer.
///
/// When [`Config::reduced_scale`] is enabled, the bounds are shrunk with
/// [`Params::reduced`] first, exactly as in [`run`]. The summary reports
/// the bounds that were used.
pub fn log_fixture<E: Engine, W: io::Write>(
    engine: E,
    params: Params,
    config: Config,
    wtr: W,
) -> Result<(Summary, W), Error> {
    let params = if config.reduced_scale { params.reduced() } else { params };
    let mut tester = ExhaustiveTester::fixture(engine, params, config, wtr)?;
    tester.generate()?;
    let summary = tester.summary();
    match tester.mode {
        Mode::Fixture(log) => Ok((summary, log.into_inner())),
        Mode::Compare => unreachable!("fixture tester without a fixture"),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        engine::{Anchor, Captures, MatchKind},
        generate::split,
    };

    use super::*;

    /// An engine that records every regexp it compiles and fails on every
    /// haystack containing the byte `b`.
    #[derive(Debug, Default)]
    struct Recorder {
        compiled: std::cell::RefCell<Vec<String>>,
    }

    struct RecorderTester;

    impl Engine for Recorder {
        type Tester = RecorderTester;

        fn compile(&self, regexp: &str) -> Result<RecorderTester, Error> {
            self.compiled.borrow_mut().push(regexp.to_string());
            Ok(RecorderTester)
        }
    }

    impl Tester for RecorderTester {
        fn test_input(&mut self, haystack: &[u8]) -> bool {
            !haystack.contains(&b'b')
        }

        fn captures(
            &mut self,
            _: &[u8],
            _: Anchor,
            _: MatchKind,
        ) -> Option<Captures> {
            None
        }
    }

    fn params() -> Params {
        Params::new(1, 1, explode("ab"), egrep_ops(), 2, explode("ab"))
    }

    #[test]
    fn wrappers_are_applied_in_order() {
        let params = params().wrapper("(%s)").top_wrapper("^(?:%s)$");
        let engine = Recorder::default();
        let mut t =
            ExhaustiveTester::new(&engine, params, Config::new()).unwrap();
        t.handle_regexp("a|b").unwrap();
        assert_eq!(vec!["^(?:(a|b))$"], *engine.compiled.borrow());
    }

    #[test]
    fn budget_stops_at_first_failure() {
        let engine = Recorder::default();
        let mut t =
            ExhaustiveTester::new(&engine, params(), Config::new()).unwrap();
        // Haystacks are "", "", "a", "b", ...
        t.handle_regexp("a").unwrap();
        let want = Counters { regexps: 1, tests: 4, failures: 1 };
        assert_eq!(want, t.counters());

        let config = Config::new().max_bad_inputs(3);
        let mut t = ExhaustiveTester::new(&engine, params(), config).unwrap();
        // "", "", "a", "b", "aa", "ab", "ba"
        t.handle_regexp("a").unwrap();
        let want = Counters { regexps: 1, tests: 7, failures: 3 };
        assert_eq!(want, t.counters());
    }

    #[test]
    fn invalid_configurations() {
        let engine = Differential::new();
        let err = ExhaustiveTester::new(
            &engine,
            params(),
            Config::new().max_bad_inputs(0),
        )
        .unwrap_err();
        assert!(err.is_config_error());

        let err = ExhaustiveTester::new(
            &engine,
            params().top_wrapper("^(?:%s)(?:%s)$"),
            Config::new(),
        )
        .unwrap_err();
        assert!(err.is_config_error());

        let err = ExhaustiveTester::new(
            &engine,
            params().wrapper("a"),
            Config::new(),
        )
        .unwrap_err();
        assert!(err.is_config_error());

        let err = ExhaustiveTester::fixture(
            &engine,
            params(),
            Config::new().random_strings(1, 10),
            vec![],
        )
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn reduced_bounds() {
        let p = Params::new(3, 1, vec![], vec![], 0, vec![]).reduced();
        assert_eq!((2, 1, 0), (p.max_atoms, p.max_ops, p.max_strlen));

        let p = Params::new(3, 1, vec![], vec![], 5, vec![]);
        let p = p.reduced_random();
        assert_eq!((2, 1, 2), (p.max_atoms, p.max_ops, p.max_strlen));
    }

    #[test]
    fn summary_line() {
        let summary = Summary {
            regexps: 10,
            tests: 150,
            failures: 0,
            max_strlen: 3,
            str_alphabet_len: 2,
        };
        assert_eq!(
            "10 regexps, 150 tests, 0 failures [3/2 str]",
            summary.to_string(),
        );
        summary.assert();
    }

    #[test]
    #[should_panic]
    fn summary_assert_panics() {
        let summary = Summary {
            regexps: 1,
            tests: 1,
            failures: 1,
            max_strlen: 0,
            str_alphabet_len: 0,
        };
        summary.assert();
    }

    #[test]
    fn fixture_progress_goes_to_stderr() {
        let config = Config::new().show_progress(true);
        let t = ExhaustiveTester::new(Recorder::default(), params(), config)
            .unwrap();
        assert!(!t.progress_on_stderr());
        let config = Config::new().show_progress(true);
        let t = ExhaustiveTester::fixture(
            Recorder::default(),
            params(),
            config,
            vec![],
        )
        .unwrap();
        assert!(t.progress_on_stderr());
    }

    #[test]
    fn random_regexps_are_counted() {
        let params = Params::new(
            3,
            2,
            split("", "ab"),
            egrep_ops(),
            2,
            split("", "ab"),
        );
        let mut gen = RegexpGenerator::new(
            params.max_atoms,
            params.max_ops,
            params.alphabet.clone(),
            params.ops.clone(),
        );
        gen.random(11, 20);
        let expected = gen.count();
        assert!(expected > 0);

        let config = Config::new().random_strings(7, 5);
        let mut t =
            ExhaustiveTester::new(Differential::new(), params, config)
                .unwrap();
        t.random_regexps(11, 20);
        t.generate().unwrap();
        assert_eq!(expected, t.regexps());
        assert_eq!(0, t.failures());
        // The empty haystack plus five random ones.
        assert_eq!(t.regexps() * 6, t.tests());
    }
}
