use lexopt::{Arg, Parser};

use regex_exhaustive::exhaustive::{
    self, DEFAULT_REGEXP_COUNT, DEFAULT_REGEXP_SEED,
};

use crate::args::{self, Configurable, Usage};

/// Flags that control how a run proceeds.
#[derive(Debug)]
pub struct Config {
    show_regexps: bool,
    max_bad_inputs: usize,
    string_seed: Option<u64>,
    string_count: Option<usize>,
    pub regexp_seed: u64,
    pub regexp_count: usize,
    reduced: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            show_regexps: false,
            max_bad_inputs: 1,
            string_seed: None,
            string_count: None,
            regexp_seed: DEFAULT_REGEXP_SEED,
            regexp_count: DEFAULT_REGEXP_COUNT,
            reduced: false,
        }
    }
}

impl Config {
    /// Returns the driver configuration. Random haystacks are enabled when
    /// either --string-seed or --string-count is given.
    pub fn exhaustive(&self) -> exhaustive::Config {
        let mut config = exhaustive::Config::new()
            .show_progress(self.show_regexps)
            .max_bad_inputs(self.max_bad_inputs)
            .reduced_scale(self.reduced);
        if self.string_seed.is_some() || self.string_count.is_some() {
            config = config.random_strings(
                self.string_seed.unwrap_or(exhaustive::DEFAULT_STRING_SEED),
                self.string_count.unwrap_or(exhaustive::DEFAULT_STRING_COUNT),
            );
        }
        config
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("show-regexps") => {
                self.show_regexps = true;
            }
            Arg::Long("max-bad-regexp-inputs") => {
                self.max_bad_inputs =
                    args::parse(p, "--max-bad-regexp-inputs")?;
            }
            Arg::Long("string-seed") => {
                self.string_seed = Some(args::parse(p, "--string-seed")?);
            }
            Arg::Long("string-count") => {
                self.string_count = Some(args::parse(p, "--string-count")?);
            }
            Arg::Long("regexp-seed") => {
                self.regexp_seed = args::parse(p, "--regexp-seed")?;
            }
            Arg::Long("regexp-count") => {
                self.regexp_count = args::parse(p, "--regexp-count")?;
            }
            Arg::Long("reduced") => {
                self.reduced = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[
            Usage::new(
                "--show-regexps",
                "Print every regexp as it is tested.",
                r#"
Print every regexp to stdout right before it is tested, overwriting the
previous one on the same line. The fixture command prints to stderr instead,
since the fixture itself is written to stdout.
"#,
            ),
            Usage::new(
                "--max-bad-regexp-inputs <n>",
                "Stop testing a regexp after this many failures.",
                r#"
Stop testing a regexp after finding this many haystacks on which its matching
strategies disagree. The default is 1.
"#,
            ),
            Usage::new(
                "--string-seed <seed>",
                "Test random haystacks drawn with this seed.",
                r#"
Test every regexp against random haystacks, drawn from a generator seeded with
this value, instead of every possible haystack. The empty haystack is always
tested too. The default seed is 200. This can't be used when writing a fixture.
"#,
            ),
            Usage::new(
                "--string-count <n>",
                "Test this many random haystacks.",
                r#"
The number of random haystacks tested for every regexp. Giving this flag
enables random haystacks. The default is 100.
"#,
            ),
            Usage::new(
                "--regexp-seed <seed>",
                "The seed of random regexps.",
                r#"
The seed of the generator of random regexps used by the random command. The
default is 404.
"#,
            ),
            Usage::new(
                "--regexp-count <n>",
                "The number of random regexps.",
                r#"
The number of random regexps tested by the random command. The default is 100.
"#,
            ),
            Usage::new(
                "--reduced",
                "Shrink every bound before running.",
                r#"
Shrink every bound before running: exhaustive runs use one atom, one operator
and one haystack symbol fewer, when the bound is greater than one, and random
runs halve the haystack length too.
"#,
            ),
        ];
        USAGES
    }
}
