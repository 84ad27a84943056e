/*!
Exhaustive differential testing of regular expression engines.

This crate enumerates every regexp that can be built from a small set of
atoms and operators within some size bound, and every haystack up to some
length over a small alphabet. It then checks, for every pair, that the
independent matching strategies of an engine agree on where the match is
and which capture groups participated, both anchored and unanchored and
under both leftmost-first and leftmost-longest semantics. Bugs that hand
written or random tests would take a long time to stumble upon tend to show
up quickly this way.

The pieces are:

* [`generate`] contains the lazy, restartable enumerators of regexps and
haystacks.
* [`engine`] is a small byte oriented regex engine with a PikeVM and a
backtracker. It is the engine tested by default.
* [`tester`] defines the [`Engine`] and [`Tester`] traits that connect an
engine to the driver, and [`Differential`], which cross-checks every strategy
of [`engine::Regex`] and the PikeVM from `regex-automata`.
* [`exhaustive`] is the driver itself, along with the run drivers that print a
summary and assert that nothing failed.
* [`fixture`] writes (and reads back) a portable record of every match, for
validating other engine implementations offline. [`escape`] quotes the
strings in it.

# Example

This tests every regexp with at most two atoms and one operator, built from
the egrep operators, against every haystack of at most two bytes over `ab`.

```
use regex_exhaustive::{
    exhaustive::{run, Config, Params},
    generate::{egrep_ops, explode},
    tester::Differential,
};

let params = Params::new(2, 1, explode("ab"), egrep_ops(), 2, explode("ab"));
let summary = run(Differential::new(), params, Config::new())?;
assert_eq!(0, summary.failures);

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Logging

Every disagreement is logged at the `warn` level through the `log` crate,
along with the regexp, the haystack and the strategies involved. Skipped
regexps are logged at the `debug` level.
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

pub use crate::{
    error::Error,
    exhaustive::{Config, ExhaustiveTester, Params, Summary},
    tester::{Differential, Engine, Tester},
};

pub mod engine;
mod error;
pub mod escape;
pub mod exhaustive;
pub mod fixture;
pub mod generate;
mod int;
pub mod tester;
