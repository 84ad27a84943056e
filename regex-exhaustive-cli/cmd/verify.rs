use std::path::PathBuf;

use {
    anyhow::Context,
    lexopt::{Arg, Parser},
};

use regex_exhaustive::{fixture::Fixture, Differential};

use crate::{
    args::{self, Configurable, Usage},
    util::{self, Table},
};

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &'static str = "\
Replays a fixture against the built-in engine and prints every result that
differs from the one recorded.

USAGE:
    regex-exhaustive verify [options] <fixture-path>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = args::common::Config::default();
    let mut verify = Config::default();
    args::configure(p, USAGE, &mut [&mut common, &mut verify])?;

    let path = verify.path.context("a fixture path is required")?;
    let mut table = Table::empty();
    let data = std::fs::read(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let (fixture, time) = util::timeitr(|| Fixture::parse(&data))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    table.add("parse time", time);
    let (mismatches, time) =
        util::timeitr(|| fixture.verify(&Differential::new()))?;
    table.add("verify time", time);
    table.add("blocks", fixture.blocks().len());
    let regexps: usize =
        fixture.blocks().iter().map(|b| b.entries().len()).sum();
    table.add("regexps", regexps);
    table.add("mismatches", mismatches.len());

    if !common.quiet {
        for mismatch in mismatches.iter() {
            println!("{}", mismatch);
        }
    }
    if common.table() {
        table.print(std::io::stdout())?;
    }
    anyhow::ensure!(
        mismatches.is_empty(),
        "{} results differ from {}",
        mismatches.len(),
        path.display(),
    );
    Ok(())
}

/// The fixture to replay.
#[derive(Debug, Default)]
struct Config {
    path: Option<PathBuf>,
}

impl Configurable for Config {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Value(ref mut v) => {
                anyhow::ensure!(
                    self.path.is_none(),
                    "only one fixture is allowed",
                );
                self.path = Some(PathBuf::from(std::mem::take(v)));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[]
    }
}
