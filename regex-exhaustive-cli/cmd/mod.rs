use std::io::{self, Write};

use regex_exhaustive::{exhaustive, Summary};

use crate::{args, util::Table};

mod egrep;
mod exhaustive_cmd;
mod fixture;
mod random;
mod verify;

const USAGE: &'static str = "\
Exhaustively tests a regex engine by checking that its matching strategies
agree on every small regexp and every short haystack.

USAGE:
    regex-exhaustive <command> ...

COMMANDS:
    egrep       Run the egrep operators under four anchoring wrappers.
    exhaustive  Run every regexp against every haystack.
    fixture     Write the match of every regexp on every haystack to stdout.
    random      Run random regexps against random haystacks.
    verify      Replay a fixture against the built-in engine.
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = args::next_as_command(USAGE, p)?;
    match &*cmd {
        "egrep" => egrep::run(p),
        "exhaustive" => exhaustive_cmd::run(p),
        "fixture" => fixture::run(p),
        "random" => random::run(p),
        "verify" => verify::run(p),
        unk => anyhow::bail!("unrecognized command '{unk}'"),
    }
}

/// Prints the summary line of every run and the table, and returns an error
/// if any run had a failure.
fn report(
    common: &args::common::Config,
    config: &exhaustive::Config,
    mut table: Table,
    summaries: &[Summary],
) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    if config.get_show_progress() {
        // Progress leaves the last regexp on the current line.
        writeln!(stdout)?;
    }
    if !common.quiet {
        for summary in summaries.iter() {
            writeln!(stdout, "{}", summary)?;
        }
    }
    let regexps: usize = summaries.iter().map(|s| s.regexps).sum();
    let tests: usize = summaries.iter().map(|s| s.tests).sum();
    let failures: usize = summaries.iter().map(|s| s.failures).sum();
    if common.table() {
        table.add("regexps", regexps);
        table.add("tests", tests);
        table.add("failures", failures);
        table.print(&mut stdout)?;
    }
    anyhow::ensure!(
        failures == 0,
        "found {} failures, set RUST_LOG=warn to see them",
        failures,
    );
    Ok(())
}
