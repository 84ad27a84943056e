use std::io::{self, Write};

use lexopt::{Arg, Parser};

use regex_exhaustive::{exhaustive, Differential};

use crate::{
    args::{self, Configurable, Usage},
    util::{self, Table},
};

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &'static str = "\
Writes a fixture to stdout: every haystack, then every regexp followed by its
match on each haystack under four combinations of anchoring and match
semantics. A fixture can be replayed against another regex engine.

USAGE:
    regex-exhaustive fixture [options]

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = args::common::Config::default();
    let mut params = args::params::Config::default();
    let mut run = args::run::Config::default();
    let mut fixture = Config::default();
    args::configure(
        p,
        USAGE,
        &mut [&mut common, &mut params, &mut run, &mut fixture],
    )?;

    let all = if fixture.egrep {
        let (max_atoms, max_ops, alphabet, max_strlen, str_alphabet) =
            params.egrep()?;
        exhaustive::egrep_params(
            max_atoms,
            max_ops,
            alphabet,
            max_strlen,
            str_alphabet,
            params.wrapper(),
        )
    } else {
        vec![params.params()]
    };
    let config = run.exhaustive();
    let mut table = Table::empty();
    args::params::Config::add_to_table(&mut table, &all[0]);
    table.add("blocks", all.len());
    table.add("reduced", config.get_reduced_scale());
    let (regexps, time) = util::timeitr(|| -> anyhow::Result<usize> {
        let mut wtr = io::BufWriter::new(io::stdout().lock());
        let mut regexps = 0;
        for params in all {
            let (summary, w) = exhaustive::log_fixture(
                Differential::new(),
                params,
                config.clone(),
                wtr,
            )?;
            regexps += summary.regexps;
            wtr = w;
        }
        wtr.flush()?;
        Ok(regexps)
    })?;
    table.add("regexps", regexps);
    table.add("write time", time);
    // The fixture owns stdout.
    if config.get_show_progress() {
        // Progress leaves the last regexp on the current line.
        eprintln!();
    }
    if common.table() {
        table.print(io::stderr())?;
    }
    Ok(())
}

/// Flags specific to writing fixtures.
#[derive(Debug, Default)]
struct Config {
    egrep: bool,
}

impl Configurable for Config {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("egrep") => {
                self.egrep = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[Usage::new(
            "--egrep",
            "Write one block for each egrep anchoring wrapper.",
            r#"
Write four blocks, one for each of the anchoring wrappers of the egrep command,
using the egrep operators. --top-wrapper, --ops and --sep are rejected.
"#,
        )];
        USAGES
    }
}
