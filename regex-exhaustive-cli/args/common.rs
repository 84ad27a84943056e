use lexopt::{Arg, Parser};

use crate::args::{Configurable, Usage};

/// Flags that control how much every command prints.
#[derive(Debug, Default)]
pub struct Config {
    pub quiet: bool,
    pub no_table: bool,
}

impl Config {
    pub fn table(&self) -> bool {
        !self.no_table
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('q') | Arg::Long("quiet") => {
                self.quiet = true;
            }
            Arg::Long("no-table") => {
                self.no_table = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[
            Usage::new(
                "-q, --quiet",
                "Suppress summary lines.",
                r#"
Suppress the summary line printed after every run. A run with failures still
makes the command exit with an error.
"#,
            ),
            Usage::new(
                "--no-table",
                "Omit the table of parameters and timings.",
                r#"
Every command prints a table with the parameters it ran with, the number of
regexps and haystacks it visited and how long it took. Passing this flag
suppresses that table.
"#,
            ),
        ];
        USAGES
    }
}
