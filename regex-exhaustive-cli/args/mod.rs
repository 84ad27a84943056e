use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
};

pub mod common;
pub mod params;
pub mod run;

/// Something whose settings can be changed by command line flags.
pub trait Configurable: Debug {
    /// Apply the given flag, returning false if it isn't recognized.
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    /// Returns the documentation of every recognized flag.
    fn usage(&self) -> &[Usage];
}

/// Hands every remaining argument to the first target that recognizes it.
///
/// `-h` and `--help` print the given usage, with `%options%` replaced by the
/// short or long documentation of every target's flags.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    while let Some(arg) = p.next()? {
        match arg {
            Arg::Short('h') | Arg::Long("help") => {
                let mut usages = vec![];
                for t in targets.iter() {
                    usages.extend_from_slice(t.usage());
                }
                usages.sort_by_key(|u| {
                    u.format
                        .split_once(", ")
                        .map(|(_, long)| long)
                        .unwrap_or(u.format)
                });
                let options = if arg == Arg::Short('h') {
                    Usage::short(&usages)
                } else {
                    Usage::long(&usages)
                };
                let usage = usage.replace("%options%", &options);
                anyhow::bail!("{}", usage.trim());
            }
            _ => {}
        }
        // Long flag names are cloned so that 'arg' doesn't borrow 'p' while
        // targets read flag values from it.
        let long_flag: Option<String> = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match long_flag {
            Some(ref flag) => Arg::Long(flag),
            None => match arg {
                Arg::Short(c) => Arg::Short(c),
                Arg::Long(_) => unreachable!(),
                Arg::Value(value) => Arg::Value(value),
            },
        };
        let mut recognized = false;
        for t in targets.iter_mut() {
            if t.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}

/// Parses the next argument as a command name. When there is none, or when
/// it is -h/--help, the given usage is returned as an error.
pub fn next_as_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    let usage = usage.trim();
    let arg = match p.next()? {
        Some(arg) => arg,
        None => anyhow::bail!("{usage}"),
    };
    let cmd = match arg {
        Arg::Value(cmd) => cmd.string()?,
        Arg::Short('h') | Arg::Long("help") => anyhow::bail!("{usage}"),
        arg => return Err(arg.unexpected().into()),
    };
    Ok(cmd)
}

/// Parses the value of the current flag into `T`. Errors mention the given
/// flag name.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let value = string(p, flag_name)?;
    match value.parse() {
        Err(err) => Err(anyhow::Error::msg(err).context(flag_name)),
        Ok(parsed) => Ok(parsed),
    }
}

/// Returns the value of the current flag, which must be valid UTF-8.
pub fn string(
    p: &mut Parser,
    flag_name: &'static str,
) -> anyhow::Result<String> {
    let osv = p.value().context(flag_name)?;
    match osv.into_string() {
        Ok(value) => Ok(value),
        Err(osv) => {
            let err = lexopt::Error::NonUnicodeValue(osv);
            Err(anyhow::Error::from(err).context(flag_name))
        }
    }
}

/// The documentation of a flag.
///
/// `Usage::short` and `Usage::long` format a list of these into aligned
/// columns or wrapped paragraphs.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// The format of the flag, for example, `--max-atoms <n>`.
    pub format: &'static str,
    /// A one line description of the flag.
    pub short: &'static str,
    /// A longer description of the flag. Paragraphs are separated by blank
    /// lines.
    pub long: &'static str,
}

impl Usage {
    /// Create a new usage from the given components.
    pub const fn new(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { format, short, long }
    }

    /// Format a two column table of flag formats and short descriptions.
    pub fn short(usages: &[Usage]) -> String {
        const MIN_SPACE: usize = 2;

        let mut result = String::new();
        let max_len = match usages.iter().map(|u| u.format.len()).max() {
            None => return result,
            Some(len) => len,
        };
        for usage in usages.iter() {
            let padlen = MIN_SPACE + (max_len - usage.format.len());
            let padding = " ".repeat(padlen);
            writeln!(result, "    {}{}{}", usage.format, padding, usage.short)
                .unwrap();
        }
        result
    }

    /// Format each flag followed by its long description, wrapped and
    /// indented for an OPTIONS section.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            writeln!(result, "    {}", usage.format).unwrap();
            for (i, paragraph) in usage.long.trim().split("\n\n").enumerate() {
                if i > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace("\n", " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }
}
