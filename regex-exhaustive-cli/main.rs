use std::io::Write;

mod args;
mod cmd;
mod logger;
mod util;

fn main() -> anyhow::Result<()> {
    logger::Logger::init()?;
    log::set_max_level(log_level()?);

    if let Err(err) = cmd::run(&mut lexopt::Parser::from_env()) {
        let mut stderr = std::io::stderr().lock();
        if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1") {
            writeln!(stderr, "{:?}", err)?;
        } else {
            writeln!(stderr, "{:#}", err)?;
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Reads the log level from `RUST_LOG`. Logging is off when it isn't set.
fn log_level() -> anyhow::Result<log::LevelFilter> {
    let rustlog = std::env::var("RUST_LOG").unwrap_or_default();
    Ok(match &*rustlog {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    })
}
