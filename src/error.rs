/// An error that can occur while building or running an exhaustive test.
///
/// There are three broad categories of errors:
///
/// * A candidate regexp that the engine under test refuses to compile. This is
/// expected during exhaustive enumeration and is reported by
/// [`Error::is_compile_error`]. The driver skips such candidates silently.
/// * A misconfigured harness, e.g., a wrapper template without a `%s`
/// placeholder, or fixture logging combined with random strings.
/// * An I/O error while writing progress or fixture output, or a malformed
/// fixture (or escaped string) while reading one back.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
enum ErrorKind {
    Syntax(regex_syntax::Error),
    Unsupported(&'static str),
    Config(String),
    Escape(String),
    Fixture { line: usize, msg: String },
    Io(std::io::Error),
}

impl Error {
    pub(crate) fn syntax(err: regex_syntax::Error) -> Error {
        Error { kind: ErrorKind::Syntax(err) }
    }

    pub(crate) fn unsupported(msg: &'static str) -> Error {
        Error { kind: ErrorKind::Unsupported(msg) }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Error {
        Error { kind: ErrorKind::Config(msg.into()) }
    }

    pub(crate) fn escape(msg: impl Into<String>) -> Error {
        Error { kind: ErrorKind::Escape(msg.into()) }
    }

    pub(crate) fn fixture(line: usize, msg: impl Into<String>) -> Error {
        Error { kind: ErrorKind::Fixture { line, msg: msg.into() } }
    }

    /// Returns true if and only if this error occurred because a regexp
    /// could not be compiled by the engine under test.
    ///
    /// Callers driving an exhaustive test should treat these as skipped
    /// candidates and not as failures.
    pub fn is_compile_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Syntax(_) | ErrorKind::Unsupported(_))
    }

    /// Returns true if and only if this error corresponds to an invalid
    /// harness configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Config(_))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            ErrorKind::Syntax(ref err) => Some(err),
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::Syntax(_) => write!(f, "error parsing regexp"),
            ErrorKind::Unsupported(msg) => {
                write!(f, "unsupported regexp feature: {msg}")
            }
            ErrorKind::Config(ref msg) => {
                write!(f, "invalid exhaustive test configuration: {msg}")
            }
            ErrorKind::Escape(ref msg) => {
                write!(f, "invalid escaped string: {msg}")
            }
            ErrorKind::Fixture { line, ref msg } => {
                write!(f, "malformed fixture at line {line}: {msg}")
            }
            ErrorKind::Io(_) => write!(f, "I/O error"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error { kind: ErrorKind::Io(err) }
    }
}
