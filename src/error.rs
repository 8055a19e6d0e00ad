use std::io::{self, Write};
use thiserror::Error;

/// The only diagnostic ever shown to the user, whatever went wrong.
pub const ERROR_MESSAGE: &str = "An error has occurred\n";

/// Malformed command syntax detected before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// Zero or more than one token after `>`.
    #[error("redirect must be followed by exactly one target")]
    BadRedirect,
    /// `exit`, `cd` or `path` combined with a redirect target.
    #[error("builtin `{0}` does not accept a redirect")]
    RedirectNotAllowedForBuiltin(String),
}

/// Every failure the interpreter can hit.
///
/// Variants keep enough detail for logs and tests, but the user only ever sees
/// [`ERROR_MESSAGE`]; see [`report`].
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{name}: wrong number of arguments ({given})")]
    BuiltinArity { name: String, given: usize },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{command}: failed to spawn: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command}: failed to execute: {source}")]
    ChildExec {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{target}: cannot open for writing: {source}")]
    RedirectOpen {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("cd: {target}: {source}")]
    ChangeDirectory {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("line of {0} bytes exceeds the maximum length")]
    LineTooLong(usize),

    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),

    #[error("wait on process {pid} failed: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

/// Write the flattened diagnostic for `err` to `sink`, logging the detail.
pub fn report(sink: &mut dyn Write, err: &ShellError) {
    tracing::debug!(error = %err, "command failed");
    // Nothing sensible left to do if the error stream itself is gone.
    let _ = sink.write_all(ERROR_MESSAGE.as_bytes());
    let _ = sink.flush();
}
