//! A minimal command interpreter.
//!
//! Lines are read from a terminal or a script. Each line holds one or more
//! commands separated by `&`; they are started together and the line completes
//! once all of them have finished. A command is a whitespace-separated word
//! list with an optional `> file` redirect for stdout and stderr. Three
//! builtins run in-process: `exit`, `cd <dir>` and `path <dir>*`, the last one
//! replacing the list of directories searched for every other command.
//!
//! Whatever goes wrong, the user sees the same single line,
//! [`ERROR_MESSAGE`](error::ERROR_MESSAGE), on stderr. The typed cause is
//! available as [`ShellError`] for embedders and in the debug log.
//!
//! The main entry point is [`Interpreter`].

mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod io_adapters;
pub mod parser;

pub use env::{Environment, SearchPath};
pub use error::{ShellError, SyntaxError};
pub use interpreter::{Interpreter, LineOutcome, MAX_LINE_BYTES, PROMPT};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that change the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
