use crate::builtin;
use crate::env::Environment;
use crate::error::{ShellError, SyntaxError};
use crate::external::{self, ProcessHandle};
use crate::parser::ParsedCommand;

/// What a command name refers to, decided by exact match on `argv[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Exit,
    ChangeDirectory,
    SetPath,
    External,
}

impl CommandKind {
    pub fn classify(name: &str) -> Self {
        match name {
            "exit" => CommandKind::Exit,
            "cd" => CommandKind::ChangeDirectory,
            "path" => CommandKind::SetPath,
            _ => CommandKind::External,
        }
    }

    pub fn is_builtin(self) -> bool {
        self != CommandKind::External
    }
}

/// Result of dispatching one command.
#[derive(Debug)]
pub enum Dispatched {
    /// A builtin ran to completion.
    Done,
    /// `exit` succeeded; the interpreter must stop without waiting on anything.
    Exit,
    /// An external command was spawned and is still running.
    Spawned(ProcessHandle),
}

/// Classify `cmd` and run it.
///
/// Builtins run inline. External commands are spawned and returned without
/// waiting; the caller owns the handle.
pub fn dispatch(cmd: &ParsedCommand, env: &mut Environment) -> Result<Dispatched, ShellError> {
    let kind = CommandKind::classify(cmd.name());
    if kind.is_builtin() && cmd.redirect().is_some() {
        return Err(SyntaxError::RedirectNotAllowedForBuiltin(cmd.name().to_string()).into());
    }

    match kind {
        CommandKind::Exit => builtin::exit(cmd.operands()).map(|()| Dispatched::Exit),
        CommandKind::ChangeDirectory => {
            builtin::change_directory(cmd.operands()).map(|()| Dispatched::Done)
        }
        CommandKind::SetPath => {
            builtin::set_path(cmd.operands(), env);
            Ok(Dispatched::Done)
        }
        CommandKind::External => {
            external::launch(cmd.argv(), cmd.redirect(), env).map(Dispatched::Spawned)
        }
    }
}
