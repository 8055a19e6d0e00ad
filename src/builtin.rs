use crate::env::Environment;
use crate::error::ShellError;
use std::env as stdenv;

fn arity_error(name: &str, operands: &[String]) -> ShellError {
    ShellError::BuiltinArity {
        name: name.to_string(),
        given: operands.len(),
    }
}

/// `exit`: accepts no operands.
///
/// Only validates; the caller is responsible for stopping the interpreter.
pub fn exit(operands: &[String]) -> Result<(), ShellError> {
    if operands.is_empty() {
        Ok(())
    } else {
        Err(arity_error("exit", operands))
    }
}

/// `cd <dir>`: change the working directory of the interpreter process.
pub fn change_directory(operands: &[String]) -> Result<(), ShellError> {
    let [target] = operands else {
        return Err(arity_error("cd", operands));
    };
    stdenv::set_current_dir(target).map_err(|source| ShellError::ChangeDirectory {
        target: target.clone(),
        source,
    })?;
    tracing::debug!(dir = %target, "changed directory");
    Ok(())
}

/// `path <dir>*`: replace the search path. No operands empties it.
pub fn set_path(operands: &[String], env: &mut Environment) {
    env.search_path.replace(operands.iter().cloned());
    tracing::debug!(dirs = ?env.search_path.dirs(), "search path replaced");
}
