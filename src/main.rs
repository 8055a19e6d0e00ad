use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use grsh::error::{self, ShellError};
use grsh::{Environment, Interpreter};
use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter, e.g. `GRSH_LOG=debug`.
const LOG_ENV: &str = "GRSH_LOG";

#[derive(FromArgs)]
/// Minimal command interpreter. Runs the commands in SCRIPT, or reads them
/// interactively when no script is given.
struct Args {
    #[argh(positional)]
    /// file of commands to run instead of prompting
    script: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn parse_args() -> Result<Args, ExitCode> {
    let raw: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let (cmd, rest) = raw.split_first().map_or(("grsh", &[][..]), |(cmd, rest)| {
        (cmd.as_str(), rest)
    });
    // The script name is taken verbatim: after `--` argh treats `help`,
    // `--help` and `-x` as plain positionals.
    let rest: Vec<&str> = std::iter::once("--")
        .chain(rest.iter().map(String::as_str))
        .collect();

    Args::from_args(&[cmd], &rest).map_err(|EarlyExit { output, .. }| {
        error::report(&mut io::stderr(), &ShellError::Usage(output));
        ExitCode::FAILURE
    })
}

fn run(args: Args) -> Result<()> {
    match args.script {
        Some(path) => {
            let file = File::open(&path)
                .map_err(|e| ShellError::Usage(format!("cannot open {path}: {e}")))?;
            tracing::debug!(script = %path, "running script");
            Interpreter::new(Environment::new(false)).run_script(BufReader::new(file));
        }
        None => {
            Interpreter::new(Environment::new(true))
                .repl()
                .context("interactive session failed")?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "startup failed");
            eprint!("{}", error::ERROR_MESSAGE);
            ExitCode::FAILURE
        }
    }
}
