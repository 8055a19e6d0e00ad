use crate::command::{Dispatched, dispatch};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::parser::{parse_segment, split_parallel};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, IsTerminal, Write};

/// Shown before every interactive line.
pub const PROMPT: &str = "grsh> ";

/// Longest line accepted; anything longer is rejected whole.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// What the read loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Read the next line.
    Continue,
    /// `exit` ran; stop reading and end the process successfully.
    Exit,
}

/// The command interpreter: one [`Environment`] plus the error stream.
///
/// Each line is one batch. Its `&`-separated commands are started in order,
/// builtins inline, externals spawned without waiting, and the line only
/// completes once every spawned process has terminated.
///
/// Example
/// ```
/// use grsh::{Environment, Interpreter, LineOutcome};
/// let mut sh = Interpreter::new(Environment::new(false));
/// assert_eq!(sh.run_line("path /bin /usr/bin & true"), LineOutcome::Continue);
/// assert_eq!(sh.run_line("exit"), LineOutcome::Exit);
/// ```
pub struct Interpreter {
    env: Environment,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter reporting errors on the process's stderr.
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            stderr: Box::new(io::stderr()),
        }
    }

    /// Send diagnostics to `sink` instead of stderr.
    pub fn with_error_sink(mut self, sink: impl Write + 'static) -> Self {
        self.stderr = Box::new(sink);
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run every command of `line` and wait for the externals it spawned.
    ///
    /// Errors are reported per segment and never stop the rest of the line.
    /// A successful `exit` returns immediately, leaving already spawned
    /// processes unawaited.
    pub fn run_line(&mut self, line: &str) -> LineOutcome {
        if line.len() > MAX_LINE_BYTES {
            self.report(&ShellError::LineTooLong(line.len()));
            return LineOutcome::Continue;
        }

        let mut handles = Vec::new();
        for segment in split_parallel(line) {
            let cmd = match parse_segment(segment) {
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(e) => {
                    self.report(&e.into());
                    continue;
                }
            };
            match dispatch(&cmd, &mut self.env) {
                Ok(Dispatched::Done) => {}
                Ok(Dispatched::Exit) => return LineOutcome::Exit,
                Ok(Dispatched::Spawned(handle)) => handles.push(handle),
                Err(e) => self.report(&e),
            }
        }

        for handle in handles {
            if let Err(e) = handle.wait() {
                self.report(&e);
            }
        }
        LineOutcome::Continue
    }

    /// Run a script line by line until end of input or `exit`.
    pub fn run_script<R: BufRead>(&mut self, input: R) {
        self.read_lines(input, None);
    }

    /// Feed `input` to [`Interpreter::run_line`], printing `prompt` before each line.
    fn read_lines<R: BufRead>(&mut self, mut input: R, prompt: Option<&str>) -> LineOutcome {
        let mut buf = Vec::new();
        loop {
            if let Some(prompt) = prompt {
                print!("{prompt}");
                let _ = io::stdout().flush();
            }
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => return LineOutcome::Continue,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    if self.run_line(&line) == LineOutcome::Exit {
                        return LineOutcome::Exit;
                    }
                }
                Err(e) => {
                    self.report(&ShellError::Input(e));
                    return LineOutcome::Continue;
                }
            }
        }
    }

    /// Interactive read-eval loop on the terminal.
    ///
    /// Ends on `exit` or end of input; the latter prints a newline first.
    /// When stdin is not a terminal the line editor is bypassed, but the
    /// prompt is still printed before every line.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        if !io::stdin().is_terminal() {
            if self.read_lines(io::stdin().lock(), Some(PROMPT)) == LineOutcome::Continue {
                println!();
            }
            return Ok(());
        }

        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if self.run_line(&line) == LineOutcome::Exit {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(error = %err, "line editor failed");
                    return Ok(());
                }
            }
        }
    }

    fn report(&mut self, err: &ShellError) {
        error::report(&mut self.stderr, err);
    }
}
