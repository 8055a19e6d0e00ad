use crate::env::Environment;
use crate::error::ShellError;
use nix::errno::Errno;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};

/// A running external command. Only the batch wait step consumes it.
#[derive(Debug)]
pub struct ProcessHandle {
    command: String,
    child: Child,
}

impl ProcessHandle {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Block until the process terminates.
    pub fn wait(mut self) -> Result<ExitStatus, ShellError> {
        let pid = self.id();
        let status = self
            .child
            .wait()
            .map_err(|source| ShellError::Wait { pid, source })?;
        tracing::debug!(pid, command = %self.command, code = exit_code(status), "process finished");
        Ok(status)
    }
}

/// Spawn `argv` as a child process and return without waiting for it.
///
/// `argv[0]` is looked up on the search path, but the program still sees it
/// exactly as typed. With a `redirect` target, both stdout and stderr of the
/// child go to that file, created or truncated first. If the file cannot be
/// opened nothing is spawned.
pub fn launch(
    argv: &[String],
    redirect: Option<&str>,
    env: &Environment,
) -> Result<ProcessHandle, ShellError> {
    let Some((name, args)) = argv.split_first() else {
        return Err(ShellError::CommandNotFound(String::new()));
    };
    let program = env
        .search_path
        .resolve(name)
        .ok_or_else(|| ShellError::CommandNotFound(name.clone()))?;

    if env.interactive {
        tracing::debug!(program = %program.display(), ?args, ?redirect, "executing");
    }

    let mut cmd = Command::new(&program);
    cmd.arg0(name).args(args);
    if let Some(target) = redirect {
        let (stdout, stderr) = open_redirect(target)?;
        cmd.stdout(stdout).stderr(stderr);
    }

    let child = cmd.spawn().map_err(|source| spawn_error(name, source))?;
    Ok(ProcessHandle {
        command: name.clone(),
        child,
    })
}

/// Open `target` write-only, creating it with mode 0666 or truncating it.
///
/// Both returned handles share one open file description, so the two streams
/// interleave instead of overwriting each other.
fn open_redirect(target: &str) -> Result<(Stdio, Stdio), ShellError> {
    let open = || -> io::Result<(Stdio, Stdio)> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o666)
            .open(target)?;
        let err = file.try_clone()?;
        Ok((Stdio::from(file), Stdio::from(err)))
    };
    open().map_err(|source| ShellError::RedirectOpen {
        target: target.to_string(),
        source,
    })
}

/// Tell a failed `fork` apart from a program image that could not be loaded.
fn spawn_error(command: &str, source: io::Error) -> ShellError {
    let command = command.to_string();
    match source.raw_os_error().map(Errno::from_raw) {
        Some(Errno::EAGAIN | Errno::ENOMEM | Errno::ENOSYS) => ShellError::Spawn { command, source },
        _ => ShellError::ChildExec { command, source },
    }
}

fn exit_code(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(code) = exit_status.code() {
        code
    } else if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn env_with_path(dirs: &[&str]) -> Environment {
        let mut env = Environment::new(false);
        env.search_path.replace(dirs.iter().copied());
        env
    }

    #[test]
    fn not_found_spawns_nothing() {
        let env = env_with_path(&["/bin"]);
        let err = launch(&argv(&["no-such-command-grsh"]), None, &env).unwrap_err();
        assert!(matches!(err, ShellError::CommandNotFound(name) if name == "no-such-command-grsh"));
    }

    #[test]
    fn redirect_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let env = Environment::new(false);

        let handle = launch(&argv(&["echo", "hello", "world"]), out.to_str(), &env).unwrap();
        assert!(handle.wait().unwrap().success());
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");
    }

    #[test]
    fn redirect_captures_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("err.txt");
        let env = Environment::new(false);

        let missing = dir.path().join("missing");
        let handle = launch(&argv(&["ls", missing.to_str().unwrap()]), out.to_str(), &env).unwrap();
        assert!(!handle.wait().unwrap().success());
        assert!(!fs::read_to_string(&out).unwrap().is_empty());
    }

    #[test]
    fn redirect_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let env = Environment::new(false);

        launch(&argv(&["echo", "first run, longer"]), out.to_str(), &env)
            .unwrap()
            .wait()
            .unwrap();
        launch(&argv(&["echo", "second"]), out.to_str(), &env)
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "second\n");
    }

    #[test]
    fn unopenable_redirect_spawns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no-such-dir").join("out.txt");
        let env = Environment::new(false);

        let err = launch(&argv(&["echo", "hi"]), out.to_str(), &env).unwrap_err();
        assert!(matches!(err, ShellError::RedirectOpen { .. }));
        assert!(!out.exists());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn argv0_is_kept_as_typed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cmdline");
        let env = Environment::new(false);

        launch(&argv(&["cat", "/proc/self/cmdline"]), out.to_str(), &env)
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(fs::read(&out).unwrap(), b"cat\0/proc/self/cmdline\0");
    }

    #[test]
    fn unloadable_program_is_an_exec_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus");
        // Executable bit set, but no valid image or interpreter line.
        fs::write(&bogus, [0u8, 1, 2, 3]).unwrap();
        fs::set_permissions(&bogus, fs::Permissions::from_mode(0o755)).unwrap();

        let env = env_with_path(&[dir.path().to_str().unwrap()]);
        let err = launch(&argv(&["bogus"]), None, &env).unwrap_err();
        assert!(matches!(err, ShellError::ChildExec { .. }), "{err:?}");
    }

    #[test]
    fn launch_does_not_wait() {
        let env = Environment::new(false);
        let started = std::time::Instant::now();
        let handle = launch(&argv(&["sleep", "1"]), None, &env).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_millis(900));
        assert!(handle.id() > 0);
        assert!(handle.wait().unwrap().success());
    }
}
