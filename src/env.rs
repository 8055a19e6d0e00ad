use nix::unistd::{AccessFlags, access};
use std::path::PathBuf;

/// Directory searched for executables when the interpreter starts.
pub const DEFAULT_SEARCH_PATH: &str = "/bin";

/// Ordered list of directories consulted to resolve a bare command name.
///
/// The first directory holding an executable entry wins. The list can only be
/// replaced as a whole, mirroring the `path` builtin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<String>,
}

impl SearchPath {
    pub fn new<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Discard the current directories and store `dirs` verbatim.
    ///
    /// Directories are not checked for existence.
    pub fn replace<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs = dirs.into_iter().map(Into::into).collect();
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Find the first `dir/name` that the current user may execute.
    ///
    /// The candidate is only tested with `access(2)`, never opened or run.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| PathBuf::from(format!("{dir}/{name}")))
            .find(|candidate| access(candidate.as_path(), AccessFlags::X_OK).is_ok())
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new([DEFAULT_SEARCH_PATH])
    }
}

/// Interpreter state shared by the builtins and the process runner.
///
/// Only the parent touches it; spawned children see whatever was current at
/// spawn time.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Where external commands are looked up.
    pub search_path: SearchPath,
    /// Set when reading from a terminal rather than a script.
    pub interactive: bool,
}

impl Environment {
    pub fn new(interactive: bool) -> Self {
        Self {
            search_path: SearchPath::default(),
            interactive,
        }
    }
}
