//! Splitting an input line into parallel segments and each segment into a command.
//!
//! The grammar is deliberately flat:
//!
//! ```text
//! line    := segment ('&' segment)*
//! segment := word+ ('>' word)?
//! ```
//!
//! Words are separated by whitespace. There is no quoting, escaping or expansion.

use crate::error::SyntaxError;

/// Separates commands that run concurrently on one line.
pub const PARALLEL_SEPARATOR: char = '&';

/// Introduces the output redirection target of a segment.
pub const REDIRECT_MARKER: char = '>';

/// One command of a line, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    argv: Vec<String>,
    redirect: Option<String>,
}

impl ParsedCommand {
    /// Returns `None` when `argv` is empty; such a command is never dispatched.
    pub fn new(argv: Vec<String>, redirect: Option<String>) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(Self { argv, redirect })
        }
    }

    /// Command name followed by its operands. Never empty.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    /// Everything after the command name.
    pub fn operands(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }
}

/// Split `line` into the segments separated by [`PARALLEL_SEPARATOR`].
///
/// Empty pieces between consecutive separators are dropped and leading
/// whitespace is trimmed from every segment. Order is preserved.
pub fn split_parallel(line: &str) -> Vec<&str> {
    let segments: Vec<&str> = line
        .split(PARALLEL_SEPARATOR)
        .filter(|piece| !piece.is_empty())
        .map(str::trim_start)
        .collect();
    tracing::trace!(?segments, "split line");
    segments
}

/// Parse one segment.
///
/// The redirect clause is validated before any argument is looked at, so a
/// malformed `>` rejects the whole segment. `Ok(None)` means the segment holds
/// no command at all and should be skipped silently.
pub fn parse_segment(segment: &str) -> Result<Option<ParsedCommand>, SyntaxError> {
    let (args_region, redirect) = match segment.split_once(REDIRECT_MARKER) {
        Some((before, after)) => {
            let mut targets = after.split_whitespace();
            match (targets.next(), targets.next()) {
                (Some(target), None) => (before, Some(target.to_string())),
                _ => return Err(SyntaxError::BadRedirect),
            }
        }
        None => (segment, None),
    };

    let argv: Vec<String> = args_region.split_whitespace().map(String::from).collect();
    let parsed = ParsedCommand::new(argv, redirect);
    tracing::trace!(?parsed, "parsed segment");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(cmd: &ParsedCommand) -> Vec<&str> {
        cmd.argv().iter().map(String::as_str).collect()
    }

    #[test]
    fn empty_line_has_no_segments() {
        assert!(split_parallel("").is_empty());
    }

    #[test]
    fn whitespace_line_yields_only_empty_commands() {
        for segment in split_parallel("   \t \n") {
            assert_eq!(parse_segment(segment), Ok(None));
        }
    }

    #[test]
    fn split_trims_leading_whitespace_and_keeps_order() {
        let segments = split_parallel("ls -l &  echo hi\t&\tpwd");
        assert_eq!(segments, vec!["ls -l ", "echo hi\t", "pwd"]);
    }

    #[test]
    fn consecutive_separators_do_not_make_empty_segments() {
        assert_eq!(split_parallel("a && b &"), vec!["a ", "b "]);
        assert!(split_parallel("&&&").is_empty());
    }

    #[test]
    fn plain_command() {
        let cmd = parse_segment("ls -la /tmp\n").unwrap().unwrap();
        assert_eq!(argv(&cmd), ["ls", "-la", "/tmp"]);
        assert_eq!(cmd.name(), "ls");
        assert_eq!(cmd.operands(), ["-la", "/tmp"]);
        assert_eq!(cmd.redirect(), None);
    }

    #[test]
    fn redirect_with_and_without_spaces() {
        let spaced = parse_segment("echo hi > out.txt").unwrap().unwrap();
        assert_eq!(argv(&spaced), ["echo", "hi"]);
        assert_eq!(spaced.redirect(), Some("out.txt"));

        let tight = parse_segment("echo hi>out.txt\n").unwrap().unwrap();
        assert_eq!(argv(&tight), ["echo", "hi"]);
        assert_eq!(tight.redirect(), Some("out.txt"));
    }

    #[test]
    fn redirect_without_target_is_rejected() {
        assert_eq!(parse_segment("ls >"), Err(SyntaxError::BadRedirect));
        assert_eq!(parse_segment("ls >   \n"), Err(SyntaxError::BadRedirect));
    }

    #[test]
    fn redirect_with_two_targets_is_rejected() {
        assert_eq!(parse_segment("ls > a b"), Err(SyntaxError::BadRedirect));
        assert_eq!(parse_segment("ls > a > b"), Err(SyntaxError::BadRedirect));
    }

    #[test]
    fn redirect_is_checked_before_arguments() {
        // Even a would-be builtin is rejected as a whole.
        assert_eq!(parse_segment("exit > a b"), Err(SyntaxError::BadRedirect));
    }

    #[test]
    fn redirect_alone_is_an_empty_command() {
        assert_eq!(parse_segment("> out.txt"), Ok(None));
    }

    #[test]
    fn constructor_refuses_empty_argv() {
        assert!(ParsedCommand::new(Vec::new(), Some("x".into())).is_none());
    }
}
