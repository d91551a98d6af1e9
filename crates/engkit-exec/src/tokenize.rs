//! Stage tokenization: shell-word splitting plus filesystem wildcard expansion.

use engkit_error::{CommandError, CommandResult};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

/// Tools whose `*`/`?` arguments are regular expressions or their own patterns,
/// never filesystem globs.
static PATTERN_TOOLS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "grep", "egrep", "fgrep", "zgrep", "sed", "awk", "gawk", "find",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// Outside any quotes and not escaped: shell syntax applies.
    Bare,
    /// Inside quotes or after a backslash: taken literally.
    Quoted,
    /// A quote or backslash that is consumed by the shell.
    Syntax,
}

#[derive(Debug, Clone, Copy)]
struct Lexeme {
    at: usize,
    ch: char,
    kind: Kind,
}

/// Classify every character of `text` the way a POSIX shell reads quoting.
fn lex(text: &str) -> Vec<Lexeme> {
    let mut out = Vec::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (at, ch) in text.char_indices() {
        let kind = if escaped {
            escaped = false;
            Kind::Quoted
        } else {
            match (quote, ch) {
                (Some('\''), '\'') => {
                    quote = None;
                    Kind::Syntax
                }
                (Some('\''), _) => Kind::Quoted,
                (Some('"'), '"') => {
                    quote = None;
                    Kind::Syntax
                }
                (_, '\\') => {
                    escaped = true;
                    Kind::Syntax
                }
                (Some(_), _) => Kind::Quoted,
                (None, '\'' | '"') => {
                    quote = Some(ch);
                    Kind::Syntax
                }
                (None, _) => Kind::Bare,
            }
        };
        out.push(Lexeme { at, ch, kind });
    }
    out
}

/// Split `text` at every unquoted character matching `is_sep`.
fn split_unquoted(text: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for lx in lex(text) {
        if lx.kind == Kind::Bare && is_sep(lx.ch) {
            parts.push(&text[start..lx.at]);
            start = lx.at + lx.ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Pipe stages of `command`, split only at unquoted `|`.
///
/// `lspci | grep -E 'VGA|3D'` has two stages; the quoted `|` stays in the
/// grep pattern.
pub fn split_pipeline(command: &str) -> Vec<&str> {
    split_unquoted(command, |c| c == '|')
        .into_iter()
        .map(str::trim)
        .collect()
}

/// Glob pattern for one raw shell word, or `None` when the word has no
/// unquoted wildcard. Quoted characters are escaped so they match literally.
fn glob_pattern(raw: &str) -> Option<String> {
    let mut pattern = String::with_capacity(raw.len());
    let mut wild = false;
    for lx in lex(raw) {
        match lx.kind {
            Kind::Syntax => {}
            Kind::Bare => {
                wild |= matches!(lx.ch, '*' | '?');
                pattern.push(lx.ch);
            }
            Kind::Quoted => pattern.push_str(&glob::Pattern::escape(lx.ch.encode_utf8(&mut [0; 4]))),
        }
    }
    wild.then_some(pattern)
}

/// Returns true when `program` passes wildcard characters through literally.
pub fn is_pattern_tool(program: &str) -> bool {
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    PATTERN_TOOLS.contains(name)
}

fn parse_error(stage: &str, reason: impl ToString) -> CommandError {
    CommandError::Parse {
        command: stage.to_string(),
        reason: reason.to_string(),
    }
}

/// Split one stage into an argument vector.
///
/// Quoting follows POSIX shell-word rules. When `expand` is set, words with an
/// unquoted `*` or `?` are globbed against the filesystem (relative to `cwd`
/// when given); a pattern matching nothing stays literal. Quoted wildcards are
/// never expanded.
pub fn prepare(stage: &str, expand: bool, cwd: Option<&Path>) -> CommandResult<Vec<String>> {
    let tokens = shell_words::split(stage).map_err(|e| parse_error(stage, e))?;
    if tokens.is_empty() {
        return Err(parse_error(stage, "empty command"));
    }
    if !expand || is_pattern_tool(&tokens[0]) {
        return Ok(tokens);
    }

    let mut argv = Vec::with_capacity(tokens.len());
    for raw in split_unquoted(stage, char::is_whitespace)
        .into_iter()
        .filter(|w| !w.is_empty())
    {
        let word = shell_words::split(raw)
            .map_err(|e| parse_error(stage, e))?
            .concat();
        match glob_pattern(raw) {
            Some(pattern) => argv.extend(expand_wildcard(&pattern, &word, cwd)),
            None => argv.push(word),
        }
    }
    Ok(argv)
}

fn expand_wildcard(pattern: &str, literal: &str, cwd: Option<&Path>) -> Vec<String> {
    let relative_base = cwd.filter(|_| Path::new(literal).is_relative());
    let full = match relative_base {
        Some(base) => format!(
            "{}/{}",
            glob::Pattern::escape(&base.to_string_lossy()),
            pattern
        ),
        None => pattern.to_string(),
    };

    let paths = match glob::glob(&full) {
        Ok(paths) => paths,
        Err(err) => {
            log::debug!("glob pattern {:?} rejected ({}); passing through", literal, err);
            return vec![literal.to_string()];
        }
    };

    let mut matches: Vec<String> = paths
        .filter_map(Result::ok)
        .map(|path| match relative_base {
            Some(base) => path
                .strip_prefix(base)
                .map(|p| p.to_path_buf())
                .unwrap_or(path),
            None => path,
        })
        .map(|path| path.to_string_lossy().into_owned())
        .collect();

    if matches.is_empty() {
        return vec![literal.to_string()];
    }
    matches.sort();
    matches
}
