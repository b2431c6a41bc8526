//! Reader for Apache-style configuration text.
//!
//! Handles `#` comments, `\` line continuation, quoted arguments and
//! `<Section …>` … `</Section>` containers. Every node remembers the file and
//! line it came from.

use std::path::Path;

use tracing::info;

use crate::directive::Directive;
use crate::error::{ConfigError, ConfigResult};

/// Read and parse a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read and
/// [`ConfigError::Syntax`] for malformed text.
pub fn parse_file(path: &Path) -> ConfigResult<Vec<Directive>> {
    let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    let directives = parse_str(&source, &path.display().to_string())?;
    info!(path = %path.display(), directives = directives.len(), "loaded configuration file");
    Ok(directives)
}

/// Parse configuration text; `file` is used for provenance only.
///
/// # Errors
///
/// Returns [`ConfigError::Syntax`] for unclosed or mismatched sections and
/// unterminated quotes.
pub fn parse_str(source: &str, file: &str) -> ConfigResult<Vec<Directive>> {
    let mut root = Vec::new();
    let mut open: Vec<Directive> = Vec::new();

    for (line_no, line) in logical_lines(source) {
        let syntax = |message: String| ConfigError::Syntax {
            file: file.to_owned(),
            line: line_no,
            message,
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("</") {
            let name = format!("<{}", rest.trim_end_matches('>').trim());
            let Some(section) = open.pop() else {
                return Err(syntax(format!("{name}> without matching section start")));
            };
            if !section.is(&name) {
                return Err(syntax(format!(
                    "expected </{}> but saw {name}>",
                    section.name.trim_start_matches('<')
                )));
            }
            open.last_mut().map_or(&mut root, |parent| &mut parent.children).push(section);
            continue;
        }

        let (name, raw_args) = split_name(line);
        let words = if name.starts_with('<') {
            raw_args.strip_suffix('>').unwrap_or(raw_args)
        } else {
            raw_args
        };
        let directive = Directive {
            name: name.to_owned(),
            args: tokenize(words).map_err(syntax)?,
            raw_args: raw_args.to_owned(),
            file: file.to_owned(),
            line: line_no,
            children: Vec::new(),
        };

        if directive.is_section() {
            open.push(directive);
        } else {
            open.last_mut().map_or(&mut root, |parent| &mut parent.children).push(directive);
        }
    }

    if let Some(section) = open.pop() {
        return Err(ConfigError::Syntax {
            file: file.to_owned(),
            line: section.line,
            message: format!("{}> was not closed", section.name),
        });
    }
    Ok(root)
}

/// Join continued lines, yielding each logical line with its first line number.
fn logical_lines(source: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, line) in source.lines().enumerate() {
        let line_no = index.saturating_add(1);
        let (start, mut text) = pending.take().unwrap_or((line_no, String::new()));
        let trimmed = line.trim_end();
        if let Some(head) = trimmed.strip_suffix('\\') {
            text.push_str(head);
            text.push(' ');
            pending = Some((start, text));
        } else {
            text.push_str(trimmed);
            lines.push((start, text));
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

fn split_name(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);
    (name, rest.trim())
}

/// Split arguments into words, honouring single and double quotes.
fn tokenize(text: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut word = String::new();
        if c == '"' || c == '\'' {
            chars.next();
            let mut closed = false;
            while let Some(ch) = chars.next() {
                if ch == c {
                    closed = true;
                    break;
                }
                if ch == '\\' && chars.peek() == Some(&c) {
                    word.push(c);
                    chars.next();
                    continue;
                }
                word.push(ch);
            }
            if !closed {
                return Err(format!("unterminated quote in '{text}'"));
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                word.push(ch);
                chars.next();
            }
        }
        words.push(word);
    }
    Ok(words)
}
