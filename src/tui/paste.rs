//! Splitting pasted or dropped text into paths.
//!
//! Terminals deliver a drag-and-drop as a paste. Depending on the source the
//! paths are brace-grouped (`{/a b/c.txt} /d.txt`), quoted, backslash-escaped
//! or one per line.

use std::path::PathBuf;

fn is_escapable(c: char) -> bool {
    c.is_whitespace() || "'\"()[]{}&;!$`".contains(c)
}

pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    let mut flush = |current: &mut String| {
        if !current.is_empty() {
            paths.push(PathBuf::from(std::mem::take(current)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '{' if current.is_empty() => {
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                    current.push(inner);
                }
                flush(&mut current);
            }
            '\'' | '"' => {
                for inner in chars.by_ref() {
                    if inner == c {
                        break;
                    }
                    current.push(inner);
                }
            }
            '\\' if chars.peek().is_some_and(|&next| is_escapable(next)) => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() => flush(&mut current),
            c => current.push(c),
        }
    }
    flush(&mut current);
    paths
}
