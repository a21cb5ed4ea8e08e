//! Java `.properties` source.
//!
//! Supports the full line syntax of the format:
//!
//! - `#` and `!` comment lines, blank lines
//! - `key=value`, `key:value` and `key value` separators
//! - backslash line continuation (leading whitespace of the next line is dropped)
//! - `\t`, `\n`, `\r`, `\f`, `\uXXXX` escapes; any other escaped char is literal
//!
//! All values are strings. By default dotted keys are expanded into nested
//! mappings, so `server.port=8080` is reachable as `get("server.port")`.
//! A key that cannot be expanded stays at the root under its full name.

use std::io::Read;

use tracing::debug;

use crate::error::{CupError, Result};
use crate::source::{read_text, Source};
use crate::types::{Mapping, Value};

const FORMAT: &str = "properties";

#[derive(Debug, Clone, Copy)]
pub struct PropertiesSource {
    nested: bool,
}

impl PropertiesSource {
    pub fn new() -> Self {
        Self { nested: true }
    }

    /// Keep every key as written, without dot expansion.
    pub fn flat() -> Self {
        Self { nested: false }
    }
}

impl Default for PropertiesSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for PropertiesSource {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn load(&self, input: &mut dyn Read) -> Result<Mapping> {
        let text = read_text(input)?;
        let mut root = Mapping::new();
        for (line_no, line) in logical_lines(&text) {
            let (key, value) = split_entry(&line, line_no)?;
            if self.nested {
                insert_nested(&mut root, &key, value);
            } else {
                root.insert(key, value);
            }
        }
        Ok(root)
    }
}

/// Join continuation lines and drop comments and blanks. Returns each
/// logical line with the 1-based number of the line it starts on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_start_matches([' ', '\t', '\u{c}']);
        let (start, mut buf) = match pending.take() {
            Some(p) => p,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            buf.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some((start, buf));
        } else {
            buf.push_str(trimmed);
            out.push((start, buf));
        }
    }

    // A continuation on the last line just ends the entry.
    if let Some(p) = pending {
        out.push(p);
    }
    out
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line into its unescaped key and value.
fn split_entry(line: &str, line_no: usize) -> Result<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '=' | ':' | ' ' | '\t' | '\u{c}' => break,
            _ => i += 1,
        }
    }
    let key_end = i.min(chars.len());
    let key: String = chars[..key_end].iter().collect();

    let mut j = key_end;
    while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\u{c}') {
        j += 1;
    }
    if j < chars.len() && matches!(chars[j], '=' | ':') {
        j += 1;
        while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\u{c}') {
            j += 1;
        }
    }
    let value: String = chars[j..].iter().collect();

    Ok((unescape(&key, line_no)?, unescape(&value, line_no)?))
}

fn unescape(raw: &str, line_no: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let unit = code_unit(&mut chars, line_no)?;
                let code = if (0xD800..0xDC00).contains(&unit) {
                    // A high surrogate must be followed by `\uDC00`..`\uDFFF`.
                    let low = match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => code_unit(&mut chars, line_no)?,
                        _ => return Err(unpaired(unit, line_no)),
                    };
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(unpaired(unit, line_no));
                    }
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    unit
                };
                out.push(char::from_u32(code).ok_or_else(|| unpaired(code, line_no))?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Read the four hex digits of a `\u` escape as one UTF-16 code unit.
fn code_unit(chars: &mut std::str::Chars<'_>, line_no: usize) -> Result<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|_| hex.len() == 4)
        .ok_or_else(|| CupError::Source {
            format: FORMAT,
            message: format!("line {}: malformed \\u escape `\\u{}`", line_no, hex),
        })
}

fn unpaired(unit: u32, line_no: usize) -> CupError {
    CupError::Source {
        format: FORMAT,
        message: format!("line {}: unpaired surrogate `\\u{:04X}`", line_no, unit),
    }
}

/// Insert `key` into `root`, creating intermediate mappings for each dot.
///
/// Keys with empty segments stay at the root as written. When one key is a
/// prefix of another (`log.level` and `log.level.root`) the shorter one is
/// nested and the longer ones stay at the root unexpanded, whatever their
/// order in the file. Path lookup reaches them through its whole-key match.
fn insert_nested(root: &mut Mapping, key: &str, value: String) {
    let segments: Vec<&str> = key.split('.').collect();
    if let Some((leaf, parents)) = segments.split_last() {
        if nestable(root, &segments) {
            if let Some(parent) = descend(root, parents) {
                if let Some(Value::Mapping(longer)) = parent.insert(*leaf, value) {
                    let mut displaced = Vec::new();
                    flatten(key, longer, &mut displaced);
                    for (name, value) in displaced {
                        debug!(key = %name, "keeping properties key unexpanded");
                        root.insert(name, value);
                    }
                }
                return;
            }
        }
    }
    debug!(key, "keeping properties key unexpanded");
    root.insert(key, value);
}

/// Whether no segment is empty and every parent is absent or a mapping.
fn nestable(root: &Mapping, segments: &[&str]) -> bool {
    if segments.iter().any(|s| s.is_empty()) {
        return false;
    }
    let parents = &segments[..segments.len() - 1];
    let mut current = root;
    for segment in parents {
        match current.get(segment) {
            None => return true,
            Some(Value::Mapping(m)) => current = m,
            Some(_) => return false,
        }
    }
    true
}

fn flatten(prefix: &str, mapping: Mapping, out: &mut Vec<(String, Value)>) {
    for (key, value) in mapping {
        let name = format!("{}.{}", prefix, key);
        match value {
            Value::Mapping(inner) => flatten(&name, inner, out),
            other => out.push((name, other)),
        }
    }
}

fn descend<'m>(mut current: &'m mut Mapping, parents: &[&str]) -> Option<&'m mut Mapping> {
    for segment in parents {
        if !current.contains_key(segment) {
            current.insert(*segment, Mapping::new());
        }
        current = match current.get_mut(segment) {
            Some(Value::Mapping(m)) => m,
            _ => return None,
        };
    }
    Some(current)
}
