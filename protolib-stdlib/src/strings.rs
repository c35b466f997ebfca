//! String operations
//!
//! Case conversion, template substitution, whitespace normalization,
//! delimiter splitting, pattern extraction, key-value parsing and quoting.
//! Every operation returns a new value; the receiver is never modified.

use crate::args::{callback, flag, opt_arg, opt_int, opt_str, receiver_str, req_str};
use crate::registry::{Operation, Registry};
use anyhow::Result;
use once_cell::sync::Lazy;
use protolib_core::{Group, Map, Value};
use regex::{Regex, RegexBuilder};
use std::str::FromStr;

/// Characters that separate fields when no delimiter set is given
pub const DEFAULT_DELIMITERS: &str = "/|,;.\t\n ";

/// A compiled pattern for [`StrExt::extract`].
///
/// Accepts either a bare regular expression or the `/body/flags` literal
/// form, where `g` collects every match and `i`, `m`, `s` toggle the
/// usual regex flags.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    global: bool,
}

impl Pattern {
    pub fn new(source: &str) -> protolib_core::Result<Self> {
        let (body, flags) = split_literal(source).unwrap_or((source, ""));
        let regex = RegexBuilder::new(body)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|e| protolib_core::Error::Parse(e.to_string()))?;
        Ok(Self {
            regex,
            global: flags.contains('g'),
        })
    }

    pub fn is_global(&self) -> bool {
        self.global
    }
}

impl FromStr for Pattern {
    type Err = protolib_core::Error;

    fn from_str(s: &str) -> protolib_core::Result<Self> {
        Pattern::new(s)
    }
}

fn split_literal(source: &str) -> Option<(&str, &str)> {
    let rest = source.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let flags = &rest[end + 1..];
    if flags.chars().all(|c| "gimsuy".contains(c)) {
        Some((&rest[..end], flags))
    } else {
        None
    }
}

/// What [`StrExt::extract`] yields when nothing was captured
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fallback {
    /// An empty list
    #[default]
    Empty,
    /// The receiver itself
    Original,
    /// A caller-supplied value
    Value(Value),
}

impl From<Option<&Value>> for Fallback {
    fn from(arg: Option<&Value>) -> Self {
        match arg {
            None | Some(Value::Nil) | Some(Value::Boolean(false)) => Fallback::Empty,
            Some(Value::Boolean(true)) => Fallback::Original,
            Some(other) => Fallback::Value(other.clone()),
        }
    }
}

/// Extension operations on text
pub trait StrExt {
    /// Uppercase
    fn uc(&self) -> String;

    /// Lowercase
    fn lc(&self) -> String;

    /// Lowercase everything, then capitalize each word longer than one character
    fn tc(&self) -> String;

    /// Replace `%{name}` from a map, or successive `%s` from a list.
    /// Any other argument leaves the text unchanged.
    fn sprintf(&self, params: &Value) -> String;

    /// Strip the leading whitespace of the first non-blank line from every
    /// line, then trim. Lines indented less than that line keep their indent.
    fn unindent(&self) -> String;

    /// `unindent`, then join single newlines into spaces, keeping blank-line breaks
    fn heredoc(&self) -> String;

    /// Trim, strip every line's indent, then join single newlines into spaces
    fn trimln(&self) -> String;

    /// Split on runs of the delimiter character class (`"0-9"` splits on digits)
    fn arr(&self, delimiters: Option<&str>) -> Vec<String>;

    /// Split into at most `limit` fields; the last keeps the unsplit remainder.
    /// A limit of zero means no limit.
    fn split_limit(&self, limit: usize, delimiters: Option<&str>) -> Vec<String>;

    /// Field `n` of the split result, negative counting from the end; empty when out of range
    fn nth(&self, n: i64, delimiters: Option<&str>) -> String;

    /// Captured groups of `pattern`; a single capture is returned bare
    fn extract(&self, pattern: &Pattern, fallback: Fallback) -> Value;

    /// Parse `key<ks>value` records separated by `rs`; numerals become numbers unless `quote_all`
    fn keyval(&self, ks: &str, rs: &str, quote_all: bool) -> Map;

    /// Wrap in quotes, dropping one existing quote character at either end first
    fn q(&self, quotes: &str) -> String;

    /// Transliterate characters of `from` to the character at the same position in `to`.
    /// Positions past the end of `to` are left unchanged.
    fn tr(&self, from: &str, to: &str) -> String;

    /// Parse as JSON; blank text is an empty map
    fn json(&self) -> protolib_core::Result<Value>;
}

impl StrExt for str {
    fn uc(&self) -> String {
        self.to_uppercase()
    }

    fn lc(&self) -> String {
        self.to_lowercase()
    }

    fn tc(&self) -> String {
        let lower = self.to_lowercase();
        let mut out = String::with_capacity(lower.len());
        let mut word = String::new();
        for c in lower.chars() {
            if is_word_char(c) {
                word.push(c);
            } else {
                flush_title_word(&mut out, &mut word);
                out.push(c);
            }
        }
        flush_title_word(&mut out, &mut word);
        out
    }

    fn sprintf(&self, params: &Value) -> String {
        match params {
            Value::Map(map) => map.iter().fold(self.to_string(), |s, (key, value)| {
                s.replace(&format!("%{{{}}}", key), &value.to_display_string())
            }),
            Value::List(items) => {
                let mut out = self.to_string();
                let mut cursor = 0;
                for item in items.iter().filter(|v| !v.is_container()) {
                    let Some(pos) = out[cursor..].find("%s") else {
                        break;
                    };
                    let at = cursor + pos;
                    let text = item.to_display_string();
                    out.replace_range(at..at + 2, &text);
                    cursor = at + text.len();
                }
                out
            }
            _ => self.to_string(),
        }
    }

    fn unindent(&self) -> String {
        let level: String = self
            .split('\n')
            .find(|line| !line.trim().is_empty())
            .map(|line| line.chars().take_while(|c| *c == ' ' || *c == '\t').collect())
            .unwrap_or_default();

        self.trim()
            .split('\n')
            .map(|line| line.strip_prefix(level.as_str()).unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn heredoc(&self) -> String {
        join_lines(&self.unindent())
    }

    fn trimln(&self) -> String {
        let stripped = self
            .trim()
            .split('\n')
            .map(|line| line.trim_start_matches([' ', '\t']))
            .collect::<Vec<_>>()
            .join("\n");
        join_lines(&stripped)
    }

    fn arr(&self, delimiters: Option<&str>) -> Vec<String> {
        split_runs(self, delimiters, None)
    }

    fn split_limit(&self, limit: usize, delimiters: Option<&str>) -> Vec<String> {
        let limit = if limit == 0 { None } else { Some(limit) };
        split_runs(self, delimiters, limit)
    }

    fn nth(&self, n: i64, delimiters: Option<&str>) -> String {
        let fields = self.arr(delimiters);
        let index = if n < 0 { fields.len() as i64 + n } else { n };
        usize::try_from(index)
            .ok()
            .and_then(|i| fields.get(i).cloned())
            .unwrap_or_default()
    }

    fn extract(&self, pattern: &Pattern, fallback: Fallback) -> Value {
        let mut captured = Vec::new();
        let mut collect = |caps: regex::Captures<'_>| {
            captured.extend(
                caps.iter()
                    .skip(1)
                    .map(|group| group.map(|m| Value::from(m.as_str())).unwrap_or(Value::Nil)),
            );
        };

        if pattern.global {
            pattern.regex.captures_iter(self).for_each(&mut collect);
        } else if let Some(caps) = pattern.regex.captures(self) {
            collect(caps);
        }

        match captured.len() {
            0 => match fallback {
                Fallback::Empty => Value::List(vec![]),
                Fallback::Original => Value::from(self),
                Fallback::Value(v) => v,
            },
            1 => captured.remove(0),
            _ => Value::List(captured),
        }
    }

    fn keyval(&self, ks: &str, rs: &str, quote_all: bool) -> Map {
        let mut out = Map::default();
        for record in self.split(rs).filter(|r| !r.is_empty()) {
            let (key, value) = match record.split_once(ks) {
                Some((k, v)) if quote_all => (k, Value::from(v)),
                Some((k, v)) => (k, coerce_numeral(v)),
                None => (record, Value::Nil),
            };
            out.insert(key.to_string(), value);
        }
        out
    }

    fn q(&self, quotes: &str) -> String {
        let quotes = if quotes.is_empty() { "\"" } else { quotes };
        let mut chars = quotes.chars();
        let open = chars.next().unwrap_or('"');
        let close = chars.next().unwrap_or(open);

        let is_quote = |c: char| quotes.contains(c);
        let inner = self.strip_prefix(is_quote).unwrap_or(self);
        let inner = inner.strip_suffix(is_quote).unwrap_or(inner);

        let mut out = String::with_capacity(inner.len() + 2);
        out.push(open);
        out.push_str(inner);
        out.push(close);
        out
    }

    fn tr(&self, from: &str, to: &str) -> String {
        let to: Vec<char> = to.chars().collect();
        self.chars()
            .map(|c| {
                from.chars()
                    .position(|f| f == c)
                    .and_then(|i| to.get(i).copied())
                    .unwrap_or(c)
            })
            .collect()
    }

    fn json(&self) -> protolib_core::Result<Value> {
        let text = self.trim();
        if text.is_empty() {
            return Ok(Value::map());
        }
        Value::from_json_str(text)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn flush_title_word(out: &mut String, word: &mut String) {
    let mut chars = word.chars();
    if word.chars().count() > 1 {
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    } else {
        out.push_str(word);
    }
    word.clear();
}

/// A newline directly after a non-newline character becomes a space.
fn join_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        match (c, prev) {
            ('\n', Some(p)) if p != '\n' => out.push(' '),
            _ => out.push(c),
        }
        prev = Some(c);
    }
    out
}

/// Runs of any character in the class split the text. A class that does not
/// compile as written is retried with every character taken literally.
fn delimiter_regex(delimiters: &str) -> Option<Regex> {
    if delimiters.is_empty() {
        return None;
    }
    Regex::new(&format!("[{}]+", delimiters))
        .or_else(|_| {
            let literal: String = delimiters
                .chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect();
            Regex::new(&format!("[{}]+", literal))
        })
        .ok()
}

static DEFAULT_SPLITTER: Lazy<Option<Regex>> = Lazy::new(|| delimiter_regex(DEFAULT_DELIMITERS));

fn split_runs(text: &str, delimiters: Option<&str>, limit: Option<usize>) -> Vec<String> {
    let custom;
    let splitter = match delimiters {
        None => DEFAULT_SPLITTER.as_ref(),
        Some(class) => {
            custom = delimiter_regex(class);
            custom.as_ref()
        }
    };
    let Some(splitter) = splitter else {
        return vec![text.to_string()];
    };
    match limit {
        Some(n) => splitter.splitn(text, n).map(str::to_string).collect(),
        None => splitter.split(text).map(str::to_string).collect(),
    }
}

/// `^\d+(\.\d+)?$` becomes a number
fn coerce_numeral(text: &str) -> Value {
    let (int, frac) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(int) || !frac.map_or(true, digits) {
        return Value::from(text);
    }
    match (frac, text.parse::<i64>()) {
        (None, Ok(n)) => Value::Integer(n),
        _ => text
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::from(text)),
    }
}

/// Register all string operations
pub fn register(registry: &mut Registry) {
    registry.register_all(vec![
        // Case
        Operation::pure(Group::String, "uc", string_uc, 0, Some(0), "Uppercase"),
        Operation::pure(Group::String, "lc", string_lc, 0, Some(0), "Lowercase"),
        Operation::pure(Group::String, "tc", string_tc, 0, Some(0), "Title case"),

        // Templates and whitespace
        Operation::pure(Group::String, "sprintf", string_sprintf, 0, Some(1), "Substitute %{name} or %s placeholders"),
        Operation::pure(Group::String, "unindent", string_unindent, 0, Some(0), "Remove the first line's indentation from every line"),
        Operation::pure(Group::String, "heredoc", string_heredoc, 0, Some(0), "Unindent and join wrapped lines"),
        Operation::pure(Group::String, "trimln", string_trimln, 0, Some(0), "Strip indentation and join wrapped lines"),

        // Delimited fields
        Operation::pure(Group::String, "arr", string_arr, 0, Some(2), "Split on delimiter characters"),
        Operation::pure(Group::String, "split", string_arr, 0, Some(2), "Split on delimiter characters"),
        Operation::pure(Group::String, "splitn", string_splitn, 1, Some(2), "Split into at most N fields"),
        Operation::pure(Group::String, "nth", string_nth, 1, Some(2), "Get the Nth delimited field"),

        // Parsing
        Operation::pure(Group::String, "extract", string_extract, 1, Some(2), "Extract regex captures"),
        Operation::pure(Group::String, "keyval", string_keyval, 0, Some(3), "Parse key=value records"),
        Operation::pure(Group::String, "json", string_json, 0, Some(0), "Parse as JSON"),

        // Transformations
        Operation::pure(Group::String, "q", string_q, 0, Some(1), "Wrap in quotes"),
        Operation::pure(Group::String, "tr", string_tr, 2, Some(2), "Transliterate characters"),
    ]);
}

fn string_uc(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_str("string:uc", receiver)?.uc()))
}

fn string_lc(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_str("string:lc", receiver)?.lc()))
}

fn string_tc(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_str("string:tc", receiver)?.tc()))
}

fn string_sprintf(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:sprintf", receiver)?;
    Ok(Value::from(s.sprintf(args.first().unwrap_or(&Value::Nil))))
}

fn string_unindent(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_str("string:unindent", receiver)?.unindent()))
}

fn string_heredoc(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_str("string:heredoc", receiver)?.heredoc()))
}

fn string_trimln(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_str("string:trimln", receiver)?.trimln()))
}

fn string_arr(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:arr", receiver)?;
    let fields = s.arr(opt_str("string:arr", args, 0)?);
    match callback("string:arr", args, 1)? {
        Some(f) => {
            for field in fields {
                f.call(&[Value::from(field)])?;
            }
            Ok(Value::Nil)
        }
        None => Ok(Value::List(fields.into_iter().map(Value::from).collect())),
    }
}

fn string_splitn(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:splitn", receiver)?;
    let limit = opt_int("string:splitn", args, 0)?.unwrap_or(0).max(0) as usize;
    let fields = s.split_limit(limit, opt_str("string:splitn", args, 1)?);
    Ok(Value::List(fields.into_iter().map(Value::from).collect()))
}

fn string_nth(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:nth", receiver)?;
    let n = opt_int("string:nth", args, 0)?.unwrap_or(0);
    Ok(Value::from(s.nth(n, opt_str("string:nth", args, 1)?)))
}

fn string_extract(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:extract", receiver)?;
    let fallback = Fallback::from(opt_arg(args, 1));
    // A pattern that does not compile captures nothing.
    match Pattern::new(req_str("string:extract", args, 0)?) {
        Ok(pattern) => Ok(s.extract(&pattern, fallback)),
        Err(_) => Ok(match fallback {
            Fallback::Empty => Value::List(vec![]),
            Fallback::Original => Value::from(s),
            Fallback::Value(v) => v,
        }),
    }
}

fn string_keyval(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:keyval", receiver)?;
    let ks = opt_str("string:keyval", args, 0)?.unwrap_or("=");
    let rs = opt_str("string:keyval", args, 1)?.unwrap_or("\n");
    Ok(Value::Map(s.keyval(ks, rs, flag(args, 2))))
}

fn string_json(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(receiver_str("string:json", receiver)?.json()?)
}

fn string_q(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:q", receiver)?;
    let quotes = opt_str("string:q", args, 0)?.unwrap_or("'");
    Ok(Value::from(s.q(quotes)))
}

fn string_tr(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:tr", receiver)?;
    let from = req_str("string:tr", args, 0)?;
    let to = opt_str("string:tr", args, 1)?.unwrap_or("");
    Ok(Value::from(s.tr(from, to)))
}
