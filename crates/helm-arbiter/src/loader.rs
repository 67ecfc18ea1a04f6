//! Behavior file loader.
//!
//! # Format
//!
//! ```text
//! // comments run from `//` to end of line; a line starting with `#` is
//! // a comment too
//! initialize DEPLOY = false, RETURN = false
//!
//! set MODE = ACTIVE {
//!   DEPLOY = true
//! } else INACTIVE
//!
//! set MODE = RETURNING { MODE = ACTIVE
//!                        RETURN = true }
//!
//! behavior = BHV_ConstantHeading
//! {
//!   name      = go_east
//!   condition = MODE == ACTIVE:SURVEYING
//!   heading   = 90
//! }
//! ```
//!
//! - `behavior = <Type>` opens a block of `key = value` lines.  The key
//!   `templating` (`disallowed`, `clone`, `spawn`) is captured by the
//!   template; every other key is a behavior parameter.
//! - `set <VAR> = <VALUE> { conditions }` declares one mode rule.  Each line
//!   inside the braces is one condition; all must hold.  A word after the
//!   closing brace, optionally preceded by `else`, is the default.
//! - `initialize VAR = VALUE[, VAR = VALUE]` posts values at the start of
//!   the first cycle.
//!
//! Braces may share a line with text on either side.  Nothing here is
//! fatal: every malformed line becomes a [`LoadWarning`] and the loader
//! carries on.

use std::fmt;
use std::io::Read;
use std::path::Path;

use helm_behavior::BehaviorTemplate;
use helm_core::Value;
use helm_mode::ModeEntry;
use tracing::warn;

use crate::{ArbiterError, ArbiterResult};

// ── Output ────────────────────────────────────────────────────────────────────

/// A line the loader could not use.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadWarning {
    pub line:    usize,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl From<LoadWarning> for ArbiterError {
    fn from(w: LoadWarning) -> Self {
        ArbiterError::Loader { line: w.line, reason: w.message }
    }
}

/// Everything a behavior file declares, in file order.
#[derive(Clone, Debug, Default)]
pub struct LoadedConfig {
    pub templates: Vec<BehaviorTemplate>,
    pub modes:     Vec<ModeEntry>,
    pub initial:   Vec<(String, Value)>,
    pub warnings:  Vec<LoadWarning>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a behavior file from disk.  Only I/O failures are errors.
pub fn load_file(path: &Path) -> ArbiterResult<LoadedConfig> {
    let file = std::fs::File::open(path)?;
    load_reader(file)
}

/// Like [`load_file`] but accepts any `Read` source.
pub fn load_reader<R: Read>(mut reader: R) -> ArbiterResult<LoadedConfig> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(load_str(&text))
}

/// Parse behavior file text.
pub fn load_str(text: &str) -> LoadedConfig {
    let mut loader = Loader::default();
    for piece in pieces(text) {
        loader.feed(piece);
    }
    loader.finish()
}

// ── Lexing ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Piece {
    Text(String),
    Open,
    Close,
}

/// Split `text` into brace and text pieces tagged with 1-based line numbers.
fn pieces(text: &str) -> Vec<(usize, Piece)> {
    let mut out = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.starts_with('#') {
            continue;
        }
        let body = trimmed.split_once("//").map_or(trimmed, |(before, _)| before);

        let mut rest = body;
        while let Some(pos) = rest.find(['{', '}']) {
            push_text(&mut out, line, &rest[..pos]);
            out.push((line, if rest.as_bytes()[pos] == b'{' { Piece::Open } else { Piece::Close }));
            rest = &rest[pos + 1..];
        }
        push_text(&mut out, line, rest);
    }
    out
}

fn push_text(out: &mut Vec<(usize, Piece)>, line: usize, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push((line, Piece::Text(s.to_string())));
    }
}

/// Split `KEY = VALUE` at the first `=`.
fn key_value(s: &str) -> Option<(&str, &str)> {
    let (k, v) = s.split_once('=')?;
    let k = k.trim();
    (!k.is_empty()).then_some((k, v.trim()))
}

/// Strip a leading keyword followed by whitespace or `=`.
fn keyword<'a>(s: &'a str, kw: &str) -> Option<&'a str> {
    let head = s.get(..kw.len())?;
    if !head.eq_ignore_ascii_case(kw) {
        return None;
    }
    let rest = &s[kw.len()..];
    rest.starts_with(|c: char| c.is_whitespace() || c == '=').then_some(rest)
}

// ── Loader state machine ──────────────────────────────────────────────────────

struct ModeDecl {
    line:       usize,
    var:        String,
    value:      String,
    conditions: Vec<String>,
}

enum State {
    Top,
    /// `behavior = X` seen, waiting for `{`.
    AwaitBehavior(BehaviorTemplate),
    InBehavior(BehaviorTemplate),
    /// `set V = X` seen, waiting for `{`.
    AwaitSet(ModeDecl),
    InSet(ModeDecl),
    /// Closing brace of a `set` block seen on `line`; a default may follow.
    AfterSet(ModeDecl, usize),
}

struct Loader {
    state: State,
    out:   LoadedConfig,
}

impl Default for Loader {
    fn default() -> Self {
        Self { state: State::Top, out: LoadedConfig::default() }
    }
}

impl Loader {
    fn warn(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        warn!(line, %message, "behavior file");
        self.out.warnings.push(LoadWarning { line, message });
    }

    fn feed(&mut self, (line, piece): (usize, Piece)) {
        let state = std::mem::replace(&mut self.state, State::Top);
        self.state = match (state, piece) {
            (State::Top, Piece::Text(t)) => self.statement(line, &t),
            (State::Top, p) => {
                self.warn(line, format!("unexpected {}", brace_name(&p)));
                State::Top
            }

            (State::AwaitBehavior(t), Piece::Open) => State::InBehavior(t),
            (State::AwaitBehavior(t), p) => {
                self.warn(line, format!("expected '{{' after behavior = {}", t.kind));
                self.resume(line, p)
            }

            (State::InBehavior(t), Piece::Close) => {
                self.out.templates.push(t);
                State::Top
            }
            (State::InBehavior(t), Piece::Open) => {
                self.warn(line, "unexpected '{' inside behavior block");
                State::InBehavior(t)
            }
            (State::InBehavior(mut t), Piece::Text(s)) => {
                match key_value(&s) {
                    Some((k, v)) => {
                        if let Err(e) = t.push_param(k, v) {
                            self.warn(line, e.to_string());
                        }
                    }
                    None => self.warn(line, format!("expected key = value, found {s:?}")),
                }
                State::InBehavior(t)
            }

            (State::AwaitSet(d), Piece::Open) => State::InSet(d),
            (State::AwaitSet(d), p) => {
                self.warn(line, format!("expected '{{' after set {} = {}", d.var, d.value));
                self.resume(line, p)
            }

            (State::InSet(d), Piece::Close) => State::AfterSet(d, line),
            (State::InSet(d), Piece::Open) => {
                self.warn(line, "unexpected '{' inside set block");
                State::InSet(d)
            }
            (State::InSet(mut d), Piece::Text(s)) => {
                d.conditions.push(s);
                State::InSet(d)
            }

            (State::AfterSet(d, close_line), Piece::Text(s)) => {
                if let Some(rest) = keyword(&s, "else") {
                    self.finish_set(d, Some(rest.trim_start().trim_start_matches('=').trim()));
                    State::Top
                } else if close_line == line {
                    self.finish_set(d, Some(&s));
                    State::Top
                } else {
                    self.finish_set(d, None);
                    self.statement(line, &s)
                }
            }
            (State::AfterSet(d, _), p) => {
                self.finish_set(d, None);
                self.resume(line, p)
            }
        };
    }

    /// Handle `piece` as if it appeared at top level.
    fn resume(&mut self, line: usize, piece: Piece) -> State {
        match piece {
            Piece::Text(t) => self.statement(line, &t),
            p => {
                self.warn(line, format!("unexpected {}", brace_name(&p)));
                State::Top
            }
        }
    }

    /// A top-level statement.
    fn statement(&mut self, line: usize, s: &str) -> State {
        if let Some(rest) = keyword(s, "behavior") {
            let kind = rest.trim_start().trim_start_matches('=').trim();
            if kind.is_empty() {
                self.warn(line, "behavior without a type");
                return State::Top;
            }
            let mut t = BehaviorTemplate::new(kind);
            t.line = line;
            return State::AwaitBehavior(t);
        }
        if let Some(rest) = keyword(s, "set") {
            return match key_value(rest) {
                Some((var, value)) if !value.is_empty() => State::AwaitSet(ModeDecl {
                    line,
                    var:        var.to_string(),
                    value:      value.to_string(),
                    conditions: Vec::new(),
                }),
                _ => {
                    self.warn(line, format!("expected set VAR = VALUE, found {s:?}"));
                    State::Top
                }
            };
        }
        if let Some(rest) = keyword(s, "initialize") {
            for assignment in rest.split(',') {
                match key_value(assignment) {
                    Some((var, value)) => {
                        self.out.initial.push((var.to_string(), Value::parse_literal(value)));
                    }
                    None => self.warn(line, format!("expected VAR = VALUE, found {:?}", assignment.trim())),
                }
            }
            return State::Top;
        }
        self.warn(line, format!("unrecognized statement {s:?}"));
        State::Top
    }

    fn finish_set(&mut self, d: ModeDecl, default: Option<&str>) {
        let entry = ModeEntry::new(&d.var)
            .and_then(|e| e.with_rule(&d.conditions, &d.value))
            .and_then(|e| match default {
                Some(v) if !v.is_empty() => e.with_default(v),
                _ => Ok(e),
            });
        match entry {
            Ok(e) => self.out.modes.push(e),
            Err(e) => self.warn(d.line, e.to_string()),
        }
    }

    fn finish(mut self) -> LoadedConfig {
        match std::mem::replace(&mut self.state, State::Top) {
            State::Top => {}
            State::AfterSet(d, _) => self.finish_set(d, None),
            State::AwaitBehavior(t) | State::InBehavior(t) => {
                self.warn(t.line, format!("unterminated behavior block for {}", t.kind));
            }
            State::AwaitSet(d) | State::InSet(d) => {
                self.warn(d.line, format!("unterminated set block for {}", d.var));
            }
        }
        self.out
    }
}

fn brace_name(p: &Piece) -> &'static str {
    match p {
        Piece::Open    => "'{'",
        Piece::Close   => "'}'",
        Piece::Text(_) => "text",
    }
}
