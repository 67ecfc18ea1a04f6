//! `LogicCondition` — boolean expressions over store variables.
//!
//! # Grammar
//!
//! ```text
//! expr     := and_expr ( ("or" | "||") and_expr )*
//! and_expr := unary ( ("and" | "&&") unary )*
//! unary    := "!" unary | "(" expr ")" | relation
//! relation := operand op operand
//! op       := "=" | "==" | "!=" | "<" | ">" | "<=" | ">="
//! operand  := WORD | NUMBER | "quoted text" | $(VAR)
//! ```
//!
//! A bare word on the left of a relation names a variable.  On the right it
//! is a literal, unless written `$(VAR)`.  Numbers are always literals.
//!
//! # Evaluation
//!
//! - A relation that refers to an unset variable is false.
//! - If both sides are numeric (doubles, or strings that parse as numbers)
//!   the comparison is numeric.
//! - Otherwise both sides are compared as case-insensitive strings.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult, StateStore, Value};

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Clone, Debug, PartialEq)]
enum Operand {
    Var(String),
    Num(f64),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Rel(Operand, RelOp, Operand),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

// ── Tokens ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Op(RelOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => { out.push(Token::LParen); i += 1; }
            ')' => { out.push(Token::RParen); i += 1; }
            '=' => {
                out.push(Token::Op(RelOp::Eq));
                i += if next == Some('=') { 2 } else { 1 };
            }
            '!' if next == Some('=') => { out.push(Token::Op(RelOp::Ne)); i += 2; }
            '!' => { out.push(Token::Not); i += 1; }
            '<' if next == Some('=') => { out.push(Token::Op(RelOp::Le)); i += 2; }
            '<' => { out.push(Token::Op(RelOp::Lt)); i += 1; }
            '>' if next == Some('=') => { out.push(Token::Op(RelOp::Ge)); i += 2; }
            '>' => { out.push(Token::Op(RelOp::Gt)); i += 1; }
            '&' if next == Some('&') => { out.push(Token::And); i += 2; }
            '|' if next == Some('|') => { out.push(Token::Or); i += 2; }
            '"' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == '"')
                    .map(|p| start + p)
                    .ok_or_else(|| "unterminated quote".to_string())?;
                out.push(Token::Quoted(chars[start..end].iter().collect()));
                i = end + 1;
            }
            '$' if next == Some('(') => {
                let start = i + 2;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == ')')
                    .map(|p| start + p)
                    .ok_or_else(|| "unterminated $( reference".to_string())?;
                let name: String = chars[start..end].iter().collect();
                // Marked with a leading '$' so the parser can tell it apart.
                out.push(Token::Word(format!("${}", name.trim())));
                i = end + 1;
            }
            _ => {
                let start = i;
                while i < chars.len() && !is_delimiter(chars[i]) {
                    i += 1;
                }
                if start == i {
                    return Err(format!("unexpected character {c:?}"));
                }
                let word: String = chars[start..i].iter().collect();
                match word.to_ascii_lowercase().as_str() {
                    "and" => out.push(Token::And),
                    "or"  => out.push(Token::Or),
                    _     => out.push(Token::Word(word)),
                }
            }
        }
    }
    Ok(out)
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '=' | '!' | '<' | '>' | '&' | '|' | '"')
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos:    usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.bump();
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.bump();
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Not) => {
                self.bump();
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            Some(Token::LParen) => {
                self.bump();
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing closing parenthesis".into()),
                }
            }
            _ => self.relation(),
        }
    }

    fn relation(&mut self) -> Result<Expr, String> {
        let lhs = self.operand(true)?;
        let op = match self.bump() {
            Some(Token::Op(op)) => op,
            other => return Err(format!("expected relational operator, found {other:?}")),
        };
        let rhs = self.operand(false)?;
        Ok(Expr::Rel(lhs, op, rhs))
    }

    fn operand(&mut self, left: bool) -> Result<Operand, String> {
        match self.bump() {
            Some(Token::Quoted(s)) => Ok(Operand::Text(s)),
            Some(Token::Word(w)) => {
                if let Some(name) = w.strip_prefix('$') {
                    if name.is_empty() {
                        return Err("empty $() reference".into());
                    }
                    return Ok(Operand::Var(name.to_string()));
                }
                if let Ok(n) = w.parse::<f64>() {
                    return Ok(Operand::Num(n));
                }
                if left {
                    Ok(Operand::Var(w))
                } else {
                    Ok(Operand::Text(w))
                }
            }
            other => Err(format!("expected operand, found {other:?}")),
        }
    }
}

// ── LogicCondition ────────────────────────────────────────────────────────────

/// A parsed boolean condition over store variables.
#[derive(Clone, Debug, PartialEq)]
pub struct LogicCondition {
    raw:  String,
    expr: Expr,
}

impl LogicCondition {
    /// Parse `src` into a condition.
    pub fn parse(src: &str) -> CoreResult<Self> {
        let fail = |reason: String| CoreError::Condition { expr: src.to_string(), reason };

        let tokens = tokenize(src).map_err(fail)?;
        if tokens.is_empty() {
            return Err(fail("empty condition".into()));
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr().map_err(fail)?;
        if parser.pos < parser.tokens.len() {
            return Err(fail(format!("trailing input at token {}", parser.pos)));
        }
        Ok(Self { raw: src.trim().to_string(), expr })
    }

    /// The condition text as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Evaluate against the current store snapshot.
    pub fn evaluate(&self, store: &StateStore) -> bool {
        eval(&self.expr, &|name| store.query_value(name).cloned())
    }

    /// Evaluate with an arbitrary variable lookup, e.g. a store overlaid
    /// with values that have not been posted.
    pub fn evaluate_with<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        eval(&self.expr, &lookup)
    }

    /// Every variable the condition reads, in first-appearance order.
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_vars(&self.expr, &mut out);
        out
    }

    /// `true` if the condition reads `var`.
    pub fn references(&self, var: &str) -> bool {
        self.variables().iter().any(|v| v == var)
    }
}

impl FromStr for LogicCondition {
    type Err = CoreError;
    fn from_str(s: &str) -> CoreResult<Self> {
        LogicCondition::parse(s)
    }
}

impl fmt::Display for LogicCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── Evaluation helpers ────────────────────────────────────────────────────────

type Lookup<'a> = &'a dyn Fn(&str) -> Option<Value>;

fn eval(expr: &Expr, lookup: Lookup<'_>) -> bool {
    match expr {
        Expr::Rel(l, op, r) => {
            let (Some(lv), Some(rv)) = (resolve(l, lookup), resolve(r, lookup)) else {
                return false;
            };
            compare(&lv, *op, &rv)
        }
        Expr::Not(e)    => !eval(e, lookup),
        Expr::And(a, b) => eval(a, lookup) && eval(b, lookup),
        Expr::Or(a, b)  => eval(a, lookup) || eval(b, lookup),
    }
}

fn resolve(op: &Operand, lookup: Lookup<'_>) -> Option<Value> {
    match op {
        Operand::Var(name) => lookup(name),
        Operand::Num(n)    => Some(Value::Double(*n)),
        Operand::Text(s)   => Some(Value::Str(s.clone())),
    }
}

fn compare(l: &Value, op: RelOp, r: &Value) -> bool {
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        return match op {
            RelOp::Eq => a == b,
            RelOp::Ne => a != b,
            RelOp::Lt => a < b,
            RelOp::Gt => a > b,
            RelOp::Le => a <= b,
            RelOp::Ge => a >= b,
        };
    }
    let a = l.to_string().to_ascii_lowercase();
    let b = r.to_string().to_ascii_lowercase();
    match op {
        RelOp::Eq => a == b,
        RelOp::Ne => a != b,
        RelOp::Lt => a < b,
        RelOp::Gt => a > b,
        RelOp::Le => a <= b,
        RelOp::Ge => a >= b,
    }
}

fn collect_vars(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Rel(l, _, r) => {
            for side in [l, r] {
                if let Operand::Var(v) = side {
                    if !out.contains(v) {
                        out.push(v.clone());
                    }
                }
            }
        }
        Expr::Not(e) => collect_vars(e, out),
        Expr::And(a, b) | Expr::Or(a, b) => {
            collect_vars(a, out);
            collect_vars(b, out);
        }
    }
}
