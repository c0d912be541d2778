//! Numeric expression evaluator
//!
//! Player input is a real-valued function of `x`. It is tokenized, parsed by
//! recursive descent into an [`Expr`] tree, then evaluated per sample. Only
//! arithmetic, a fixed set of math functions and the constants `pi`/`e` are
//! accepted; nothing in the input is ever executed.
//!
//! Precedence, loosest first:
//! - `+ -`
//! - `* / %`
//! - unary `- +`
//! - `**` (right-associative)
//! - literals, `x`, calls, parentheses

use std::fmt;

use thiserror::Error;

/// Maximum nesting of parentheses/unary operators/calls
const MAX_DEPTH: usize = 64;

/// Total tree size; bounds evaluation and drop recursion for flat chains
const MAX_NODES: usize = 512;

/// Why an expression could not produce a usable number
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unknown identifier '{0}' (use 'x' as the variable)")]
    UnknownIdentifier(String),

    #[error("{name}() takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("expression is nested too deeply")]
    TooDeep,

    #[error("expression is too long (more than {} terms)", MAX_NODES)]
    TooLarge,

    #[error("result is not a finite number at x = {x}")]
    NonFinite { x: f64 },
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Num(n) => write!(f, "{n}"),
            Tok::Ident(s) => f.write_str(s),
            Tok::Plus => f.write_str("+"),
            Tok::Minus => f.write_str("-"),
            Tok::Star => f.write_str("*"),
            Tok::StarStar => f.write_str("**"),
            Tok::Slash => f.write_str("/"),
            Tok::Percent => f.write_str("%"),
            Tok::LParen => f.write_str("("),
            Tok::RParen => f.write_str(")"),
            Tok::Comma => f.write_str(","),
        }
    }
}

/// Split input into (position, token) pairs
fn tokenize(src: &str) -> Result<Vec<(usize, Tok)>, EvalError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) {
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            // Exponent only when digits follow, so `2e` stays a number then `e`
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| EvalError::UnexpectedToken { found: text.clone(), pos: start })?;
            tokens.push((start, Tok::Num(value)));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut word = read_word(&chars, &mut i);
            // `Math.sin` reads as `sin`
            if word == "Math" && chars.get(i) == Some(&'.') {
                i += 1;
                word = read_word(&chars, &mut i);
                if word.is_empty() {
                    return Err(match chars.get(i) {
                        Some(&ch) => EvalError::UnexpectedChar { ch, pos: i },
                        None => EvalError::UnexpectedEnd,
                    });
                }
            }
            tokens.push((start, Tok::Ident(word)));
            continue;
        }

        let tok = match c {
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Tok::StarStar
            }
            '*' => Tok::Star,
            '/' => Tok::Slash,
            '%' => Tok::Percent,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            ',' => Tok::Comma,
            ch => return Err(EvalError::UnexpectedChar { ch, pos: start }),
        };
        i += 1;
        tokens.push((start, tok));
    }

    Ok(tokens)
}

fn read_word(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && (chars[*i].is_ascii_alphanumeric() || chars[*i] == '_') {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

// ---------------------------------------------------------------------------
// Expression tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Single-argument functions on the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func1 {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Cbrt,
    Ln,
    Log10,
    Log2,
    Exp,
    Abs,
    Floor,
    Ceil,
    Round,
}

impl Func1 {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Func1::Sin,
            "cos" => Func1::Cos,
            "tan" => Func1::Tan,
            "asin" => Func1::Asin,
            "acos" => Func1::Acos,
            "atan" => Func1::Atan,
            "sqrt" => Func1::Sqrt,
            "cbrt" => Func1::Cbrt,
            // `log` is the natural log
            "log" | "ln" => Func1::Ln,
            "log10" => Func1::Log10,
            "log2" => Func1::Log2,
            "exp" => Func1::Exp,
            "abs" => Func1::Abs,
            "floor" => Func1::Floor,
            "ceil" => Func1::Ceil,
            "round" => Func1::Round,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Func1::Sin => "sin",
            Func1::Cos => "cos",
            Func1::Tan => "tan",
            Func1::Asin => "asin",
            Func1::Acos => "acos",
            Func1::Atan => "atan",
            Func1::Sqrt => "sqrt",
            Func1::Cbrt => "cbrt",
            Func1::Ln => "log",
            Func1::Log10 => "log10",
            Func1::Log2 => "log2",
            Func1::Exp => "exp",
            Func1::Abs => "abs",
            Func1::Floor => "floor",
            Func1::Ceil => "ceil",
            Func1::Round => "round",
        }
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Func1::Sin => v.sin(),
            Func1::Cos => v.cos(),
            Func1::Tan => v.tan(),
            Func1::Asin => v.asin(),
            Func1::Acos => v.acos(),
            Func1::Atan => v.atan(),
            Func1::Sqrt => v.sqrt(),
            Func1::Cbrt => v.cbrt(),
            Func1::Ln => v.ln(),
            Func1::Log10 => v.log10(),
            Func1::Log2 => v.log2(),
            Func1::Exp => v.exp(),
            Func1::Abs => v.abs(),
            Func1::Floor => v.floor(),
            Func1::Ceil => v.ceil(),
            Func1::Round => v.round(),
        }
    }
}

/// Two-argument functions on the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func2 {
    Pow,
    Min,
    Max,
    Atan2,
}

impl Func2 {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "pow" => Func2::Pow,
            "min" => Func2::Min,
            "max" => Func2::Max,
            "atan2" => Func2::Atan2,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Func2::Pow => "pow",
            Func2::Min => "min",
            Func2::Max => "max",
            Func2::Atan2 => "atan2",
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Func2::Pow => a.powf(b),
            Func2::Min => a.min(b),
            Func2::Max => a.max(b),
            Func2::Atan2 => a.atan2(b),
        }
    }
}

/// Parsed function of `x`
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    X,
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call1(Func1, Box<Expr>),
    Call2(Func2, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse expression text
    pub fn parse(src: &str) -> Result<Self, EvalError> {
        let tokens = tokenize(src)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
            nodes: 0,
        };
        let expr = parser.additive()?;
        match parser.peek() {
            None => Ok(expr),
            Some((pos, tok)) => Err(EvalError::UnexpectedToken {
                found: tok.to_string(),
                pos,
            }),
        }
    }

    /// Evaluate at `x`; NaN and infinities are errors
    pub fn eval(&self, x: f64) -> Result<f64, EvalError> {
        let y = self.eval_raw(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(EvalError::NonFinite { x })
        }
    }

    // Intermediate infinities are allowed (`1 / (1 / 0)` is 0); only the
    // final value is checked.
    fn eval_raw(&self, x: f64) -> f64 {
        match self {
            Expr::Num(n) => *n,
            Expr::X => x,
            Expr::Neg(e) => -e.eval_raw(x),
            Expr::Binary(op, l, r) => {
                let (a, b) = (l.eval_raw(x), r.eval_raw(x));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Rem => a % b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Expr::Call1(f, e) => f.apply(e.eval_raw(x)),
            Expr::Call2(f, a, b) => f.apply(a.eval_raw(x), b.eval_raw(x)),
        }
    }
}

/// Parse and evaluate in one step
pub fn evaluate(expression: &str, x: f64) -> Result<f64, EvalError> {
    Expr::parse(expression)?.eval(x)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<(usize, Tok)>,
    pos: usize,
    depth: usize,
    nodes: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, &Tok)> {
        self.tokens.get(self.pos).map(|(p, t)| (*p, t))
    }

    fn advance(&mut self) -> Result<(usize, Tok), EvalError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or(EvalError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn eat(&mut self, want: &Tok) -> bool {
        if self.peek().is_some_and(|(_, t)| t == want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: Tok) -> Result<(), EvalError> {
        let (pos, tok) = self.advance()?;
        if tok == want {
            Ok(())
        } else {
            Err(EvalError::UnexpectedToken {
                found: tok.to_string(),
                pos,
            })
        }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        Ok(())
    }

    fn node(&mut self, expr: Expr) -> Result<Expr, EvalError> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(EvalError::TooLarge);
        }
        Ok(expr)
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some((_, Tok::Plus)) => BinOp::Add,
                Some((_, Tok::Minus)) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some((_, Tok::Star)) => BinOp::Mul,
                Some((_, Tok::Slash)) => BinOp::Div,
                Some((_, Tok::Percent)) => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = self.node(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))?;
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let expr = if self.eat(&Tok::Minus) {
            let inner = self.unary()?;
            self.node(Expr::Neg(Box::new(inner)))?
        } else if self.eat(&Tok::Plus) {
            self.unary()?
        } else {
            self.power()?
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.primary()?;
        if self.eat(&Tok::StarStar) {
            // Right-associative: 2 ** 3 ** 2 == 2 ** 9
            let exponent = self.unary()?;
            return self.node(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let (pos, tok) = self.advance()?;
        match tok {
            Tok::Num(n) => self.node(Expr::Num(n)),
            Tok::LParen => {
                self.enter()?;
                let inner = self.additive()?;
                self.expect(Tok::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            Tok::Ident(name) => self.identifier(name),
            other => Err(EvalError::UnexpectedToken {
                found: other.to_string(),
                pos,
            }),
        }
    }

    fn identifier(&mut self, name: String) -> Result<Expr, EvalError> {
        if !self.eat(&Tok::LParen) {
            let leaf = match name.as_str() {
                "x" => Expr::X,
                "pi" | "PI" => Expr::Num(std::f64::consts::PI),
                "e" | "E" => Expr::Num(std::f64::consts::E),
                _ => return Err(EvalError::UnknownIdentifier(name)),
            };
            return self.node(leaf);
        }

        self.enter()?;
        let args = self.arguments()?;
        self.depth -= 1;

        if let Some(f) = Func1::lookup(&name) {
            let [arg] = into_array(args, f.name())?;
            return self.node(Expr::Call1(f, Box::new(arg)));
        }
        if let Some(f) = Func2::lookup(&name) {
            let [a, b] = into_array(args, f.name())?;
            return self.node(Expr::Call2(f, Box::new(a), Box::new(b)));
        }
        Err(EvalError::UnknownFunction(name))
    }

    /// Comma-separated arguments after an opening parenthesis
    fn arguments(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        if self.eat(&Tok::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.additive()?);
            if self.eat(&Tok::Comma) {
                continue;
            }
            self.expect(Tok::RParen)?;
            return Ok(args);
        }
    }
}

fn into_array<const N: usize>(args: Vec<Expr>, name: &'static str) -> Result<[Expr; N], EvalError> {
    let found = args.len();
    args.try_into().map_err(|_| EvalError::Arity {
        name,
        expected: N,
        found,
    })
}
