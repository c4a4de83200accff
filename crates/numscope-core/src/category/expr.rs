//! Expression engine for user-defined rules.
//!
//! A rule is a single boolean expression over the variable `n`, for example
//! `n % 3 == 0` or `isqrt(n) * isqrt(n) == n`. The language is closed: it has
//! integer literals, `n`, arithmetic (`+ - * / %`, unary `-`), comparisons
//! (`== != < <= > >=`), boolean operators (`&& || !`), parentheses, and the
//! function whitelist `abs`, `min`, `max`, `isqrt`, `pow`. There is no other
//! name resolution, so a rule cannot reach the host environment.
//!
//! Compilation (tokenize, parse, type-check) happens once, at registry build
//! time. Unknown names, syntax errors, and rules that do not evaluate to a
//! boolean are all rejected there. The only failures left for evaluation time
//! are arithmetic ones (division by zero, overflow, domain errors); those are
//! per-number and contained by the caller.

use std::fmt;

use crate::error::RuleError;

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(i64),
    Var,
    Func(Func),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Abs,
    Min,
    Max,
    Isqrt,
    Pow,
}

impl Func {
    fn name(self) -> &'static str {
        match self {
            Func::Abs => "abs",
            Func::Min => "min",
            Func::Max => "max",
            Func::Isqrt => "isqrt",
            Func::Pow => "pow",
        }
    }

    fn arity(self) -> usize {
        match self {
            Func::Abs | Func::Isqrt => 1,
            Func::Min | Func::Max | Func::Pow => 2,
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            }
            '-' => {
                tokens.push(Token::Minus);
                chars.next();
            }
            '*' => {
                tokens.push(Token::Star);
                chars.next();
            }
            '/' => {
                tokens.push(Token::Slash);
                chars.next();
            }
            '%' => {
                tokens.push(Token::Percent);
                chars.next();
            }
            '=' => {
                chars.next();
                match chars.next() {
                    Some('=') => tokens.push(Token::Eq),
                    _ => return Err("expected `==`".to_string()),
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '&' => {
                chars.next();
                match chars.next() {
                    Some('&') => tokens.push(Token::And),
                    _ => return Err("expected `&&`".to_string()),
                }
            }
            '|' => {
                chars.next();
                match chars.next() {
                    Some('|') => tokens.push(Token::Or),
                    _ => return Err("expected `||`".to_string()),
                }
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_digit() && c != '_' {
                        break;
                    }
                    if c != '_' {
                        digits.push(c);
                    }
                    chars.next();
                }
                let value: i64 = digits
                    .parse()
                    .map_err(|_| format!("integer literal `{}` out of range", digits))?;
                tokens.push(Token::Int(value));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_alphanumeric() && c != '_' {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                let token = match ident.as_str() {
                    "n" => Token::Var,
                    "abs" => Token::Func(Func::Abs),
                    "min" => Token::Func(Func::Min),
                    "max" => Token::Func(Func::Max),
                    "isqrt" => Token::Func(Func::Isqrt),
                    "pow" => Token::Func(Func::Pow),
                    _ => return Err(format!("unknown name `{}`", ident)),
                };
                tokens.push(token);
            }
            c => return Err(format!("unexpected character `{}`", c)),
        }
    }

    Ok(tokens)
}

// ============================================================================
// AST and parser
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Int(i64),
    Var,
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Recursive-descent parser over the token stream.
///
/// Precedence, loosest first: `||`, `&&`, comparisons (non-associative),
/// `+ -`, `* / %`, unary `- !`.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), String> {
        match self.advance() {
            Some(t) if *t == token => Ok(()),
            Some(t) => Err(format!("expected {}, found {:?}", what, t)),
            None => Err(format!("expected {}, found end of rule", what)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_comparison()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let lhs = self.parse_additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinOp::Eq,
            Some(Token::Ne) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_additive()?;
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Some(Token::Not) => {
                self.advance();
                Ok(Expr::Not(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance().cloned() {
            Some(Token::Int(value)) => Ok(Expr::Int(value)),
            Some(Token::Var) => Ok(Expr::Var),
            Some(Token::Func(func)) => {
                self.expect(Token::LParen, "`(`")?;
                let mut args = Vec::new();
                if self.peek() != Some(&Token::RParen) {
                    loop {
                        args.push(self.parse_expr()?);
                        if self.peek() != Some(&Token::Comma) {
                            break;
                        }
                        self.advance();
                    }
                }
                self.expect(Token::RParen, "`)`")?;
                if args.len() != func.arity() {
                    return Err(format!(
                        "{}() takes {} argument(s), got {}",
                        func.name(),
                        func.arity(),
                        args.len()
                    ));
                }
                Ok(Expr::Call(func, args))
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of rule".to_string()),
        }
    }
}

// ============================================================================
// Type check
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ty {
    Int,
    Bool,
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => write!(f, "integer"),
            Ty::Bool => write!(f, "boolean"),
        }
    }
}

/// Infer the type of an expression, rejecting ill-typed combinations.
///
/// Every combination the checker admits is evaluable, so the evaluator only
/// has arithmetic failures left to report.
fn infer(expr: &Expr) -> Result<Ty, String> {
    match expr {
        Expr::Int(_) | Expr::Var => Ok(Ty::Int),
        Expr::Neg(inner) => {
            expect_ty(inner, Ty::Int, "unary `-`")?;
            Ok(Ty::Int)
        }
        Expr::Not(inner) => {
            expect_ty(inner, Ty::Bool, "`!`")?;
            Ok(Ty::Bool)
        }
        Expr::Binary(op, lhs, rhs) => match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                expect_ty(lhs, Ty::Int, "arithmetic")?;
                expect_ty(rhs, Ty::Int, "arithmetic")?;
                Ok(Ty::Int)
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                expect_ty(lhs, Ty::Int, "comparison")?;
                expect_ty(rhs, Ty::Int, "comparison")?;
                Ok(Ty::Bool)
            }
            BinOp::Eq | BinOp::Ne => {
                let lt = infer(lhs)?;
                let rt = infer(rhs)?;
                if lt != rt {
                    return Err(format!("cannot compare {} with {}", lt, rt));
                }
                Ok(Ty::Bool)
            }
            BinOp::And | BinOp::Or => {
                expect_ty(lhs, Ty::Bool, "`&&`/`||`")?;
                expect_ty(rhs, Ty::Bool, "`&&`/`||`")?;
                Ok(Ty::Bool)
            }
        },
        Expr::Call(func, args) => {
            for arg in args {
                expect_ty(arg, Ty::Int, func.name())?;
            }
            Ok(Ty::Int)
        }
    }
}

fn expect_ty(expr: &Expr, expected: Ty, context: &str) -> Result<(), String> {
    let actual = infer(expr)?;
    if actual != expected {
        return Err(format!(
            "{} requires a {} operand, found {}",
            context, expected, actual
        ));
    }
    Ok(())
}

// ============================================================================
// Evaluation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    // The type checker guarantees these conversions at compile time.
    fn int(self) -> i64 {
        match self {
            Value::Int(v) => v,
            Value::Bool(_) => unreachable!("type-checked expression produced a boolean"),
        }
    }

    fn bool(self) -> bool {
        match self {
            Value::Bool(v) => v,
            Value::Int(_) => unreachable!("type-checked expression produced an integer"),
        }
    }
}

fn eval(expr: &Expr, n: i64) -> Result<Value, RuleError> {
    match expr {
        Expr::Int(value) => Ok(Value::Int(*value)),
        Expr::Var => Ok(Value::Int(n)),
        Expr::Neg(inner) => {
            let v = eval(inner, n)?.int();
            v.checked_neg()
                .map(Value::Int)
                .ok_or(RuleError::Overflow)
        }
        Expr::Not(inner) => Ok(Value::Bool(!eval(inner, n)?.bool())),
        Expr::Binary(op, lhs, rhs) => match op {
            // Short-circuit before touching the right-hand side.
            BinOp::And => {
                if !eval(lhs, n)?.bool() {
                    return Ok(Value::Bool(false));
                }
                eval(rhs, n)
            }
            BinOp::Or => {
                if eval(lhs, n)?.bool() {
                    return Ok(Value::Bool(true));
                }
                eval(rhs, n)
            }
            BinOp::Eq => Ok(Value::Bool(eval(lhs, n)? == eval(rhs, n)?)),
            BinOp::Ne => Ok(Value::Bool(eval(lhs, n)? != eval(rhs, n)?)),
            _ => {
                let a = eval(lhs, n)?.int();
                let b = eval(rhs, n)?.int();
                match op {
                    BinOp::Add => a.checked_add(b).map(Value::Int).ok_or(RuleError::Overflow),
                    BinOp::Sub => a.checked_sub(b).map(Value::Int).ok_or(RuleError::Overflow),
                    BinOp::Mul => a.checked_mul(b).map(Value::Int).ok_or(RuleError::Overflow),
                    BinOp::Div => {
                        if b == 0 {
                            Err(RuleError::DivisionByZero)
                        } else {
                            a.checked_div(b).map(Value::Int).ok_or(RuleError::Overflow)
                        }
                    }
                    BinOp::Rem => {
                        if b == 0 {
                            Err(RuleError::DivisionByZero)
                        } else {
                            a.checked_rem(b).map(Value::Int).ok_or(RuleError::Overflow)
                        }
                    }
                    BinOp::Lt => Ok(Value::Bool(a < b)),
                    BinOp::Le => Ok(Value::Bool(a <= b)),
                    BinOp::Gt => Ok(Value::Bool(a > b)),
                    BinOp::Ge => Ok(Value::Bool(a >= b)),
                    BinOp::Eq | BinOp::Ne | BinOp::And | BinOp::Or => {
                        unreachable!("handled above")
                    }
                }
            }
        },
        Expr::Call(func, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, n)?.int());
            }
            let result = match func {
                Func::Abs => values[0].checked_abs().ok_or(RuleError::Overflow)?,
                Func::Min => values[0].min(values[1]),
                Func::Max => values[0].max(values[1]),
                Func::Isqrt => isqrt(values[0])?,
                Func::Pow => pow(values[0], values[1])?,
            };
            Ok(Value::Int(result))
        }
    }
}

/// Floor of the square root of a non-negative integer.
///
/// Seeds from the float sqrt, then corrects by squaring so float rounding
/// can never shift the result off by one.
fn isqrt(x: i64) -> Result<i64, RuleError> {
    if x < 0 {
        return Err(RuleError::NegativeSqrt);
    }
    let mut r = (x as f64).sqrt() as i64;
    while r > 0 && r.checked_mul(r).map_or(true, |sq| sq > x) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= x) {
        r += 1;
    }
    Ok(r)
}

fn pow(base: i64, exp: i64) -> Result<i64, RuleError> {
    if exp < 0 {
        return Err(RuleError::NegativeExponent);
    }
    let exp = u32::try_from(exp).map_err(|_| RuleError::Overflow)?;
    base.checked_pow(exp).ok_or(RuleError::Overflow)
}

// ============================================================================
// CompiledRule
// ============================================================================

/// A user rule compiled to an AST, ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    source: String,
    ast: Expr,
}

impl CompiledRule {
    /// Compile a rule string. Syntax errors, unknown names, and non-boolean
    /// rules are all rejected here, never deferred to evaluation.
    pub fn compile(source: &str) -> Result<Self, String> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err("empty rule".to_string());
        }
        let mut parser = Parser::new(&tokens);
        let ast = parser.parse_expr()?;
        if parser.peek().is_some() {
            return Err(format!(
                "unexpected trailing tokens after expression: {:?}",
                &parser.tokens[parser.pos..]
            ));
        }
        match infer(&ast)? {
            Ty::Bool => Ok(Self {
                source: source.to_string(),
                ast,
            }),
            Ty::Int => Err("rule must evaluate to a boolean, not an integer".to_string()),
        }
    }

    /// The rule text as written in the configuration.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against one number. Arithmetic failures are reported, not
    /// panicked, and carry no state between calls.
    pub fn eval(&self, n: i64) -> Result<bool, RuleError> {
        Ok(eval(&self.ast, n)?.bool())
    }
}
