use crate::error::{Result, RoleExpressionError};
use crate::held::HeldRoles;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed boolean formula over role names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(bool),
    Role(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluate with `&` and `|` short-circuiting
    pub fn evaluate<R>(&self, roles: &R) -> bool
    where
        R: HeldRoles + ?Sized,
    {
        match self {
            Self::Literal(value) => *value,
            Self::Role(name) => roles.holds(name),
            Self::And(lhs, rhs) => lhs.evaluate(roles) && rhs.evaluate(roles),
            Self::Or(lhs, rhs) => lhs.evaluate(roles) || rhs.evaluate(roles),
        }
    }

    /// Replace every role with the literal for its membership
    pub fn substitute<R>(&self, roles: &R) -> Expr
    where
        R: HeldRoles + ?Sized,
    {
        match self {
            Self::Literal(value) => Self::Literal(*value),
            Self::Role(name) => Self::Literal(roles.holds(name)),
            Self::And(lhs, rhs) => {
                Self::And(Box::new(lhs.substitute(roles)), Box::new(rhs.substitute(roles)))
            }
            Self::Or(lhs, rhs) => {
                Self::Or(Box::new(lhs.substitute(roles)), Box::new(rhs.substitute(roles)))
            }
        }
    }

    fn collect_roles<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Role(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_roles(names);
                rhs.collect_roles(names);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Role(name) => write!(f, "{name}"),
            Self::And(lhs, rhs) => write!(f, "({lhs} & {rhs})"),
            Self::Or(lhs, rhs) => write!(f, "({lhs} | {rhs})"),
        }
    }
}

/// A validated role expression together with its source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleExpression {
    source: String,
    root: Expr,
}

impl RoleExpression {
    /// Parse an expression; blank input yields the unrestricted expression
    ///
    /// # Errors
    ///
    /// Returns [`RoleExpressionError`] on any syntax defect.
    pub fn parse(source: &str) -> Result<Self> {
        let lexemes = tokenize(source);
        if lexemes.is_empty() {
            return Ok(Self::unrestricted());
        }

        let mut parser = Parser {
            source,
            lexemes,
            position: 0,
        };
        let root = parser.parse_expr()?;
        parser.finish()?;

        tracing::trace!(expression = source, parsed = %root, "parsed role expression");
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Expression that admits everyone
    pub fn unrestricted() -> Self {
        Self {
            source: String::new(),
            root: Expr::Literal(true),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub fn is_unrestricted(&self) -> bool {
        self.root == Expr::Literal(true)
    }

    pub fn evaluate<R>(&self, roles: &R) -> bool
    where
        R: HeldRoles + ?Sized,
    {
        self.root.evaluate(roles)
    }

    /// Distinct role names, longest first, ties in order of appearance
    pub fn role_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.root.collect_roles(&mut names);
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        names
    }
}

impl TryFrom<String> for RoleExpression {
    type Error = RoleExpressionError;

    fn try_from(source: String) -> Result<Self> {
        Self::parse(&source)
    }
}

impl From<RoleExpression> for String {
    fn from(expression: RoleExpression) -> Self {
        expression.source
    }
}

impl std::str::FromStr for RoleExpression {
    type Err = RoleExpressionError;

    fn from_str(source: &str) -> Result<Self> {
        Self::parse(source)
    }
}

impl fmt::Display for RoleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'s> {
    And,
    Or,
    Open,
    Close,
    Role(&'s str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("&"),
            Self::Or => f.write_str("|"),
            Self::Open => f.write_str("("),
            Self::Close => f.write_str(")"),
            Self::Role(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Lexeme<'s> {
    token: Token<'s>,
    offset: usize,
}

/// Split into operators and maximal role-name runs
fn tokenize<'s>(source: &'s str) -> Vec<Lexeme<'s>> {
    let mut lexemes = Vec::new();
    let mut run_start: Option<usize> = None;

    let close_run = |lexemes: &mut Vec<Lexeme<'s>>, start: Option<usize>, end: usize| {
        if let Some(begin) = start {
            if let Some(name) = source.get(begin..end).filter(|name| !name.is_empty()) {
                lexemes.push(Lexeme {
                    token: Token::Role(name),
                    offset: begin,
                });
            }
        }
    };

    for (offset, ch) in source.char_indices() {
        let operator = match ch {
            '&' => Some(Token::And),
            '|' => Some(Token::Or),
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            _ => None,
        };

        if operator.is_some() || ch.is_whitespace() {
            close_run(&mut lexemes, run_start.take(), offset);
            if let Some(token) = operator {
                lexemes.push(Lexeme { token, offset });
            }
        } else if run_start.is_none() {
            run_start = Some(offset);
        }
    }
    close_run(&mut lexemes, run_start, source.len());

    lexemes
}

struct Parser<'s> {
    source: &'s str,
    lexemes: Vec<Lexeme<'s>>,
    position: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<Lexeme<'s>> {
        self.lexemes.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<Lexeme<'s>> {
        let lexeme = self.peek();
        if lexeme.is_some() {
            self.position += 1;
        }
        lexeme
    }

    fn eat(&mut self, token: Token<'_>) -> bool {
        match self.peek() {
            Some(lexeme) if lexeme.token == token => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let mut node = self.parse_term()?;
        while self.eat(Token::Or) {
            let rhs = self.parse_term()?;
            node = Expr::Or(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut node = self.parse_factor()?;
        while self.eat(Token::And) {
            let rhs = self.parse_factor()?;
            node = Expr::And(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Lexeme {
                token: Token::Role(name),
                ..
            }) => Ok(Expr::Role(name.to_string())),
            Some(Lexeme {
                token: Token::Open,
                offset,
            }) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Lexeme {
                        token: Token::Close,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(self.unexpected(other)),
                    None => Err(RoleExpressionError::UnbalancedParenthesis {
                        source_text: self.source.to_string(),
                        offset,
                    }),
                }
            }
            Some(other) => Err(self.unexpected(other)),
            None => Err(RoleExpressionError::UnexpectedEnd {
                source_text: self.source.to_string(),
            }),
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self.advance() {
            None => Ok(()),
            Some(Lexeme {
                token: Token::Close,
                offset,
            }) => Err(RoleExpressionError::UnbalancedParenthesis {
                source_text: self.source.to_string(),
                offset,
            }),
            Some(other) => Err(self.unexpected(other)),
        }
    }

    fn unexpected(&self, lexeme: Lexeme<'_>) -> RoleExpressionError {
        RoleExpressionError::UnexpectedToken {
            source_text: self.source.to_string(),
            found: lexeme.token.to_string(),
            offset: lexeme.offset,
        }
    }
}
