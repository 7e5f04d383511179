//! Syntax tree.
//!
//! Every node keeps the token it originated from.
//! The [`fmt::Display`] implementation of a node is its canonical,
//! fully parenthesized reconstruction, e.g. `-a * b` displays as `((-a) * b)`.
use crate::token::{self, Token};
use std::{fmt, rc::Rc};

pub trait Node: fmt::Display {
    /// Literal of the token the node originated from.
    fn token_literal(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Node for Program {
    fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(|stmt| stmt.token_literal())
            .unwrap_or("")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in self.statements.iter() {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, derive_more::From, PartialEq, Eq)]
pub enum Stmt {
    Let(StmtLet),
    Return(StmtReturn),
    Expr(StmtExpr),
}

impl Node for Stmt {
    fn token_literal(&self) -> &str {
        match self {
            Stmt::Let(stmt) => &stmt.token.literal,
            Stmt::Return(stmt) => &stmt.token.literal,
            Stmt::Expr(stmt) => &stmt.token.literal,
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let(stmt) => write!(f, "{} {} = {};", stmt.token.literal, stmt.name, stmt.value),
            Stmt::Return(stmt) => write!(f, "{} {};", stmt.token.literal, stmt.value),
            Stmt::Expr(stmt) => write!(f, "{}", stmt.expr),
        }
    }
}

/// `let <name> = <value>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtLet {
    pub token: Token,
    pub name: Identifier,
    pub value: Expr,
}

/// `return <value>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtReturn {
    pub token: Token,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtExpr {
    /// First token of the expression.
    pub token: Token,
    pub expr: Expr,
}

/// `{ <statements> }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Stmt>,
}

impl Node for Block {
    fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in self.statements.iter() {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, derive_more::From, PartialEq, Eq)]
pub enum Expr {
    Identifier(Identifier),
    Literal(ExprLiteral),
    Prefix(ExprPrefix),
    Infix(ExprInfix),
    If(ExprIf),
    Call(ExprCall),
    Index(ExprIndex),
}

impl Node for Expr {
    fn token_literal(&self) -> &str {
        match self {
            Expr::Identifier(expr) => &expr.token.literal,
            Expr::Literal(expr) => expr.token_literal(),
            Expr::Prefix(expr) => &expr.token.literal,
            Expr::Infix(expr) => &expr.token.literal,
            Expr::If(expr) => &expr.token.literal,
            Expr::Call(expr) => &expr.token.literal,
            Expr::Index(expr) => &expr.token.literal,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(expr) => write!(f, "{expr}"),
            Expr::Literal(expr) => write!(f, "{expr}"),
            Expr::Prefix(expr) => write!(f, "({}{})", expr.op.as_str(), expr.right),
            Expr::Infix(expr) => {
                write!(f, "({} {} {})", expr.left, expr.op.as_str(), expr.right)
            }
            Expr::If(expr) => {
                write!(f, "if {} {{ {} }}", expr.condition, expr.consequence)?;
                if let Some(alternative) = &expr.alternative {
                    write!(f, " else {{ {alternative} }}")?;
                }
                Ok(())
            }
            Expr::Call(expr) => {
                write!(f, "{}(", expr.function)?;
                write_separated(f, &expr.arguments)?;
                write!(f, ")")
            }
            Expr::Index(expr) => write!(f, "({}[{}])", expr.left, expr.index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let value = token.literal.clone();
        Self { token, value }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(derive_more::From, Clone, Debug, PartialEq, Eq)]
pub enum ExprLiteral {
    Integer(LitInteger),
    String(LitString),
    Bool(LitBool),
    Function(Rc<LitFunction>),
    Array(LitArray),
    Hash(LitHash),
}

impl ExprLiteral {
    fn token_literal(&self) -> &str {
        match self {
            ExprLiteral::Integer(lit) => &lit.token.literal,
            ExprLiteral::String(lit) => &lit.token.literal,
            ExprLiteral::Bool(lit) => &lit.token.literal,
            ExprLiteral::Function(lit) => &lit.token.literal,
            ExprLiteral::Array(lit) => &lit.token.literal,
            ExprLiteral::Hash(lit) => &lit.token.literal,
        }
    }
}

impl fmt::Display for ExprLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprLiteral::Integer(lit) => f.write_str(&lit.token.literal),
            ExprLiteral::String(lit) => f.write_str(&lit.token.literal),
            ExprLiteral::Bool(lit) => f.write_str(&lit.token.literal),
            ExprLiteral::Function(lit) => write!(f, "{lit}"),
            ExprLiteral::Array(lit) => {
                write!(f, "[")?;
                write_separated(f, &lit.elements)?;
                write!(f, "]")
            }
            ExprLiteral::Hash(lit) => {
                write!(f, "{{")?;
                for (idx, (key, value)) in lit.pairs.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitInteger {
    pub token: Token,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitString {
    pub token: Token,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitBool {
    pub token: Token,
    pub value: bool,
}

/// `fn(<parameters>) { <body> }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitFunction {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: Block,
}

impl fmt::Display for LitFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.token.literal)?;
        write_separated(f, &self.parameters)?;
        write!(f, ") {}", self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitArray {
    pub token: Token,
    pub elements: Vec<Expr>,
}

/// Pairs are kept in source order.
/// Duplicate keys are resolved at evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitHash {
    pub token: Token,
    pub pairs: Vec<(Expr, Expr)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprPrefix {
    pub token: Token,
    pub op: OpPrefix,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpPrefix {
    /// `!`
    Not,
    /// `-`
    Minus,
}

impl OpPrefix {
    pub fn from_token(token: &token::Kind) -> Option<Self> {
        match token {
            token::Kind::Bang => Some(Self::Not),
            token::Kind::Minus => Some(Self::Minus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprInfix {
    pub token: Token,
    pub op: OpInfix,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpInfix {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    Greater,
    Equal,
    NotEqual,
}

impl OpInfix {
    pub fn from_token(token: &token::Kind) -> Option<Self> {
        match token {
            token::Kind::Plus => Some(Self::Add),
            token::Kind::Minus => Some(Self::Subtract),
            token::Kind::Asterisk => Some(Self::Multiply),
            token::Kind::Slash => Some(Self::Divide),
            token::Kind::Less => Some(Self::Less),
            token::Kind::Greater => Some(Self::Greater),
            token::Kind::EqualEqual => Some(Self::Equal),
            token::Kind::BangEqual => Some(Self::NotEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

/// `if (<condition>) { <consequence> } else { <alternative> }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprIf {
    pub token: Token,
    pub condition: Box<Expr>,
    pub consequence: Block,
    pub alternative: Option<Block>,
}

/// `<function>(<arguments>)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprCall {
    /// The `(` token.
    pub token: Token,
    pub function: Box<Expr>,
    pub arguments: Vec<Expr>,
}

/// `<left>[<index>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprIndex {
    /// The `[` token.
    pub token: Token,
    pub left: Box<Expr>,
    pub index: Box<Expr>,
}

fn write_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::position::Span;

    fn ident(name: &str) -> Identifier {
        Identifier::new(Token::new(token::Kind::Identifier, name, Span::default()))
    }

    #[test]
    fn program_string() {
        let program = Program {
            statements: vec![
                StmtLet {
                    token: Token::new(
                        token::Kind::Keyword(token::Keyword::Let),
                        "let",
                        Span::default(),
                    ),
                    name: ident("myVar"),
                    value: ident("anotherVar").into(),
                }
                .into(),
            ],
        };
        assert_eq!(program.to_string(), "let myVar = anotherVar;");
        assert_eq!(program.token_literal(), "let");
    }

    #[test]
    fn empty_program() {
        let program = Program::default();
        assert_eq!(program.to_string(), "");
        assert_eq!(program.token_literal(), "");
    }

    #[test]
    fn prefix_and_infix_string() {
        let minus = Token::new(token::Kind::Minus, "-", Span::default());
        let star = Token::new(token::Kind::Asterisk, "*", Span::default());
        let expr: Expr = ExprInfix {
            token: star,
            op: OpInfix::Multiply,
            left: Box::new(
                ExprPrefix {
                    token: minus,
                    op: OpPrefix::Minus,
                    right: Box::new(ident("a").into()),
                }
                .into(),
            ),
            right: Box::new(ident("b").into()),
        }
        .into();
        assert_eq!(expr.to_string(), "((-a) * b)");
        assert_eq!(expr.token_literal(), "*");
    }

    #[test]
    fn op_from_token() {
        assert_eq!(OpInfix::from_token(&token::Kind::BangEqual), Some(OpInfix::NotEqual));
        assert_eq!(OpInfix::from_token(&token::Kind::Bang), None);
        assert_eq!(OpPrefix::from_token(&token::Kind::Bang), Some(OpPrefix::Not));
        assert_eq!(OpPrefix::from_token(&token::Kind::Plus), None);
    }
}
