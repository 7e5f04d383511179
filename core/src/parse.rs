use crate::{
    ast,
    lex::Lexer,
    position::WithSpan,
    token::{self, Token},
};
use std::{mem, rc::Rc};

type Result<T> = std::result::Result<T, WithSpan<error::Kind>>;

/// Binding power of an operator, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    /// `==` `!=`
    Equals,
    /// `<` `>`
    LessGreater,
    /// `+` `-`
    Sum,
    /// `*` `/`
    Product,
    /// `!x` `-x`
    Prefix,
    /// `f(x)`
    Call,
    /// `a[x]`
    Index,
}

impl Precedence {
    /// Precedence of a token in infix position.
    /// Tokens without an infix handler bind at `Lowest`.
    pub fn of(token: &token::Kind) -> Self {
        match token {
            token::Kind::EqualEqual | token::Kind::BangEqual => Self::Equals,
            token::Kind::Less | token::Kind::Greater => Self::LessGreater,
            token::Kind::Plus | token::Kind::Minus => Self::Sum,
            token::Kind::Asterisk | token::Kind::Slash => Self::Product,
            token::Kind::ParenLeft => Self::Call,
            token::Kind::BracketLeft => Self::Index,
            _ => Self::Lowest,
        }
    }
}

/// Parse `src` into a program.
///
/// # Returns
/// All diagnostics if any statement failed to parse.
pub fn parse(src: impl AsRef<str>) -> std::result::Result<ast::Program, error::Errors> {
    let mut parser = Parser::new(Lexer::new(src.as_ref()));
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors.into())
    }
}

/// Pratt parser with one token of lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: Vec<WithSpan<error::Kind>>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: vec![],
        }
    }

    /// Diagnostics recorded so far.
    /// If non-empty the parsed program is incomplete and must not be evaluated.
    pub fn errors(&self) -> &[WithSpan<error::Kind>] {
        &self.errors
    }

    /// Consume the entire token stream.
    /// A statement that fails to parse is left out of the program,
    /// its diagnostic is recorded, and parsing resumes at the next token.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    pub fn parse_program(&mut self) -> ast::Program {
        let mut statements = vec![];
        while !self.current.is(token::Kind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%err, span = %err.span);

                    self.errors.push(err);
                }
            }
            self.advance();
        }

        ast::Program { statements }
    }
}

impl<'a> Parser<'a> {
    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.current = mem::replace(&mut self.peek, next);
    }

    /// Advance if the peek token is of the expected kind.
    fn expect_peek(&mut self, expected: token::Kind) -> Result<()> {
        if self.peek.is(expected) {
            self.advance();
            Ok(())
        } else {
            Err(WithSpan {
                value: error::Kind::UnexpectedToken {
                    expected,
                    found: self.peek.kind,
                },
                span: self.peek.span,
            })
        }
    }

    /// Consume a trailing `;` if present.
    fn skip_semicolon(&mut self) {
        if self.peek.is(token::Kind::Semicolon) {
            self.advance();
        }
    }
}

impl<'a> Parser<'a> {
    fn parse_statement(&mut self) -> Result<ast::Stmt> {
        match self.current.kind {
            token::Kind::Keyword(token::Keyword::Let) => Ok(self.parse_let()?.into()),
            token::Kind::Keyword(token::Keyword::Return) => Ok(self.parse_return()?.into()),
            _ => Ok(self.parse_expr_statement()?.into()),
        }
    }

    fn parse_let(&mut self) -> Result<ast::StmtLet> {
        let token = self.current.clone();
        self.expect_peek(token::Kind::Identifier)?;
        let name = ast::Identifier::new(self.current.clone());
        self.expect_peek(token::Kind::Assign)?;
        self.advance();
        let value = self.parse_expr(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(ast::StmtLet { token, name, value })
    }

    fn parse_return(&mut self) -> Result<ast::StmtReturn> {
        let token = self.current.clone();
        self.advance();
        let value = self.parse_expr(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(ast::StmtReturn { token, value })
    }

    fn parse_expr_statement(&mut self) -> Result<ast::StmtExpr> {
        let token = self.current.clone();
        let expr = self.parse_expr(Precedence::Lowest)?;
        self.skip_semicolon();
        Ok(ast::StmtExpr { token, expr })
    }

    /// Parse statements until the closing `}`.
    /// The current token must be the opening `{`.
    fn parse_block(&mut self) -> Result<ast::Block> {
        let token = self.current.clone();
        let mut statements = vec![];
        self.advance();
        while !self.current.is(token::Kind::BraceRight) {
            if self.current.is(token::Kind::Eof) {
                return Err(WithSpan {
                    value: error::Kind::UnexpectedToken {
                        expected: token::Kind::BraceRight,
                        found: token::Kind::Eof,
                    },
                    span: self.current.span,
                });
            }
            statements.push(self.parse_statement()?);
            self.advance();
        }

        Ok(ast::Block { token, statements })
    }
}

impl<'a> Parser<'a> {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    fn parse_expr(&mut self, precedence: Precedence) -> Result<ast::Expr> {
        let mut expr = self.parse_prefix()?;
        while !self.peek.is(token::Kind::Semicolon) && precedence < Precedence::of(&self.peek.kind)
        {
            self.advance();
            expr = self.parse_infix(expr)?;
        }
        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<ast::Expr> {
        #[cfg(feature = "tracing")]
        tracing::trace!(current = %self.current.kind);

        match self.current.kind {
            token::Kind::Identifier => Ok(ast::Identifier::new(self.current.clone()).into()),
            token::Kind::Int => Ok(ast::ExprLiteral::from(self.parse_integer()?).into()),
            token::Kind::String => {
                let token = self.current.clone();
                let value = token.literal.clone();
                Ok(ast::ExprLiteral::from(ast::LitString { token, value }).into())
            }
            token::Kind::Keyword(token::Keyword::True | token::Keyword::False) => {
                let token = self.current.clone();
                let value = token.is(token::Kind::Keyword(token::Keyword::True));
                Ok(ast::ExprLiteral::from(ast::LitBool { token, value }).into())
            }
            token::Kind::Bang | token::Kind::Minus => Ok(self.parse_prefix_op()?.into()),
            token::Kind::ParenLeft => self.parse_group(),
            token::Kind::Keyword(token::Keyword::If) => Ok(self.parse_if()?.into()),
            token::Kind::Keyword(token::Keyword::Fn) => {
                Ok(ast::ExprLiteral::from(Rc::new(self.parse_function()?)).into())
            }
            token::Kind::BracketLeft => Ok(ast::ExprLiteral::from(self.parse_array()?).into()),
            token::Kind::BraceLeft => Ok(ast::ExprLiteral::from(self.parse_hash()?).into()),
            kind => Err(WithSpan {
                value: error::Kind::NoPrefixParseFn(kind),
                span: self.current.span,
            }),
        }
    }

    /// The current token is the operator.
    fn parse_infix(&mut self, left: ast::Expr) -> Result<ast::Expr> {
        match self.current.kind {
            token::Kind::ParenLeft => Ok(self.parse_call(left)?.into()),
            token::Kind::BracketLeft => Ok(self.parse_index(left)?.into()),
            kind => {
                let Some(op) = ast::OpInfix::from_token(&kind) else {
                    unreachable!("no infix handler for `{kind}`");
                };
                let token = self.current.clone();
                let precedence = Precedence::of(&kind);
                self.advance();
                // Same precedence, not one higher, so equal operators associate left.
                let right = self.parse_expr(precedence)?;
                Ok(ast::ExprInfix {
                    token,
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
                .into())
            }
        }
    }

    fn parse_integer(&mut self) -> Result<ast::LitInteger> {
        let token = self.current.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Ok(ast::LitInteger { token, value }),
            Err(_) => Err(WithSpan {
                value: error::Kind::InvalidInteger(token.literal.clone()),
                span: token.span,
            }),
        }
    }

    fn parse_prefix_op(&mut self) -> Result<ast::ExprPrefix> {
        let token = self.current.clone();
        let Some(op) = ast::OpPrefix::from_token(&token.kind) else {
            unreachable!("invalid prefix operator `{}`", token.kind);
        };
        self.advance();
        let right = self.parse_expr(Precedence::Prefix)?;
        Ok(ast::ExprPrefix {
            token,
            op,
            right: Box::new(right),
        })
    }

    /// `( <expr> )`
    /// Grouping leaves no node of its own.
    fn parse_group(&mut self) -> Result<ast::Expr> {
        self.advance();
        let expr = self.parse_expr(Precedence::Lowest)?;
        self.expect_peek(token::Kind::ParenRight)?;
        Ok(expr)
    }

    fn parse_if(&mut self) -> Result<ast::ExprIf> {
        let token = self.current.clone();
        self.expect_peek(token::Kind::ParenLeft)?;
        self.advance();
        let condition = self.parse_expr(Precedence::Lowest)?;
        self.expect_peek(token::Kind::ParenRight)?;
        self.expect_peek(token::Kind::BraceLeft)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek.is(token::Kind::Keyword(token::Keyword::Else)) {
            self.advance();
            self.expect_peek(token::Kind::BraceLeft)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(ast::ExprIf {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function(&mut self) -> Result<ast::LitFunction> {
        let token = self.current.clone();
        self.expect_peek(token::Kind::ParenLeft)?;
        let parameters = self.parse_parameters()?;
        self.expect_peek(token::Kind::BraceLeft)?;
        let body = self.parse_block()?;
        Ok(ast::LitFunction {
            token,
            parameters,
            body,
        })
    }

    /// The current token is the opening `(`.
    fn parse_parameters(&mut self) -> Result<Vec<ast::Identifier>> {
        let mut parameters = vec![];
        if self.peek.is(token::Kind::ParenRight) {
            self.advance();
            return Ok(parameters);
        }

        self.expect_peek(token::Kind::Identifier)?;
        parameters.push(ast::Identifier::new(self.current.clone()));
        while self.peek.is(token::Kind::Comma) {
            self.advance();
            self.expect_peek(token::Kind::Identifier)?;
            parameters.push(ast::Identifier::new(self.current.clone()));
        }
        self.expect_peek(token::Kind::ParenRight)?;
        Ok(parameters)
    }

    /// Comma separated expressions up to `end`.
    /// The current token is the opening delimeter.
    fn parse_expr_list(&mut self, end: token::Kind) -> Result<Vec<ast::Expr>> {
        let mut exprs = vec![];
        if self.peek.is(end) {
            self.advance();
            return Ok(exprs);
        }

        self.advance();
        exprs.push(self.parse_expr(Precedence::Lowest)?);
        while self.peek.is(token::Kind::Comma) {
            self.advance();
            self.advance();
            exprs.push(self.parse_expr(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Ok(exprs)
    }

    fn parse_array(&mut self) -> Result<ast::LitArray> {
        let token = self.current.clone();
        let elements = self.parse_expr_list(token::Kind::BracketRight)?;
        Ok(ast::LitArray { token, elements })
    }

    /// `{ <key>: <value>, ... }`
    /// A comma must be followed by another pair.
    fn parse_hash(&mut self) -> Result<ast::LitHash> {
        let token = self.current.clone();
        let mut pairs = vec![];
        if self.peek.is(token::Kind::BraceRight) {
            self.advance();
            return Ok(ast::LitHash { token, pairs });
        }

        loop {
            self.advance();
            let key = self.parse_expr(Precedence::Lowest)?;
            self.expect_peek(token::Kind::Colon)?;
            self.advance();
            let value = self.parse_expr(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek.is(token::Kind::Comma) {
                self.advance();
            } else {
                self.expect_peek(token::Kind::BraceRight)?;
                break;
            }
        }

        Ok(ast::LitHash { token, pairs })
    }

    fn parse_call(&mut self, function: ast::Expr) -> Result<ast::ExprCall> {
        let token = self.current.clone();
        let arguments = self.parse_expr_list(token::Kind::ParenRight)?;
        Ok(ast::ExprCall {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index(&mut self, left: ast::Expr) -> Result<ast::ExprIndex> {
        let token = self.current.clone();
        self.advance();
        let index = self.parse_expr(Precedence::Lowest)?;
        self.expect_peek(token::Kind::BracketRight)?;
        Ok(ast::ExprIndex {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }
}

pub mod error {
    use crate::{position::WithSpan, token};
    use std::fmt;

    #[derive(Debug, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub enum Kind {
        /// The token can not begin an expression.
        NoPrefixParseFn(token::Kind),

        /// A required token was not found.
        UnexpectedToken {
            expected: token::Kind,
            found: token::Kind,
        },

        /// Integer literal does not fit in 64 bits.
        InvalidInteger(String),
    }

    impl fmt::Display for Kind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Kind::NoPrefixParseFn(kind) => {
                    write!(f, "no prefix parse function for {kind} found")
                }
                Kind::UnexpectedToken { expected, found } => {
                    write!(f, "expected next token to be {expected}. Got {found} instead")
                }
                Kind::InvalidInteger(literal) => write!(f, "could not parse {literal} as integer"),
            }
        }
    }

    /// Every diagnostic from a parse.
    #[derive(Debug, Clone, PartialEq, Eq, derive_more::Deref, derive_more::From)]
    pub struct Errors(Vec<WithSpan<Kind>>);

    impl Errors {
        pub fn messages(&self) -> Vec<String> {
            self.0.iter().map(|err| err.to_string()).collect()
        }
    }

    impl fmt::Display for Errors {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (idx, err) in self.0.iter().enumerate() {
                if idx > 0 {
                    writeln!(f)?;
                }
                write!(f, "{err}")?;
            }
            Ok(())
        }
    }
}
