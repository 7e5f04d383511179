use crate::position::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Keyword {
    Fn,
    Let,
    True,
    False,
    If,
    Else,
    Return,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Fn => "fn",
            Keyword::Let => "let",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Return => "return",
        }
    }

    /// Keywords are case sensitive.
    pub fn from_str(value: impl AsRef<str>) -> Option<Self> {
        match value.as_ref() {
            "fn" => Some(Self::Fn),
            "let" => Some(Self::Let),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "return" => Some(Self::Return),
            _ => None,
        }
    }

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        match self {
            Keyword::Fn => "FUNCTION",
            Keyword::Let => "LET",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
            Keyword::If => "IF",
            Keyword::Else => "ELSE",
            Keyword::Return => "RETURN",
        }
    }
}

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Illegal,
    Eof,

    Identifier,
    Int,
    String,

    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `!`
    Bang,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,

    Comma,
    Semicolon,
    Colon,
    ParenLeft,
    ParenRight,
    BraceLeft,
    BraceRight,
    BracketLeft,
    BracketRight,

    Keyword(Keyword),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Illegal => "ILLEGAL",
            Kind::Eof => "EOF",
            Kind::Identifier => "IDENT",
            Kind::Int => "INT",
            Kind::String => "STRING",
            Kind::Assign => "=",
            Kind::Plus => "+",
            Kind::Minus => "-",
            Kind::Bang => "!",
            Kind::Asterisk => "*",
            Kind::Slash => "/",
            Kind::Less => "<",
            Kind::Greater => ">",
            Kind::EqualEqual => "==",
            Kind::BangEqual => "!=",
            Kind::Comma => ",",
            Kind::Semicolon => ";",
            Kind::Colon => ":",
            Kind::ParenLeft => "(",
            Kind::ParenRight => ")",
            Kind::BraceLeft => "{",
            Kind::BraceRight => "}",
            Kind::BracketLeft => "[",
            Kind::BracketRight => "]",
            Kind::Keyword(word) => word.name(),
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,

    /// Exact source text matched.
    /// String literals exclude their delimeters.
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: Kind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn is(&self, kind: Kind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyword_round_trip() {
        let words = [
            Keyword::Fn,
            Keyword::Let,
            Keyword::True,
            Keyword::False,
            Keyword::If,
            Keyword::Else,
            Keyword::Return,
        ];
        for word in words {
            assert_eq!(Keyword::from_str(word.as_str()), Some(word));
        }
        assert_eq!(Keyword::from_str("Let"), None);
        assert_eq!(Keyword::from_str("function"), None);
    }

    #[test]
    fn kind_display() {
        assert_eq!(Kind::Identifier.to_string(), "IDENT");
        assert_eq!(Kind::Assign.to_string(), "=");
        assert_eq!(Kind::ParenRight.to_string(), ")");
        assert_eq!(Kind::Keyword(Keyword::Fn).to_string(), "FUNCTION");
        assert_eq!(Kind::Eof.to_string(), "EOF");
    }
}
