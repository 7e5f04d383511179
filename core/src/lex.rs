use crate::{
    position::{BytePos, Span},
    token::{self, Token},
};
use std::iter;

/// Collect every token in `src`, including the terminating [`token::Kind::Eof`].
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all, fields(src = %src.as_ref())))]
pub fn tokenize(src: impl AsRef<str>) -> Vec<Token> {
    let mut lexer = Lexer::new(src.as_ref());
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token();
        let eof = token.is(token::Kind::Eof);
        tokens.push(token);
        if eof {
            break tokens;
        }
    }
}

struct Scanner<'a> {
    /// Iterator over src characters.
    iter: iter::Peekable<iter::Enumerate<std::str::Chars<'a>>>,

    /// Position of the last character consumed.
    pos: usize,

    /// Number of characters consumed.
    consumed: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        let iter = src.chars().enumerate().peekable();
        Self {
            iter,
            pos: 0,
            consumed: 0,
        }
    }

    /// Peek at the next character without consuming it.
    pub fn peek(&mut self) -> Option<&char> {
        self.iter.peek().map(|(_, char)| char)
    }

    /// Consume the next character if it is equal to the expected one.
    pub fn next_if_eq(&mut self, expected: char) -> Option<char> {
        let (idx, char) = self.iter.next_if(|(_, char)| *char == expected)?;
        self.pos = idx;
        self.consumed = idx + 1;
        Some(char)
    }

    /// Position one past the last consumed character.
    pub fn cursor(&self) -> BytePos {
        BytePos(self.consumed)
    }
}

impl<'a> iter::Iterator for Scanner<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        let (idx, char) = self.iter.next()?;
        self.pos = idx;
        self.consumed = idx + 1;
        Some(char)
    }
}

/// Pull based lexer.
/// Each call to [`Lexer::next_token`] produces exactly one token.
pub struct Lexer<'a> {
    it: Scanner<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            it: Scanner::new(src),
        }
    }

    /// Produce the next token.
    /// Once the input is exhausted every call returns an [`token::Kind::Eof`] token.
    pub fn next_token(&mut self) -> Token {
        self.next_while(|ch| ch == ' ' || ch == '\t' || ch == '\r' || ch == '\n');
        let Some(char) = self.it.next() else {
            let end = self.it.cursor();
            return Token::new(token::Kind::Eof, "", Span::empty(end));
        };
        let pos_start = self.it.pos;

        let token = match char {
            '+' => Token::new(token::Kind::Plus, "+", Span::at(pos_start)),
            '-' => Token::new(token::Kind::Minus, "-", Span::at(pos_start)),
            '*' => Token::new(token::Kind::Asterisk, "*", Span::at(pos_start)),
            '/' => Token::new(token::Kind::Slash, "/", Span::at(pos_start)),
            '<' => Token::new(token::Kind::Less, "<", Span::at(pos_start)),
            '>' => Token::new(token::Kind::Greater, ">", Span::at(pos_start)),
            ',' => Token::new(token::Kind::Comma, ",", Span::at(pos_start)),
            ';' => Token::new(token::Kind::Semicolon, ";", Span::at(pos_start)),
            ':' => Token::new(token::Kind::Colon, ":", Span::at(pos_start)),
            '(' => Token::new(token::Kind::ParenLeft, "(", Span::at(pos_start)),
            ')' => Token::new(token::Kind::ParenRight, ")", Span::at(pos_start)),
            '{' => Token::new(token::Kind::BraceLeft, "{", Span::at(pos_start)),
            '}' => Token::new(token::Kind::BraceRight, "}", Span::at(pos_start)),
            '[' => Token::new(token::Kind::BracketLeft, "[", Span::at(pos_start)),
            ']' => Token::new(token::Kind::BracketRight, "]", Span::at(pos_start)),

            '=' => self.next_if_else(
                '=',
                (token::Kind::EqualEqual, "=="),
                (token::Kind::Assign, "="),
                pos_start,
            ),

            '!' => self.next_if_else(
                '=',
                (token::Kind::BangEqual, "!="),
                (token::Kind::Bang, "!"),
                pos_start,
            ),

            '"' => {
                // No escape sequences.
                // An unterminated string runs to the end of the input.
                let value = self.next_while(|ch| ch != '"').into_iter().collect::<String>();
                self.it.next_if_eq('"');
                Token::new(
                    token::Kind::String,
                    value,
                    Span::new(pos_start, self.it.cursor()),
                )
            }

            char if char.is_ascii_digit() => {
                let rest = self.next_while(|ch| ch.is_ascii_digit());
                let value = iter::once(char).chain(rest).collect::<String>();
                Token::new(
                    token::Kind::Int,
                    value,
                    Span::new(pos_start, self.it.cursor()),
                )
            }

            char if Self::is_valid_ident_char(&char) => {
                let rest = self.next_while(|ch| Self::is_valid_ident_char(&ch));
                let value = iter::once(char).chain(rest).collect::<String>();
                let kind = match token::Keyword::from_str(&value) {
                    Some(word) => token::Kind::Keyword(word),
                    None => token::Kind::Identifier,
                };
                Token::new(kind, value, Span::new(pos_start, self.it.cursor()))
            }

            char => Token::new(token::Kind::Illegal, char, Span::at(pos_start)),
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(kind = %token.kind, literal = %token.literal);

        token
    }

    /// Validates if the character is valid within an identifier.
    /// Valid characters are alphabetic (`a-z`, `A-Z`) and underscore (`_`).
    fn is_valid_ident_char(ch: &char) -> bool {
        ch.is_ascii_alphabetic() || *ch == '_'
    }

    fn next_if_else(
        &mut self,
        to_match: char,
        matched: (token::Kind, &'static str),
        unmatched: (token::Kind, &'static str),
        pos_start: usize,
    ) -> Token {
        let (kind, literal) = if self.it.next_if_eq(to_match).is_some() {
            matched
        } else {
            unmatched
        };
        Token::new(kind, literal, Span::new(pos_start, self.it.cursor()))
    }

    fn next_while<F>(&mut self, predicate: F) -> Vec<char>
    where
        F: Fn(char) -> bool,
    {
        let mut chars = vec![];
        while let Some(&ch) = self.it.peek() {
            if !predicate(ch) {
                break;
            }
            self.it.next();
            chars.push(ch);
        }
        chars
    }
}

/// Yields tokens up to, but excluding, end of input.
impl<'a> Iterator for Lexer<'a> {
    type Item = Token;
    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.is(token::Kind::Eof) {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use token::{Keyword, Kind};

    fn kinds(src: &str) -> Vec<(Kind, String)> {
        tokenize(src)
            .into_iter()
            .map(|token| (token.kind, token.literal))
            .collect()
    }

    #[test]
    fn tokenize_empty() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is(Kind::Eof));
        assert_eq!(tokens[0].literal, "");

        let tokens = tokenize(" \t\r\n");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is(Kind::Eof));
        assert_eq!(tokens[0].span, Span::empty(4));
    }

    #[test]
    fn tokenize_let_statement() {
        let expected = vec![
            (Kind::Keyword(Keyword::Let), "let".to_string()),
            (Kind::Identifier, "five".to_string()),
            (Kind::Assign, "=".to_string()),
            (Kind::Int, "5".to_string()),
            (Kind::Semicolon, ";".to_string()),
            (Kind::Eof, "".to_string()),
        ];
        assert_eq!(kinds("let five = 5;"), expected);
    }

    #[test]
    fn eof_is_repeated() {
        let mut lexer = Lexer::new("x");
        assert!(lexer.next_token().is(Kind::Identifier));
        for _ in 0..3 {
            let token = lexer.next_token();
            assert!(token.is(Kind::Eof));
            assert_eq!(token.span, Span::empty(1));
        }
    }

    #[test]
    fn iterator_stops_before_eof() {
        let tokens = Lexer::new("a + b").collect::<Vec<_>>();
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|token| !token.is(Kind::Eof)));
    }

    #[test]
    fn tokenize_operators() {
        let src = "=+-!*/<>==!=,;:(){}[]";
        let expected = [
            Kind::Assign,
            Kind::Plus,
            Kind::Minus,
            Kind::Bang,
            Kind::Asterisk,
            Kind::Slash,
            Kind::Less,
            Kind::Greater,
            Kind::EqualEqual,
            Kind::BangEqual,
            Kind::Comma,
            Kind::Semicolon,
            Kind::Colon,
            Kind::ParenLeft,
            Kind::ParenRight,
            Kind::BraceLeft,
            Kind::BraceRight,
            Kind::BracketLeft,
            Kind::BracketRight,
            Kind::Eof,
        ];
        let found = tokenize(src)
            .into_iter()
            .map(|token| token.kind)
            .collect::<Vec<_>>();
        assert_eq!(found, expected);
    }

    #[test]
    fn tokenize_two_char_operators() {
        let tokens = tokenize("10 == 10; 10 != 9; !x = y");
        let eq = &tokens[1];
        assert_eq!(eq.kind, Kind::EqualEqual);
        assert_eq!(eq.literal, "==");
        assert_eq!(eq.span, Span::new(3, 5));

        let neq = &tokens[5];
        assert_eq!(neq.kind, Kind::BangEqual);
        assert_eq!(neq.literal, "!=");

        assert_eq!(tokens[8].kind, Kind::Bang);
        assert_eq!(tokens[10].kind, Kind::Assign);
    }

    #[test]
    fn tokenize_keyword() {
        let reserved = [
            Keyword::Fn,
            Keyword::Let,
            Keyword::True,
            Keyword::False,
            Keyword::If,
            Keyword::Else,
            Keyword::Return,
        ];
        for word in reserved {
            let tokens = tokenize(word.as_str());
            assert_eq!(tokens.len(), 2);
            assert_eq!(tokens[0].kind, Kind::Keyword(word));
            assert_eq!(tokens[0].literal, word.as_str());
        }
    }

    #[test]
    fn tokenize_ident() {
        let tokens = tokenize("foo_bar _x letter");
        assert_eq!(tokens[0].kind, Kind::Identifier);
        assert_eq!(tokens[0].literal, "foo_bar");
        assert_eq!(tokens[1].literal, "_x");
        assert_eq!(tokens[2].kind, Kind::Identifier);
        assert_eq!(tokens[2].literal, "letter");
    }

    #[test]
    fn tokenize_ident_stops_at_digit() {
        let found = kinds("x1");
        assert_eq!(found[0], (Kind::Identifier, "x".to_string()));
        assert_eq!(found[1], (Kind::Int, "1".to_string()));
    }

    #[test]
    fn tokenize_int() {
        let tokens = tokenize("12345");
        assert_eq!(tokens[0].kind, Kind::Int);
        assert_eq!(tokens[0].literal, "12345");
        assert_eq!(tokens[0].span, Span::new(0, 5));
    }

    #[test]
    fn tokenize_string() {
        let tokens = tokenize(r#""foo bar""#);
        assert_eq!(tokens[0].kind, Kind::String);
        assert_eq!(tokens[0].literal, "foo bar");
        assert_eq!(tokens[0].span, Span::new(0, 9));

        let tokens = tokenize(r#""""#);
        assert_eq!(tokens[0].kind, Kind::String);
        assert_eq!(tokens[0].literal, "");
    }

    #[test]
    fn tokenize_string_has_no_escapes() {
        let tokens = tokenize(r#""a\nb""#);
        assert_eq!(tokens[0].literal, r"a\nb");

        let tokens = tokenize(r#""a\"b""#);
        assert_eq!(tokens[0].literal, r"a\");
        assert_eq!(tokens[1].kind, Kind::Identifier);
    }

    #[test]
    fn tokenize_string_unclosed() {
        let tokens = tokenize(r#""hello world"#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, Kind::String);
        assert_eq!(tokens[0].literal, "hello world");
        assert_eq!(tokens[0].span, Span::new(0, 12));
        assert!(tokens[1].is(Kind::Eof));
    }

    #[test]
    fn tokenize_illegal() {
        let found = kinds("@ é");
        assert_eq!(found[0], (Kind::Illegal, "@".to_string()));
        assert_eq!(found[1], (Kind::Illegal, "é".to_string()));
        assert_eq!(found[2].0, Kind::Eof);
    }

    #[test]
    fn tokenize_program() {
        let src = r#"let add = fn(x, y) {
  x + y;
};
let result = add(five, ten);
if (5 < 10) { return true; } else { return false; }
[1, 2];
{"foo": "bar"}
"#;
        let found = tokenize(src)
            .into_iter()
            .map(|token| token.kind)
            .collect::<Vec<_>>();
        let expected = [
            Kind::Keyword(Keyword::Let),
            Kind::Identifier,
            Kind::Assign,
            Kind::Keyword(Keyword::Fn),
            Kind::ParenLeft,
            Kind::Identifier,
            Kind::Comma,
            Kind::Identifier,
            Kind::ParenRight,
            Kind::BraceLeft,
            Kind::Identifier,
            Kind::Plus,
            Kind::Identifier,
            Kind::Semicolon,
            Kind::BraceRight,
            Kind::Semicolon,
            Kind::Keyword(Keyword::Let),
            Kind::Identifier,
            Kind::Assign,
            Kind::Identifier,
            Kind::ParenLeft,
            Kind::Identifier,
            Kind::Comma,
            Kind::Identifier,
            Kind::ParenRight,
            Kind::Semicolon,
            Kind::Keyword(Keyword::If),
            Kind::ParenLeft,
            Kind::Int,
            Kind::Less,
            Kind::Int,
            Kind::ParenRight,
            Kind::BraceLeft,
            Kind::Keyword(Keyword::Return),
            Kind::Keyword(Keyword::True),
            Kind::Semicolon,
            Kind::BraceRight,
            Kind::Keyword(Keyword::Else),
            Kind::BraceLeft,
            Kind::Keyword(Keyword::Return),
            Kind::Keyword(Keyword::False),
            Kind::Semicolon,
            Kind::BraceRight,
            Kind::BracketLeft,
            Kind::Int,
            Kind::Comma,
            Kind::Int,
            Kind::BracketRight,
            Kind::Semicolon,
            Kind::BraceLeft,
            Kind::String,
            Kind::Colon,
            Kind::String,
            Kind::BraceRight,
            Kind::Eof,
        ];
        assert_eq!(found, expected);
    }
}
