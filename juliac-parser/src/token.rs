//! Token definitions for the juliac lexer.

use logos::Logos;

/// Tokens of the juliac source language.
///
/// This is a closed, small set (unlike a general-purpose language lexer)
/// because the source language itself is a small procedural subset:
/// integers, doubles, booleans, strings, functions, conditionals, loops,
/// and print.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // ---- keywords ----
    #[token("function")]
    KwFunction,
    #[token("main")]
    KwMain,
    #[token("end")]
    KwEnd,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("while")]
    KwWhile,
    #[token("return")]
    KwReturn,
    #[token("println")]
    KwPrintln,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,

    // ---- literals / identifiers ----
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    #[regex(r"[0-9]+")]
    IntegerNumber,
    #[regex(r"[0-9]+\.[0-9]+")]
    FloatNumber,
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    // ---- punctuation ----
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("::")]
    DoubleColon,
    #[token(";")]
    Semicolon,

    // ---- operators ----
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
}

impl Token {
    /// Human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::KwFunction => "'function'",
            Token::KwMain => "'main'",
            Token::KwEnd => "'end'",
            Token::KwIf => "'if'",
            Token::KwElse => "'else'",
            Token::KwWhile => "'while'",
            Token::KwReturn => "'return'",
            Token::KwPrintln => "'println'",
            Token::KwTrue => "'true'",
            Token::KwFalse => "'false'",
            Token::Identifier => "identifier",
            Token::IntegerNumber => "integer literal",
            Token::FloatNumber => "float literal",
            Token::StringLiteral => "string literal",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::Comma => "','",
            Token::DoubleColon => "'::'",
            Token::Semicolon => "';'",
            Token::Eq => "'='",
            Token::EqEq => "'=='",
            Token::NotEq => "'!='",
            Token::LtEq => "'<='",
            Token::GtEq => "'>='",
            Token::Lt => "'<'",
            Token::Gt => "'>'",
            Token::AndAnd => "'&&'",
            Token::OrOr => "'||'",
            Token::Bang => "'!'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Percent => "'%'",
        }
    }
}

/// Precedence levels for binary expressions, lowest first.
///
/// `||`/`&&` bind loosest, comparisons next, then additive, then
/// multiplicative — the usual arithmetic convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    Comparison,
    Additive,
    Multiplicative,
}

impl Token {
    /// Binary operator precedence, if this token can start an infix
    /// operator.
    pub fn binary_precedence(&self) -> Option<Precedence> {
        use Precedence::*;
        Some(match self {
            Token::OrOr => Or,
            Token::AndAnd => And,
            Token::EqEq | Token::NotEq | Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => {
                Comparison
            }
            Token::Plus | Token::Minus => Additive,
            Token::Star | Token::Slash | Token::Percent => Multiplicative,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_identifiers() {
        let mut lex = Token::lexer("function main end foobar");
        assert_eq!(lex.next(), Some(Ok(Token::KwFunction)));
        assert_eq!(lex.next(), Some(Ok(Token::KwMain)));
        assert_eq!(lex.next(), Some(Ok(Token::KwEnd)));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier)));
    }

    #[test]
    fn lexes_numbers_and_strings() {
        let mut lex = Token::lexer(r#"42 3.5 "hi""#);
        assert_eq!(lex.next(), Some(Ok(Token::IntegerNumber)));
        assert_eq!(lex.next(), Some(Ok(Token::FloatNumber)));
        assert_eq!(lex.next(), Some(Ok(Token::StringLiteral)));
    }

    #[test]
    fn skips_comments() {
        let mut lex = Token::lexer("# a comment\n42");
        assert_eq!(lex.next(), Some(Ok(Token::IntegerNumber)));
    }

    #[test]
    fn binary_precedence_orders_operators() {
        assert!(Token::Star.binary_precedence() > Token::Plus.binary_precedence());
        assert!(Token::Plus.binary_precedence() > Token::EqEq.binary_precedence());
        assert!(Token::EqEq.binary_precedence() > Token::AndAnd.binary_precedence());
        assert!(Token::AndAnd.binary_precedence() > Token::OrOr.binary_precedence());
    }
}
