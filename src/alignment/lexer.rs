//! Lexer for alignment strings using logos
//!
//! Alignment values arrive either as separate words (`"bottom"`, `"left"`)
//! or as one comma/whitespace separated string (`"bottom, left"`).

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r,]+")]
pub enum Token {
    #[token("top")]
    Top,
    #[token("bottom")]
    Bottom,
    #[token("left")]
    Left,
    #[token("right")]
    Right,
    #[token("center")]
    Center,

    /// Anything else; degrades to `center` during resolution
    #[regex(r"[^ \t\n\r,]+")]
    Unknown,
}

/// Lex an alignment string into tokens. Input is matched case-insensitively.
pub fn lex(source: &str) -> Vec<Token> {
    let lowered = source.to_ascii_lowercase();
    Token::lexer(&lowered)
        .map(|result| result.unwrap_or(Token::Unknown))
        .collect()
}

/// First token of a single candidate word, `None` when the candidate is empty
pub fn first_token(candidate: &str) -> Option<Token> {
    lex(candidate).into_iter().next()
}
