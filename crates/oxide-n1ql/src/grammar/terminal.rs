//! Terminal symbols of the N1QL grammar.
//!
//! Terminal ids are dense: the fixed symbols come first, keywords follow in
//! [`Keyword::ALL`] order. Rule definitions refer to terminals by the upper
//! case names returned from [`Terminal::name`].

use crate::lexer::{Keyword, TokenKind};

/// Number of non-keyword terminals.
const FIXED_COUNT: usize = 35;

/// A grammar terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// End of input (`$end`)
    End,
    /// The recovery pseudo-terminal (`error`)
    Error,
    /// A malformed token; no rule mentions it
    Illegal,
    Str,
    Int,
    Num,
    Ident,
    IdentIcase,
    Namespace,
    NamedParam,
    PositionalParam,
    NextParam,
    Plus,
    Minus,
    Star,
    Div,
    Mod,
    Eq,
    Deq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Concat,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
    Semi,
    Keyword(Keyword),
}

impl Terminal {
    /// Every non-keyword terminal, in id order.
    const FIXED: [Self; FIXED_COUNT] = [
        Self::End,
        Self::Error,
        Self::Illegal,
        Self::Str,
        Self::Int,
        Self::Num,
        Self::Ident,
        Self::IdentIcase,
        Self::Namespace,
        Self::NamedParam,
        Self::PositionalParam,
        Self::NextParam,
        Self::Plus,
        Self::Minus,
        Self::Star,
        Self::Div,
        Self::Mod,
        Self::Eq,
        Self::Deq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::Concat,
        Self::LParen,
        Self::RParen,
        Self::LBrace,
        Self::RBrace,
        Self::LBracket,
        Self::RBracket,
        Self::Comma,
        Self::Colon,
        Self::Dot,
        Self::Semi,
    ];

    /// Total number of terminals.
    pub const COUNT: usize = FIXED_COUNT + Keyword::ALL.len();

    /// Classifies a scanned token.
    #[must_use]
    pub const fn of(kind: &TokenKind) -> Self {
        match kind {
            TokenKind::Integer(_) => Self::Int,
            TokenKind::Float(_) => Self::Num,
            TokenKind::String(_) => Self::Str,
            TokenKind::Identifier(_) => Self::Ident,
            TokenKind::IdentifierIcase(_) => Self::IdentIcase,
            TokenKind::Namespace(_) => Self::Namespace,
            TokenKind::Keyword(kw) => Self::Keyword(*kw),
            TokenKind::NamedParam(_) => Self::NamedParam,
            TokenKind::PositionalParam(_) => Self::PositionalParam,
            TokenKind::Question => Self::NextParam,
            TokenKind::Plus => Self::Plus,
            TokenKind::Minus => Self::Minus,
            TokenKind::Star => Self::Star,
            TokenKind::Slash => Self::Div,
            TokenKind::Percent => Self::Mod,
            TokenKind::Eq => Self::Eq,
            TokenKind::DoubleEq => Self::Deq,
            TokenKind::NotEq => Self::Ne,
            TokenKind::Lt => Self::Lt,
            TokenKind::LtEq => Self::Le,
            TokenKind::Gt => Self::Gt,
            TokenKind::GtEq => Self::Ge,
            TokenKind::Concat => Self::Concat,
            TokenKind::LeftParen => Self::LParen,
            TokenKind::RightParen => Self::RParen,
            TokenKind::LeftBrace => Self::LBrace,
            TokenKind::RightBrace => Self::RBrace,
            TokenKind::LeftBracket => Self::LBracket,
            TokenKind::RightBracket => Self::RBracket,
            TokenKind::Comma => Self::Comma,
            TokenKind::Semicolon => Self::Semi,
            TokenKind::Dot => Self::Dot,
            TokenKind::Colon => Self::Colon,
            TokenKind::Eof => Self::End,
            TokenKind::Error(_) => Self::Illegal,
        }
    }

    /// Dense id used to index the parse tables.
    #[must_use]
    pub const fn id(self) -> usize {
        match self {
            Self::Keyword(kw) => FIXED_COUNT + kw as usize,
            Self::End => 0,
            Self::Error => 1,
            Self::Illegal => 2,
            Self::Str => 3,
            Self::Int => 4,
            Self::Num => 5,
            Self::Ident => 6,
            Self::IdentIcase => 7,
            Self::Namespace => 8,
            Self::NamedParam => 9,
            Self::PositionalParam => 10,
            Self::NextParam => 11,
            Self::Plus => 12,
            Self::Minus => 13,
            Self::Star => 14,
            Self::Div => 15,
            Self::Mod => 16,
            Self::Eq => 17,
            Self::Deq => 18,
            Self::Ne => 19,
            Self::Lt => 20,
            Self::Le => 21,
            Self::Gt => 22,
            Self::Ge => 23,
            Self::Concat => 24,
            Self::LParen => 25,
            Self::RParen => 26,
            Self::LBrace => 27,
            Self::RBrace => 28,
            Self::LBracket => 29,
            Self::RBracket => 30,
            Self::Comma => 31,
            Self::Colon => 32,
            Self::Dot => 33,
            Self::Semi => 34,
        }
    }

    /// Inverse of [`Terminal::id`].
    #[must_use]
    pub fn from_id(id: usize) -> Option<Self> {
        if id < FIXED_COUNT {
            Some(Self::FIXED[id])
        } else {
            Keyword::ALL.get(id - FIXED_COUNT).copied().map(Self::Keyword)
        }
    }

    /// Name used in grammar rules and parser traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Keyword(kw) => kw.as_str(),
            Self::End => "$end",
            Self::Error => "error",
            Self::Illegal => "ILLEGAL",
            Self::Str => "STR",
            Self::Int => "INT",
            Self::Num => "NUM",
            Self::Ident => "IDENT",
            Self::IdentIcase => "IDENT_ICASE",
            Self::Namespace => "NAMESPACE_ID",
            Self::NamedParam => "NAMED_PARAM",
            Self::PositionalParam => "POSITIONAL_PARAM",
            Self::NextParam => "NEXT_PARAM",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Eq => "EQ",
            Self::Deq => "DEQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Concat => "CONCAT",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::LBracket => "LBRACKET",
            Self::RBracket => "RBRACKET",
            Self::Comma => "COMMA",
            Self::Colon => "COLON",
            Self::Dot => "DOT",
            Self::Semi => "SEMI",
        }
    }

    /// Names of all terminals, indexed by id.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        (0..Self::COUNT)
            .filter_map(Self::from_id)
            .map(Self::name)
            .collect()
    }
}
