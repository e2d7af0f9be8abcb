//! Token types for the N1QL lexer.

use super::Span;

/// Reserved N1QL keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keyword {
    // Query
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Let,
    Letting,
    Order,
    Limit,
    Offset,
    Distinct,
    All,
    Raw,
    Element,
    Value,
    As,
    Asc,
    Desc,

    // Set operations
    Union,
    Intersect,
    Except,

    // Keyspace terms
    Join,
    Nest,
    Unnest,
    Inner,
    Left,
    Outer,
    On,
    Use,
    Keys,
    Key,
    Primary,

    // Data manipulation
    Insert,
    Upsert,
    Into,
    Values,
    Update,
    Set,
    Unset,
    Delete,
    Returning,

    // Data definition
    Create,
    Drop,
    Index,
    Using,
    Gsi,
    View,
    Function,
    Language,
    Inline,

    // Statement wrappers
    Explain,
    Prepare,
    Execute,

    // Operators
    And,
    Or,
    Not,
    In,
    Within,
    Between,
    Like,
    Is,
    Exists,

    // Literals
    Null,
    Missing,
    Valued,
    True,
    False,

    // Conditional and collection expressions
    Case,
    When,
    Then,
    Else,
    End,
    Any,
    Every,
    Satisfies,
    Array,
    First,
    For,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Self; 79] = [
        Self::Select,
        Self::From,
        Self::Where,
        Self::Group,
        Self::By,
        Self::Having,
        Self::Let,
        Self::Letting,
        Self::Order,
        Self::Limit,
        Self::Offset,
        Self::Distinct,
        Self::All,
        Self::Raw,
        Self::Element,
        Self::Value,
        Self::As,
        Self::Asc,
        Self::Desc,
        Self::Union,
        Self::Intersect,
        Self::Except,
        Self::Join,
        Self::Nest,
        Self::Unnest,
        Self::Inner,
        Self::Left,
        Self::Outer,
        Self::On,
        Self::Use,
        Self::Keys,
        Self::Key,
        Self::Primary,
        Self::Insert,
        Self::Upsert,
        Self::Into,
        Self::Values,
        Self::Update,
        Self::Set,
        Self::Unset,
        Self::Delete,
        Self::Returning,
        Self::Create,
        Self::Drop,
        Self::Index,
        Self::Using,
        Self::Gsi,
        Self::View,
        Self::Function,
        Self::Language,
        Self::Inline,
        Self::Explain,
        Self::Prepare,
        Self::Execute,
        Self::And,
        Self::Or,
        Self::Not,
        Self::In,
        Self::Within,
        Self::Between,
        Self::Like,
        Self::Is,
        Self::Exists,
        Self::Null,
        Self::Missing,
        Self::Valued,
        Self::True,
        Self::False,
        Self::Case,
        Self::When,
        Self::Then,
        Self::Else,
        Self::End,
        Self::Any,
        Self::Every,
        Self::Satisfies,
        Self::Array,
        Self::First,
        Self::For,
    ];

    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "BY" => Some(Self::By),
            "HAVING" => Some(Self::Having),
            "LET" => Some(Self::Let),
            "LETTING" => Some(Self::Letting),
            "ORDER" => Some(Self::Order),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "DISTINCT" => Some(Self::Distinct),
            "ALL" => Some(Self::All),
            "RAW" => Some(Self::Raw),
            "ELEMENT" => Some(Self::Element),
            "VALUE" => Some(Self::Value),
            "AS" => Some(Self::As),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            "JOIN" => Some(Self::Join),
            "NEST" => Some(Self::Nest),
            "UNNEST" => Some(Self::Unnest),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "OUTER" => Some(Self::Outer),
            "ON" => Some(Self::On),
            "USE" => Some(Self::Use),
            "KEYS" => Some(Self::Keys),
            "KEY" => Some(Self::Key),
            "PRIMARY" => Some(Self::Primary),
            "INSERT" => Some(Self::Insert),
            "UPSERT" => Some(Self::Upsert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "UNSET" => Some(Self::Unset),
            "DELETE" => Some(Self::Delete),
            "RETURNING" => Some(Self::Returning),
            "CREATE" => Some(Self::Create),
            "DROP" => Some(Self::Drop),
            "INDEX" => Some(Self::Index),
            "USING" => Some(Self::Using),
            "GSI" => Some(Self::Gsi),
            "VIEW" => Some(Self::View),
            "FUNCTION" => Some(Self::Function),
            "LANGUAGE" => Some(Self::Language),
            "INLINE" => Some(Self::Inline),
            "EXPLAIN" => Some(Self::Explain),
            "PREPARE" => Some(Self::Prepare),
            "EXECUTE" => Some(Self::Execute),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "WITHIN" => Some(Self::Within),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "IS" => Some(Self::Is),
            "EXISTS" => Some(Self::Exists),
            "NULL" => Some(Self::Null),
            "MISSING" => Some(Self::Missing),
            "VALUED" => Some(Self::Valued),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "ANY" => Some(Self::Any),
            "EVERY" => Some(Self::Every),
            "SATISFIES" => Some(Self::Satisfies),
            "ARRAY" => Some(Self::Array),
            "FIRST" => Some(Self::First),
            "FOR" => Some(Self::For),
            _ => None,
        }
    }

    /// Returns the keyword as written in queries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::By => "BY",
            Self::Having => "HAVING",
            Self::Let => "LET",
            Self::Letting => "LETTING",
            Self::Order => "ORDER",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::Raw => "RAW",
            Self::Element => "ELEMENT",
            Self::Value => "VALUE",
            Self::As => "AS",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::Join => "JOIN",
            Self::Nest => "NEST",
            Self::Unnest => "UNNEST",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Outer => "OUTER",
            Self::On => "ON",
            Self::Use => "USE",
            Self::Keys => "KEYS",
            Self::Key => "KEY",
            Self::Primary => "PRIMARY",
            Self::Insert => "INSERT",
            Self::Upsert => "UPSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Unset => "UNSET",
            Self::Delete => "DELETE",
            Self::Returning => "RETURNING",
            Self::Create => "CREATE",
            Self::Drop => "DROP",
            Self::Index => "INDEX",
            Self::Using => "USING",
            Self::Gsi => "GSI",
            Self::View => "VIEW",
            Self::Function => "FUNCTION",
            Self::Language => "LANGUAGE",
            Self::Inline => "INLINE",
            Self::Explain => "EXPLAIN",
            Self::Prepare => "PREPARE",
            Self::Execute => "EXECUTE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Within => "WITHIN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Is => "IS",
            Self::Exists => "EXISTS",
            Self::Null => "NULL",
            Self::Missing => "MISSING",
            Self::Valued => "VALUED",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Any => "ANY",
            Self::Every => "EVERY",
            Self::Satisfies => "SATISFIES",
            Self::Array => "ARRAY",
            Self::First => "FIRST",
            Self::For => "FOR",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Float literal (e.g., 3.14)
    Float(f64),
    /// String literal, single or double quoted
    String(String),

    // Identifiers and keywords
    /// Identifier (e.g., name or `quoted name`)
    Identifier(String),
    /// Case-insensitive identifier (e.g., `name`i)
    IdentifierIcase(String),
    /// A registered namespace name immediately followed by a colon.
    /// Only the lexical adapter produces this kind.
    Namespace(String),
    /// Reserved keyword
    Keyword(Keyword),

    // Parameters
    /// $name
    NamedParam(String),
    /// $1
    PositionalParam(usize),
    /// ?
    Question,

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// ==
    DoubleEq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// :
    Colon,

    // Special
    /// End of input
    Eof,
    /// Malformed token, with the scanner's description
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns the text of a plain identifier token.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}
