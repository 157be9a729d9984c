/// Token kinds the parser depends on. Names are semantic, not syntactic -
/// see spec §6.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An identifier-like token (keyword candidates are reclassified by the
    /// lexer into their own variants; everything left over is `Thing`).
    Thing,
    StringLiteral,
    NumericLiteral,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LSquare,
    RSquare,
    LTriangle,
    RTriangle,
    Comma,
    Semicolon,
    Colon,
    DoubleColon,
    Asterisk,
    Ampersand,
    Caret,
    Equal,
    Ellipses,
    Tilde,
    Hash,

    Struct,
    Class,
    Union,
    Enum,
    Typedef,
    Namespace,
    Template,
    Const,
    Constexpr,
    Signed,
    Unsigned,
    Static,
    Extern,
    Virtual,
    Public,
    Private,
    Protected,

    PpDefine,
    PpUndef,
    PpIf,
    PpIfdef,
    PpIfndef,
    PpElif,
    PpElse,
    PpEndif,
    PpInclude,
    PpError,
    PpPragma,

    LineComment,
    BlockComment,

    Newline,
    Eof,
}

impl TokenKind {
    pub fn is_preprocessor_open(self) -> bool {
        matches!(self, Self::PpIf | Self::PpIfdef | Self::PpIfndef)
    }
}
