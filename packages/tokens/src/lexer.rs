use crate::{Token, TokenKind, TokenStream};

/// Tokenize a whole header file's source text.
///
/// This is the conventional part of the pipeline (§1: "out of scope,
/// external collaborator"), kept here only so the workspace has something
/// real to hand the parser in tests. It recognises line/block comments,
/// preprocessor directives at line start, C/C++ punctuation and keywords,
/// and folds everything else into `Thing`/literal tokens.
pub fn tokenize(src: &str) -> TokenStream {
    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0usize;
    let mut line = 1u32;
    let mut col = 1u32;
    let mut at_line_start = true;

    macro_rules! push {
        ($kind:expr, $text:expr) => {
            tokens.push(Token::new($kind, $text, line, col))
        };
    }

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c == '\n' {
            push!(TokenKind::Newline, "\n");
            i += 1;
            line += 1;
            col = 1;
            at_line_start = true;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            col += 1;
            continue;
        }
        // Line comment
        if c == '/' && bytes.get(i + 1) == Some(&b'/') {
            let start = i;
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            push!(TokenKind::LineComment, &src[start..i]);
            at_line_start = false;
            continue;
        }
        // Block comment
        if c == '/' && bytes.get(i + 1) == Some(&b'*') {
            let start = i;
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                if bytes[i] == b'\n' {
                    line += 1;
                }
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            push!(TokenKind::BlockComment, &src[start..i]);
            at_line_start = false;
            continue;
        }
        // Preprocessor directive
        if c == '#' && at_line_start {
            let start = i;
            i += 1;
            while i < bytes.len() && (bytes[i] as char).is_whitespace() && bytes[i] != b'\n' {
                i += 1;
            }
            let word_start = i;
            while i < bytes.len() && (bytes[i] as char).is_alphanumeric() {
                i += 1;
            }
            let word = &src[word_start..i];
            let kind = match word {
                "define" => TokenKind::PpDefine,
                "undef" => TokenKind::PpUndef,
                "if" => TokenKind::PpIf,
                "ifdef" => TokenKind::PpIfdef,
                "ifndef" => TokenKind::PpIfndef,
                "elif" => TokenKind::PpElif,
                "else" => TokenKind::PpElse,
                "endif" => TokenKind::PpEndif,
                "include" => TokenKind::PpInclude,
                "error" => TokenKind::PpError,
                "pragma" => TokenKind::PpPragma,
                _ => TokenKind::Hash,
            };
            if kind == TokenKind::Hash {
                // Unknown directive: emit just the `#` and reparse the rest normally.
                i = start + 1;
                push!(TokenKind::Hash, "#");
                at_line_start = false;
                continue;
            }
            // Rest of the directive line is retained verbatim as one token's text,
            // so later stages can inspect expression text without re-lexing it.
            let rest_start = i;
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            let rest = src[rest_start..i].trim();
            push!(kind, rest);
            at_line_start = false;
            continue;
        }
        at_line_start = false;

        // String literal
        if c == '"' {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            push!(TokenKind::StringLiteral, &src[start..i]);
            continue;
        }
        // Numeric literal
        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len()
                && (bytes[i] as char).is_alphanumeric()
                || bytes.get(i) == Some(&b'.')
            {
                i += 1;
            }
            push!(TokenKind::NumericLiteral, &src[start..i]);
            continue;
        }
        // Identifier / keyword
        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && ((bytes[i] as char).is_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &src[start..i];
            let kind = match word {
                "struct" => TokenKind::Struct,
                "class" => TokenKind::Class,
                "union" => TokenKind::Union,
                "enum" => TokenKind::Enum,
                "typedef" => TokenKind::Typedef,
                "namespace" => TokenKind::Namespace,
                "template" => TokenKind::Template,
                "const" => TokenKind::Const,
                "constexpr" => TokenKind::Constexpr,
                "signed" => TokenKind::Signed,
                "unsigned" => TokenKind::Unsigned,
                "static" => TokenKind::Static,
                "extern" => TokenKind::Extern,
                "virtual" => TokenKind::Virtual,
                "public" => TokenKind::Public,
                "private" => TokenKind::Private,
                "protected" => TokenKind::Protected,
                _ => TokenKind::Thing,
            };
            push!(kind, word);
            continue;
        }
        // Punctuation
        if c == ':' && bytes.get(i + 1) == Some(&b':') {
            push!(TokenKind::DoubleColon, "::");
            i += 2;
            continue;
        }
        if c == '.' && bytes.get(i + 1) == Some(&b'.') && bytes.get(i + 2) == Some(&b'.') {
            push!(TokenKind::Ellipses, "...");
            i += 3;
            continue;
        }
        let single = match c {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '[' => Some(TokenKind::LSquare),
            ']' => Some(TokenKind::RSquare),
            '<' => Some(TokenKind::LTriangle),
            '>' => Some(TokenKind::RTriangle),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            ':' => Some(TokenKind::Colon),
            '*' => Some(TokenKind::Asterisk),
            '&' => Some(TokenKind::Ampersand),
            '^' => Some(TokenKind::Caret),
            '=' => Some(TokenKind::Equal),
            '~' => Some(TokenKind::Tilde),
            _ => None,
        };
        if let Some(kind) = single {
            push!(kind, c.to_string());
            i += 1;
            continue;
        }
        // Unknown byte: keep it as a one-character `Thing` so the parser can
        // still make progress and stuff it into an unparsable-thing node.
        push!(TokenKind::Thing, c.to_string());
        i += 1;
    }
    push!(TokenKind::Eof, "");
    TokenStream::new(tokens)
}
