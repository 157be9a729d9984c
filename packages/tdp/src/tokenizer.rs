/// The token alphabet a type description is broken into. This is
/// deliberately much smaller than the header lexer's: a type description is
/// a short, self-contained string (a field's declarator text, a cast
/// target, ...), not a whole translation unit, so there is no need for
/// comments, preprocessor directives or line tracking here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclTok {
    Ident(String),
    Number(u64),
    Star,
    Caret,
    Amp,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

pub fn tokenize(text: &str) -> Vec<DeclTok> {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut out = Vec::new();
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => i += 1,
            b'*' => {
                out.push(DeclTok::Star);
                i += 1;
            }
            b'^' => {
                out.push(DeclTok::Caret);
                i += 1;
            }
            b'&' => {
                out.push(DeclTok::Amp);
                i += 1;
            }
            b'(' => {
                out.push(DeclTok::LParen);
                i += 1;
            }
            b')' => {
                out.push(DeclTok::RParen);
                i += 1;
            }
            b'[' => {
                out.push(DeclTok::LBracket);
                i += 1;
            }
            b']' => {
                out.push(DeclTok::RBracket);
                i += 1;
            }
            b',' => {
                out.push(DeclTok::Comma);
                i += 1;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let n: u64 = text[start..i].parse().unwrap_or(0);
                out.push(DeclTok::Number(n));
            }
            _ if b == b'_' || b.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                out.push(DeclTok::Ident(text[start..i].to_string()));
            }
            _ => {
                // Unknown byte: skip it rather than failing outright, mirroring
                // the header lexer's "always make progress" fallback.
                i += 1;
            }
        }
    }
    out
}
