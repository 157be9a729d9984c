use crate::tokenizer::{tokenize, DeclTok};
use crate::tree::{Builtin, Storage, TypeTree};

/// One layer of a declarator, innermost-to-outermost order once collected.
/// Kept as data rather than closures so the recursive-descent walk stays
/// ordinary borrowed-slice code.
enum Layer {
    Pointer { nullable: bool, reference: bool, storage: Vec<Storage> },
    Array { bounds: Option<u64>, storage: Vec<Storage> },
    Function { params: Vec<TypeTree> },
}

enum DeferredWrap {
    NonNullPointer,
    Reference,
}

const QUALIFIERS: &[&str] = &["const", "volatile", "mutable"];
const BUILTIN_WORDS: &[&str] =
    &["void", "bool", "char", "short", "int", "long", "float", "double", "signed", "unsigned"];

fn is_qualifier(w: &str) -> bool {
    QUALIFIERS.contains(&w)
}

fn storage_of(w: &str) -> Storage {
    match w {
        "const" => Storage::Const,
        "volatile" => Storage::Volatile,
        _ => Storage::Mutable,
    }
}

/// Parse a single C-style declaration (a field's declarator, a cast target,
/// a function signature fragment, ...) into a [`TypeTree`].
///
/// Grammar sketch: `[qualifiers] [^/& deferred] <base-type> <declarator>`,
/// where `<declarator>` is the usual C "spiral rule" grammar of prefix
/// pointers, parenthesised groups, and trailing `[]`/`()` suffixes.
pub fn parse(text: &str) -> TypeTree {
    let toks = tokenize(text);
    let mut pos = 0;
    parse_from(&toks, &mut pos)
}

fn parse_from(toks: &[DeclTok], pos: &mut usize) -> TypeTree {
    let mut leading_storage = Vec::new();
    let mut deferred: Vec<DeferredWrap> = Vec::new();

    loop {
        match toks.get(*pos) {
            Some(DeclTok::Ident(w)) if is_qualifier(w) => {
                leading_storage.push(storage_of(w));
                *pos += 1;
            }
            Some(DeclTok::Caret) => {
                deferred.push(DeferredWrap::NonNullPointer);
                *pos += 1;
            }
            Some(DeclTok::Amp) => {
                deferred.push(DeferredWrap::Reference);
                *pos += 1;
            }
            _ => break,
        }
    }

    let mut base = if let Some(kind) = try_consume_builtin(toks, pos) {
        TypeTree::Builtin { kind, storage: leading_storage }
    } else if let Some(DeclTok::Ident(name)) = toks.get(*pos).cloned() {
        *pos += 1;
        TypeTree::User { name, storage: leading_storage }
    } else {
        // Malformed/empty input: don't panic, fall back to an opaque type.
        TypeTree::Builtin { kind: Builtin::Void, storage: leading_storage }
    };

    // Qualifiers written after the base ("char const") bind to it too.
    loop {
        match toks.get(*pos) {
            Some(DeclTok::Ident(w)) if is_qualifier(w) => {
                let s = storage_of(w);
                match &mut base {
                    TypeTree::Builtin { storage, .. } | TypeTree::User { storage, .. } => storage.push(s),
                    _ => {}
                }
                *pos += 1;
            }
            _ => break,
        }
    }

    let (name, layers) = parse_declarator(toks, pos);
    let mut result = apply_layers(base, layers);

    for w in deferred.into_iter().rev() {
        result = match w {
            DeferredWrap::NonNullPointer => TypeTree::Pointer {
                nullable: false,
                reference: false,
                storage: Vec::new(),
                inner: Box::new(result),
            },
            DeferredWrap::Reference => TypeTree::Pointer {
                nullable: true,
                reference: true,
                storage: Vec::new(),
                inner: Box::new(result),
            },
        };
    }

    match name {
        Some(n) => TypeTree::Type { name: n, inner: Box::new(result) },
        None => result,
    }
}

fn try_consume_builtin(toks: &[DeclTok], pos: &mut usize) -> Option<Builtin> {
    let start = *pos;
    let mut words = Vec::new();
    while let Some(DeclTok::Ident(w)) = toks.get(*pos) {
        if BUILTIN_WORDS.contains(&w.as_str()) {
            words.push(w.clone());
            *pos += 1;
        } else {
            break;
        }
    }
    if words.is_empty() {
        return None;
    }
    let mut key = words.clone();
    if key.len() > 1 && key.last().map(String::as_str) == Some("int") {
        key.pop();
    }
    let joined = key.join(" ");
    let kind = match joined.as_str() {
        "void" => Builtin::Void,
        "bool" => Builtin::Bool,
        "char" => Builtin::Char,
        "signed char" => Builtin::SignedChar,
        "unsigned char" => Builtin::UnsignedChar,
        "short" | "signed short" => Builtin::Short,
        "unsigned short" => Builtin::UnsignedShort,
        "int" | "signed" | "signed int" => Builtin::Int,
        "unsigned" | "unsigned int" => Builtin::UnsignedInt,
        "long" | "signed long" => Builtin::Long,
        "unsigned long" => Builtin::UnsignedLong,
        "long long" | "signed long long" => Builtin::LongLong,
        "unsigned long long" => Builtin::UnsignedLongLong,
        "float" => Builtin::Float,
        "double" => Builtin::Double,
        "long double" => Builtin::LongDouble,
        _ => {
            *pos = start;
            return None;
        }
    };
    Some(kind)
}

fn consume_pointer_quals(toks: &[DeclTok], pos: &mut usize, reference: bool, nullable: bool) -> Layer {
    let mut storage = Vec::new();
    while let Some(DeclTok::Ident(w)) = toks.get(*pos) {
        if is_qualifier(w) {
            storage.push(storage_of(w));
            *pos += 1;
        } else {
            break;
        }
    }
    Layer::Pointer { nullable, reference, storage }
}

/// The C declarator grammar: zero or more prefix pointers, then either a
/// bare name or a parenthesised sub-declarator, then zero or more trailing
/// `[bound]`/`(params)` suffixes. Suffixes bind tighter than prefixes
/// ("spiral rule"): `*a[3]` is an array of pointers, `(*a)[3]` is a pointer
/// to an array.
fn parse_declarator(toks: &[DeclTok], pos: &mut usize) -> (Option<String>, Vec<Layer>) {
    let mut own_pointers = Vec::new();
    loop {
        match toks.get(*pos) {
            Some(DeclTok::Star) => {
                *pos += 1;
                own_pointers.push(consume_pointer_quals(toks, pos, false, true));
            }
            Some(DeclTok::Caret) => {
                *pos += 1;
                own_pointers.push(consume_pointer_quals(toks, pos, false, false));
            }
            Some(DeclTok::Amp) => {
                *pos += 1;
                own_pointers.push(consume_pointer_quals(toks, pos, true, true));
            }
            _ => break,
        }
    }

    let (name, inner_layers) = if matches!(toks.get(*pos), Some(DeclTok::LParen)) {
        *pos += 1;
        let (n, layers) = parse_declarator(toks, pos);
        if matches!(toks.get(*pos), Some(DeclTok::RParen)) {
            *pos += 1;
        }
        (n, layers)
    } else if let Some(DeclTok::Ident(name)) = toks.get(*pos).cloned() {
        *pos += 1;
        (Some(name), Vec::new())
    } else {
        (None, Vec::new())
    };

    let mut suffixes = Vec::new();
    loop {
        match toks.get(*pos) {
            Some(DeclTok::LBracket) => {
                *pos += 1;
                let bound = if let Some(DeclTok::Number(n)) = toks.get(*pos) {
                    let n = *n;
                    *pos += 1;
                    Some(n)
                } else {
                    None
                };
                if matches!(toks.get(*pos), Some(DeclTok::RBracket)) {
                    *pos += 1;
                }
                suffixes.push(Layer::Array { bounds: bound, storage: Vec::new() });
            }
            Some(DeclTok::LParen) => {
                *pos += 1;
                let mut params = Vec::new();
                if !matches!(toks.get(*pos), Some(DeclTok::RParen)) {
                    loop {
                        params.push(parse_from(toks, pos));
                        match toks.get(*pos) {
                            Some(DeclTok::Comma) => {
                                *pos += 1;
                            }
                            _ => break,
                        }
                    }
                }
                if matches!(toks.get(*pos), Some(DeclTok::RParen)) {
                    *pos += 1;
                }
                suffixes.push(Layer::Function { params });
            }
            _ => break,
        }
    }

    let mut layers = own_pointers;
    layers.extend(suffixes);
    layers.extend(inner_layers);
    (name, layers)
}

fn apply_layers(base: TypeTree, layers: Vec<Layer>) -> TypeTree {
    let mut t = base;
    for l in layers {
        t = match l {
            Layer::Pointer { nullable, reference, storage } => {
                TypeTree::Pointer { nullable, reference, storage, inner: Box::new(t) }
            }
            Layer::Array { bounds, storage } => TypeTree::Array { bounds, storage, inner: Box::new(t) },
            Layer::Function { params } => TypeTree::Function { ret: Box::new(t), params },
        };
    }
    t
}
