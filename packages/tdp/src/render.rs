use crate::tree::{Storage, TypeTree};

/// Render a [`TypeTree`] back into a C declarator string. Not required to
/// reproduce the exact input text byte-for-byte (qualifier order, spacing);
/// only to be a valid, equivalent declaration. Used by the metadata
/// generator to emit a human-readable `description` alongside the parsed
/// tree, and by the thunk generator when it needs to spell out a type it
/// only knows as a `TypeTree`.
pub fn render(tree: &TypeTree) -> String {
    match tree {
        TypeTree::Type { name, inner } => {
            let (base, decl) = split(inner, name.clone());
            join(base, decl)
        }
        other => {
            let (base, decl) = split(other, String::new());
            join(base, decl)
        }
    }
}

fn join(base: String, decl: String) -> String {
    if decl.is_empty() {
        base
    } else {
        format!("{base} {decl}")
    }
}

fn qualifiers_str(storage: &[Storage]) -> String {
    storage
        .iter()
        .map(|s| match s {
            Storage::Const => "const",
            Storage::Volatile => "volatile",
            Storage::Mutable => "mutable",
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn with_storage(base: &str, storage: &[Storage]) -> String {
    if storage.is_empty() {
        base.to_string()
    } else {
        format!("{} {base}", qualifiers_str(storage))
    }
}

fn starts_with_pointer_marker(decl: &str) -> bool {
    decl.starts_with('*') || decl.starts_with('^') || decl.starts_with('&')
}

/// Split a tree into (base type text, declarator text), recursing from the
/// outermost layer toward the base type while accumulating the declarator
/// string - the mirror image of [`crate::parse`]'s recursive descent.
fn split(tree: &TypeTree, decl: String) -> (String, String) {
    match tree {
        TypeTree::Builtin { kind, storage } => (with_storage(kind.spelling(), storage), decl),
        TypeTree::User { name, storage } => (with_storage(name, storage), decl),
        TypeTree::Type { name, inner } => split(inner, format!("{name}{decl}")),
        TypeTree::Pointer { nullable, reference, storage, inner } => {
            let marker = if *reference {
                "&"
            } else if !*nullable {
                "^"
            } else {
                "*"
            };
            let quals = qualifiers_str(storage);
            let new_decl = if quals.is_empty() {
                format!("{marker}{decl}")
            } else {
                format!("{marker} {quals} {decl}")
            };
            split(inner, new_decl)
        }
        TypeTree::Array { bounds, inner, .. } => {
            let bound_str = bounds.map(|b| b.to_string()).unwrap_or_default();
            let wrapped = if starts_with_pointer_marker(&decl) { format!("({decl})") } else { decl };
            split(inner, format!("{wrapped}[{bound_str}]"))
        }
        TypeTree::Function { ret, params } => {
            let wrapped = if starts_with_pointer_marker(&decl) { format!("({decl})") } else { decl };
            let params_str = params.iter().map(render).collect::<Vec<_>>().join(", ");
            split(ret, format!("{wrapped}({params_str})"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn round_trips_pointer_to_array_vs_array_of_pointers() {
        assert_eq!(render(&parse("int (*a)[3]")), "int (*a)[3]");
        assert_eq!(render(&parse("int *a[3]")), "int *a[3]");
    }

    #[test]
    fn renders_const_pointer() {
        assert_eq!(render(&parse("const char*")), "const char *");
    }

    #[test]
    fn renders_function_pointer() {
        assert_eq!(render(&parse("int (*cb)(float, void*)")), "int (*cb)(float, void *)");
    }
}
