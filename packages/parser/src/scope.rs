/// Which declarations are legal at the current nesting point (spec §4.1,
/// §9 "dynamic dispatch in the parser"). The real grammar only needs a
/// handful of distinct production sets, so this is a closed enum pushed and
/// popped on a stack rather than a table of boxed closures - the "current
/// content parser" slot the design note describes, specialised to the few
/// shapes this grammar actually needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    TopLevel,
    ClassBody { class_name: Option<String> },
    NamespaceBody,
    ExternCBody,
}
