use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};

#[test]
fn report_with_fallback_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DeadRepetition, "list")
        .occurrence(1)
        .emit();

    assert_eq!(diagnostics.len(), 1);
    let d = &diagnostics.as_slice()[0];
    assert_eq!(d.message, "repetition can never consume any tokens");
    assert_eq!(d.occurrence, Some(1));
    assert!(d.is_error());
}

#[test]
fn report_with_detail_substitution() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::LeftRecursion, "expr")
        .message("expr --> term --> expr")
        .emit();

    assert_eq!(
        diagnostics.as_slice()[0].message,
        "left recursion detected: expr --> term --> expr"
    );
}

#[test]
fn only_ambiguity_kinds_are_suppressible() {
    assert!(DiagnosticKind::AmbiguousAlternatives.is_suppressible());
    assert!(DiagnosticKind::AmbiguousPrefixAlternatives.is_suppressible());
    assert!(!DiagnosticKind::LeftRecursion.is_suppressible());
    assert!(!DiagnosticKind::DeadRepetition.is_suppressible());
}

#[test]
fn rendering_names_the_owning_rule() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::AmbiguousAlternatives, "value")
        .alternatives(vec![1, 2])
        .emit();
    diagnostics
        .report(DiagnosticKind::NamespaceConflict, "")
        .message("Comma")
        .emit();

    insta::assert_snapshot!(diagnostics.render(), @r#"
    error in rule `value`: ambiguous alternatives
    error: `Comma` is used as both a rule name and a token name
    "#);
}

#[test]
fn severity_display() {
    assert_eq!(Severity::Error.to_string(), "error");
    assert_eq!(Severity::Warning.to_string(), "warning");
}
