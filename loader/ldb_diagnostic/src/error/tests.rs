use pretty_assertions::assert_eq;

use super::*;

#[test]
fn overflow_message_names_value_and_domain() {
    let err = LoadError::overflow("3000000000", "INTEGER");
    assert_eq!(err.to_string(), "value 3000000000 overflows INTEGER");
    assert_eq!(err.code(), ErrorCode::L1002);
    assert!(!err.is_fatal());
}

#[test]
fn context_is_attached_once() {
    let err = LoadError::new(LoadErrorKind::NullNotAllowed)
        .with_attribute("salary")
        .with_line(7)
        .with_attribute("other")
        .with_line(9);
    assert_eq!(err.attribute.as_deref(), Some("salary"));
    assert_eq!(err.line, Some(7));
}

#[test]
fn fatal_kinds() {
    assert!(LoadError::store("disk full").is_fatal());
    assert!(LoadError::from(LoadErrorKind::UnknownClassId { id: 4 }).is_fatal());
    assert!(!LoadError::from(LoadErrorKind::NestedSet).is_fatal());
    assert_eq!(
        LoadError::domain_conflict("date", "INTEGER").to_string(),
        "cannot assign date value to INTEGER attribute"
    );
}
