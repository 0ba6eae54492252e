use pretty_assertions::assert_eq;

use super::*;
use crate::ErrorCode;

fn soft(line: u32, message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::L1002)
        .with_line(line)
        .with_message(message)
}

#[test]
fn test_soft_errors_suppressed_after_hard() {
    let mut queue = DiagnosticQueue::new();
    let hard = Diagnostic::error(ErrorCode::L2003)
        .with_line(1)
        .with_message("unknown class Foo");
    assert!(queue.add(hard));
    assert!(!queue.add(soft(2, "overflow")));

    let flushed = queue.flush();
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].message, "unknown class Foo");
}

#[test]
fn test_same_code_same_line_is_deduplicated() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(soft(4, "first")));
    assert!(!queue.add(soft(4, "second")));
    assert!(queue.add(soft(5, "third")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_limit_bounds_retention_not_counting() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    for line in 1..=5 {
        queue.add(soft(line, "overflow"));
    }
    assert!(queue.limit_reached());
    assert_eq!(queue.error_count(), 5);
    assert_eq!(queue.peek().count(), 2);
}

#[test]
fn test_warnings_counted_separately() {
    let mut queue = DiagnosticQueue::new();
    queue.add(Diagnostic::warning(ErrorCode::W1001).with_message("ignored class"));
    assert_eq!(queue.error_count(), 0);
    assert_eq!(queue.warning_count(), 1);
    assert!(!queue.has_hard_error());
}
