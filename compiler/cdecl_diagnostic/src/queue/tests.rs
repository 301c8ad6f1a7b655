use super::*;
use pretty_assertions::assert_eq;

fn error_at(start: u32, message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(message)
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn flush_sorts_by_position() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(error_at(30, "c"));
    queue.add(error_at(10, "a"));
    queue.add(error_at(20, "b"));

    let messages: Vec<String> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["a", "b", "c"]);
}

#[test]
fn flush_clears_state() {
    let mut queue = DiagnosticQueue::new();
    queue.add(error_at(0, "x"));
    assert!(queue.has_errors());

    let _ = queue.flush();
    assert!(!queue.has_errors());
    assert_eq!(queue.peek().count(), 0);
}

#[test]
fn duplicates_are_dropped() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(error_at(5, "same")));
    assert!(!queue.add(error_at(5, "same")));
    assert!(queue.add(error_at(6, "same")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn error_limit_truncates_and_reports() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    assert!(queue.add(error_at(1, "one")));
    assert!(queue.add(error_at(2, "two")));
    assert!(queue.limit_reached());
    assert!(!queue.add(error_at(3, "three")));

    let flushed = queue.flush();
    assert_eq!(flushed.len(), 3);
    assert_eq!(flushed[2].code, ErrorCode::E9001);
}

#[test]
fn warnings_do_not_count_toward_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
    });
    queue.add(error_at(1, "one"));
    assert!(queue.add(Diagnostic::warning(ErrorCode::W0001).with_message("still shown")));
    assert_eq!(queue.error_count(), 1);
}
