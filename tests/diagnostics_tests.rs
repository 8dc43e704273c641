use moebius::diagnostics::{render_plain, Diagnostic};
use moebius::source::Source;

#[test]
fn line_and_column_are_one_based() {
    let source = Source::inline("ab\ncd");
    assert_eq!(source.line_col(0), (1, 1));
    assert_eq!(source.line_col(1), (1, 2));
    assert_eq!(source.line_col(3), (2, 1));
    assert_eq!(source.line_col(4), (2, 2));
}

#[test]
fn end_of_source_resolves_past_the_last_byte() {
    let source = Source::inline("ab\ncd");
    assert_eq!(source.line_col(5), (2, 3));
    // offsets beyond the buffer clamp to its end
    assert_eq!(source.line_col(100), (2, 3));
}

#[test]
fn offset_on_a_newline_belongs_to_its_line() {
    let source = Source::inline("ab\ncd");
    assert_eq!(source.line_col(2), (1, 3));
}

#[test]
fn line_at_strips_the_newline() {
    let source = Source::inline("ab\ncd\n");
    assert_eq!(source.line_at(0), b"ab");
    assert_eq!(source.line_at(4), b"cd");
    // end of source, after the trailing newline: the empty last line
    assert_eq!(source.line_at(6), b"");
}

#[test]
fn rendering_points_a_caret_at_the_offset() {
    let source = Source::inline("1 + 2\n3 +\n4");
    let diagnostic = Diagnostic::new(9, "expected an expression");
    let rendered = render_plain(&diagnostic, &source);
    let expected = "\
error: expected an expression
 --> <inline>:2:4
3 +
   ^
";
    assert_eq!(rendered, expected);
}

#[test]
fn caret_prefix_preserves_tabs() {
    let source = Source::inline("\tx = 1");
    let diagnostic = Diagnostic::new(1, "boom");
    let rendered = render_plain(&diagnostic, &source);
    let caret_line = rendered.lines().last().expect("caret line");
    assert_eq!(caret_line, "\t^");
}

#[test]
fn rendering_uses_the_file_path_when_present() {
    let path = std::env::temp_dir().join("moebius_diagnostics_test.moeb");
    std::fs::write(&path, "oops").expect("write temp file");
    let source = Source::open(&path).expect("read temp file");
    let diagnostic = Diagnostic::new(0, "boom");
    let rendered = render_plain(&diagnostic, &source);
    assert!(rendered.contains(&format!("{}:1:1", path.display())));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn opening_a_missing_file_is_an_io_error() {
    let error = Source::open("/definitely/not/a/real/path.moeb").unwrap_err();
    assert!(error.to_string().contains("failed to read"));
}

#[test]
fn caret_lands_at_end_of_a_line() {
    let source = Source::inline("1+");
    let diagnostic = Diagnostic::new(2, "expected an expression");
    let rendered = render_plain(&diagnostic, &source);
    let expected = "\
error: expected an expression
 --> <inline>:1:3
1+
  ^
";
    assert_eq!(rendered, expected);
}
