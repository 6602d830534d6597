//! DOT output helpers for rendering translated methods with Graphviz.

/// Escapes a string for use inside a quoted DOT label.
///
/// Record-label metacharacters are escaped as well, since statements such as
/// `$heap<A.f>[r0] := 1` would otherwise be parsed as ports.
///
/// # Examples
///
/// ```rust
/// use cfglift::utils::escape_dot;
///
/// assert_eq!(escape_dot("$heap<A.f>"), "$heap\\<A.f\\>");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            '<' | '>' | '{' | '}' | '|' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
