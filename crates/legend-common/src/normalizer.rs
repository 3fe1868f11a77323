/// Collapse every run of whitespace into a single space and trim both ends.
///
/// Page text and locator literals both go through this, so a locator typed
/// with sloppy spacing still lines up with the flattened page text.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append `fragment` to `buf` keeping single-space separation.
///
/// Leading and trailing whitespace of the fragment is significant only as a
/// word separator: `"a" + " b"` gives `"a b"`, `"a" + "b"` gives `"ab"`.
pub fn push_normalized(buf: &mut String, fragment: &str) {
    let starts_with_space = fragment.starts_with(char::is_whitespace);
    let ends_with_space = fragment.ends_with(char::is_whitespace);
    let body = normalize_whitespace(fragment);

    if body.is_empty() {
        if (starts_with_space || ends_with_space) && needs_separator(buf) {
            buf.push(' ');
        }
        return;
    }

    if starts_with_space && needs_separator(buf) {
        buf.push(' ');
    }
    buf.push_str(&body);
    if ends_with_space {
        buf.push(' ');
    }
}

fn needs_separator(buf: &str) -> bool {
    !buf.is_empty() && !buf.ends_with(' ') && !buf.ends_with('\n')
}
