// Markup sanitizer. Runs before scanning so the scanner sees exactly what
// gets stored.

/// Strip unsafe HTML from user input.
///
/// Script and style elements are removed with their contents, event handler
/// attributes and `javascript:` URLs are dropped, stray `<`/`&` are escaped.
/// Harmless formatting tags survive. Never fails.
pub fn sanitize(raw: &str) -> String {
    ammonia::Builder::default()
        .link_rel(None)
        .clean(raw)
        .to_string()
}
