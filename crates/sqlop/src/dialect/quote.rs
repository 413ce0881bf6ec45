//! Identifier quoting shared by the built-in dialects.

/// Quote `ident` with `open`/`close`, leaving already-safe input untouched.
///
/// - `*`, empty and pure-numeric input pass through.
/// - `schema.table.column` is quoted per segment; quoted segments are kept.
/// - `FUNC(name)` quotes only `name` and keeps the call text verbatim.
/// - Anything else that is not a plain identifier (spaces, operators) passes
///   through, since it is an expression rather than a name.
pub(crate) fn quote_ident(ident: &str, open: char, close: char) -> String {
    if is_passthrough(ident) {
        return ident.to_string();
    }

    if let (Some(lp), Some(rp)) = (ident.find('('), ident.rfind(')')) {
        if lp < rp {
            let inner = &ident[lp + 1..rp];
            let mut out = String::with_capacity(ident.len() + 2);
            out.push_str(&ident[..=lp]);
            out.push_str(&quote_ident(inner.trim(), open, close));
            out.push_str(&ident[rp..]);
            return out;
        }
    }

    let Some(segments) = split_segments(ident, open, close) else {
        return ident.to_string();
    };

    let mut out = String::with_capacity(ident.len() + segments.len() * 2);
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        if *seg == "*" || is_quoted(seg, open, close) {
            out.push_str(seg);
            continue;
        }
        out.push(open);
        for ch in seg.chars() {
            if ch == close {
                out.push(close);
            }
            out.push(ch);
        }
        out.push(close);
    }
    out
}

/// Quote `name` as one identifier; dots are part of the name.
pub(crate) fn quote_whole(name: &str, open: char, close: char) -> String {
    let already_quoted = split_segments(name, open, close)
        .is_some_and(|segs| segs.len() == 1 && is_quoted(segs[0], open, close));
    if is_passthrough(name) || already_quoted {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    out.push(open);
    for ch in name.chars() {
        if ch == close {
            out.push(close);
        }
        out.push(ch);
    }
    out.push(close);
    out
}

fn is_passthrough(ident: &str) -> bool {
    ident.is_empty() || ident == "*" || ident.bytes().all(|b| b.is_ascii_digit())
}

fn is_quoted(seg: &str, open: char, close: char) -> bool {
    seg.len() >= 2 && seg.starts_with(open) && seg.ends_with(close)
}

/// Split on `.` outside quoted segments.
///
/// Returns `None` when the text is not a (possibly dotted) identifier, e.g.
/// it contains whitespace or operator characters outside quotes.
fn split_segments(ident: &str, open: char, close: char) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut chars = ident.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if in_quote {
            if ch == close {
                // doubled close char is an escape
                if chars.peek().map(|&(_, c)| c) == Some(close) {
                    chars.next();
                } else {
                    in_quote = false;
                }
            }
            continue;
        }
        match ch {
            c if c == open && i == start => in_quote = true,
            '.' => {
                if i == start {
                    return None;
                }
                segments.push(&ident[start..i]);
                start = i + 1;
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' || c == '*' => {}
            // an embedded close char is part of the name and gets escaped
            c if c == close => {}
            _ => return None,
        }
    }

    if in_quote || start >= ident.len() {
        return None;
    }
    segments.push(&ident[start..]);
    Some(segments)
}
