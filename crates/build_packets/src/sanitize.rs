//! Removes host and sandbox filesystem prefixes before values reach a display layer.
//!
//! Two layouts are recognized, most specific first:
//! - local: `<anything>/sandboxes/<token>/sessions/<token>/<rest>`
//! - container: `<anything>/sessions/<token>/<rest>`
//!
//! Tokens are opaque hex/hyphen identifier segments and must sit directly after the literal
//! marker, so directories that merely contain `sessions` in their name are left alone. Only
//! the first marker of an absolute path counts: `<rest>` may itself contain a
//! `sessions/<token>` directory and is kept as is.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Number of trailing segments kept for absolute paths outside a session root.
const KEPT_TRAILING_SEGMENTS: usize = 3;

// Lazy parent segments so the earliest marker wins.
fn sandbox_session_path_re() -> &'static Regex {
    static SANDBOX_SESSION_PATH_RE: OnceLock<Regex> = OnceLock::new();
    SANDBOX_SESSION_PATH_RE.get_or_init(|| {
        Regex::new(
            r"^(?:/[^/]*)*?/sandboxes/[0-9A-Fa-f-]+/sessions/[0-9A-Fa-f-]+(?:/(?P<rest>.*))?$",
        )
        .expect("valid sandbox session path regex")
    })
}

fn session_path_re() -> &'static Regex {
    static SESSION_PATH_RE: OnceLock<Regex> = OnceLock::new();
    SESSION_PATH_RE.get_or_init(|| {
        Regex::new(r"^(?:/[^/]*)*?/sessions/[0-9A-Fa-f-]+(?:/(?P<rest>.*))?$")
            .expect("valid session path regex")
    })
}

// The `end` group stands in for a lookahead: the token must be followed by a separator,
// a character that cannot continue an identifier, or the end of the text. A trailing `.`
// counts as punctuation only when nothing identifier-like follows it.
//
// Local host directories may contain spaces (`/Users/Jane Doe/...`), so a parent segment
// here may continue across single spaces between plain words.
fn sandbox_session_prefix_re() -> &'static Regex {
    static SANDBOX_SESSION_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    SANDBOX_SESSION_PREFIX_RE.get_or_init(|| {
        Regex::new(
            r#"(?:/[^\s/'"`]+(?: [^\s/'"`&|;<>]+)*)*?/sandboxes/[0-9A-Fa-f-]+/sessions/[0-9A-Fa-f-]+(?P<end>/|\.?(?:[^0-9A-Za-z_./-]|$))"#,
        )
        .expect("valid sandbox session prefix regex")
    })
}

fn session_prefix_re() -> &'static Regex {
    static SESSION_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    SESSION_PREFIX_RE.get_or_init(|| {
        Regex::new(
            r#"(?:/[^\s/'"`]+)*?/sessions/[0-9A-Fa-f-]+(?P<end>/|\.?(?:[^0-9A-Za-z_./-]|$))"#,
        )
        .expect("valid session prefix regex")
    })
}

/// Normalizes one structured path to a session-root-relative path.
///
/// Only absolute paths are matched against the session layouts. Relative input is treated
/// as already session-relative and returned as is, which keeps the function idempotent.
pub(crate) fn sanitize_path(path: &str) -> String {
    if !path.starts_with('/') {
        return path.to_string();
    }

    for re in [sandbox_session_path_re(), session_path_re()] {
        if let Some(caps) = re.captures(path) {
            let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
            return rest.trim_start_matches('/').to_string();
        }
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() > KEPT_TRAILING_SEGMENTS {
        return segments[segments.len() - KEPT_TRAILING_SEGMENTS..].join("/");
    }
    segments.join("/")
}

/// Strips every session-root prefix embedded in freeform text (commands, listings, error
/// strings). Text without a session-style prefix comes back unchanged.
///
/// A prefix must start a path of its own: a match glued to a preceding word, as in
/// `outputs/sessions/2024/`, belongs to a relative path and is kept.
pub(crate) fn sanitize_text(text: &str) -> String {
    let mut out = Cow::Borrowed(text);
    for re in [sandbox_session_prefix_re(), session_prefix_re()] {
        let stripped = match strip_session_roots(&out, re) {
            Cow::Owned(stripped) => Some(stripped),
            Cow::Borrowed(_) => None,
        };
        if let Some(stripped) = stripped {
            out = Cow::Owned(stripped);
        }
    }
    out.into_owned()
}

fn strip_session_roots<'t>(text: &'t str, re: &Regex) -> Cow<'t, str> {
    let mut out = String::new();
    let mut copied = 0;
    let mut from = 0;
    while let Some(caps) = re.captures_at(text, from) {
        let Some(found) = caps.get(0) else { break };
        if !starts_path(&text[..found.start()]) {
            // Every match starts with an ASCII `/`.
            from = found.start() + 1;
            continue;
        }
        out.push_str(&text[copied..found.start()]);
        match caps.name("end").map(|m| m.as_str()) {
            Some("/") | None => {}
            Some(delimiter) => out.push_str(delimiter),
        }
        copied = found.end();
        from = found.end();
    }
    if copied == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

fn starts_path(before: &str) -> bool {
    before
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_alphanumeric() || matches!(c, '.' | '_' | '-')))
}
