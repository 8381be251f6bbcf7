//! `${VAR}` placeholders in config files.
//!
//! `${VAR:-fallback}` uses `fallback` when `VAR` is unset, so a config can
//! default `creator_id` while still reading the token from the environment.
//! Placeholders that resolve to nothing are kept verbatim and reported.

/// Result of expanding one config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub text: String,
    /// Variables that were neither set nor given a fallback.
    pub unresolved: Vec<String>,
}

/// Expand placeholders from the process environment.
pub fn substitute_env(input: &str) -> Expanded {
    substitute_with(input, |name| std::env::var(name).ok())
}

fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> Expanded {
    let mut text = String::with_capacity(input.len());
    let mut unresolved = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        text.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let Some(end) = body.find('}') else {
            // Unterminated, keep the remainder as written.
            text.push_str(&rest[start..]);
            return Expanded { text, unresolved };
        };

        let placeholder = &body[..end];
        let (name, fallback) = match placeholder.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (placeholder, None),
        };

        if !is_var_name(name) {
            text.push_str(&rest[start..start + end + 3]);
        } else if let Some(value) = lookup(name).or_else(|| fallback.map(str::to_string)) {
            text.push_str(&value);
        } else {
            text.push_str(&rest[start..start + end + 3]);
            if !unresolved.iter().any(|seen| seen == name) {
                unresolved.push(name.to_string());
            }
        }
        rest = &body[end + 1..];
    }

    text.push_str(rest);
    Expanded { text, unresolved }
}

fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
