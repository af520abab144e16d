//! Scrubbing of credentials from strings bound for logs.
//!
//! Request URLs carry the API key as a query parameter and error payloads may
//! echo it back, so everything logged by the client passes through
//! [`redact_secrets`] first.

use std::borrow::Cow;

/// Query-style keys whose values are replaced.
const SENSITIVE_KEYS: &[&str] = &["api_key", "api_sig", "sk", "token", "secret", "password"];

const REDACTED: &str = "[REDACTED]";

/// Replace the values of sensitive `key=value` pairs and any `user:pass@`
/// URL credentials.
///
/// # Examples
/// ```
/// use nowplaying_core::redact::redact_secrets;
///
/// let url = "https://ws.audioscrobbler.com/2.0/?method=user.getInfo&api_key=abc123&format=json";
/// let output = redact_secrets(url);
/// assert!(!output.contains("abc123"));
/// assert!(output.contains("format=json"));
/// ```
pub fn redact_secrets(input: &str) -> Cow<'_, str> {
    let mut result = Cow::Borrowed(input);

    if let Some(redacted) = redact_url_credentials(&result) {
        result = Cow::Owned(redacted);
    }

    for key in SENSITIVE_KEYS {
        if find_key(&result, key).is_some() {
            result = Cow::Owned(redact_key_values(&result, key));
        }
    }

    result
}

fn redact_url_credentials(input: &str) -> Option<String> {
    for scheme in ["https://", "http://"] {
        let Some(start) = input.find(scheme) else {
            continue;
        };
        let authority_start = start + scheme.len();
        let after_scheme = &input[authority_start..];
        let authority_end = after_scheme.find(['/', '?', ' ']).unwrap_or(after_scheme.len());
        let authority = &after_scheme[..authority_end];
        if let Some(at_pos) = authority.rfind('@') {
            if let Some(colon_pos) = authority[..at_pos].find(':') {
                return Some(format!(
                    "{}{}:{}{}",
                    &input[..authority_start],
                    &authority[..colon_pos],
                    REDACTED,
                    &after_scheme[at_pos..]
                ));
            }
        }
    }
    None
}

/// Position of `key=` where `key` starts at a parameter boundary, so `sk=`
/// does not match inside `task=`.
fn find_key(input: &str, key: &str) -> Option<usize> {
    let needle = format!("{key}=");
    let mut offset = 0;
    while let Some(pos) = input[offset..].find(&needle) {
        let absolute = offset + pos;
        let at_boundary = input[..absolute]
            .chars()
            .next_back()
            .map_or(true, |c| matches!(c, '?' | '&' | ' ' | '"' | '\'' | '\n' | '{' | ','));
        if at_boundary {
            return Some(absolute);
        }
        offset = absolute + needle.len();
    }
    None
}

fn redact_key_values(input: &str, key: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;

    while let Some(pos) = find_key(remaining, key) {
        let value_start = pos + key.len() + 1;
        result.push_str(&remaining[..value_start]);
        result.push_str(REDACTED);

        let after = &remaining[value_start..];
        let end = after
            .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | '\'' | ','))
            .unwrap_or(after.len());
        remaining = &after[end..];
    }

    result.push_str(remaining);
    result
}
