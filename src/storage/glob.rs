//! File discovery globs
//!
//! `*` matches within one path segment, `**` crosses segments and `?`
//! matches a single non-separator character.

use crate::error::{Error, Result};
use regex::Regex;

/// A compiled glob over `/`-separated relative keys
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
    list_prefix: String,
}

impl GlobPattern {
    /// Compile a glob pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(Error::glob(pattern, "pattern is empty"));
        }

        let mut expr = String::with_capacity(trimmed.len() * 2 + 2);
        expr.push('^');

        let mut chars = trimmed.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    // `**/` also matches zero directories
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        expr.push_str("(?:.*/)?");
                    } else {
                        expr.push_str(".*");
                    }
                }
                '*' => expr.push_str("[^/]*"),
                '?' => expr.push_str("[^/]"),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| Error::glob(pattern, e.to_string()))?;

        Ok(Self {
            pattern: trimmed.to_string(),
            regex,
            list_prefix: literal_dir_prefix(trimmed),
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Longest directory prefix free of wildcards, used to narrow listing
    pub fn list_prefix(&self) -> &str {
        &self.list_prefix
    }

    /// Whether a relative key matches
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

fn literal_dir_prefix(pattern: &str) -> String {
    let first_wildcard = pattern.find(['*', '?']).unwrap_or(pattern.len());
    match pattern[..first_wildcard].rfind('/') {
        Some(idx) => pattern[..idx].to_string(),
        None => String::new(),
    }
}
