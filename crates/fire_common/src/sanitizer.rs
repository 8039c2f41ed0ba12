//! Redaction of credentials from diagnostic output
//!
//! Error messages from the token endpoint can echo the service account email
//! or the assertion, and transport errors can include local paths. Everything
//! written to stderr passes through [`LogSanitizer`] first.

use regex::Regex;
use std::sync::OnceLock;

static PATTERNS: OnceLock<Vec<(Regex, String)>> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("redaction pattern must compile")
}

pub struct LogSanitizer {
    patterns: Vec<(Regex, String)>,
}

impl LogSanitizer {
    pub fn new() -> Self {
        let patterns = PATTERNS.get_or_init(|| {
            vec![
                (
                    compile(r"(?s)-----BEGIN [A-Z ]*PRIVATE KEY-----.*?-----END [A-Z ]*PRIVATE KEY-----"),
                    "[REDACTED PRIVATE KEY]".to_string(),
                ),
                (compile(r"(?i)(bearer\s+)[^\s,;]+"), "$1***".to_string()),
                // Google OAuth2 access tokens
                (compile(r"ya29\.[0-9A-Za-z_\-\.]+"), "ya29.***".to_string()),
                // Signed JWT assertions (header.payload.signature)
                (
                    compile(r"eyJ[0-9A-Za-z_\-]+\.[0-9A-Za-z_\-]+\.[0-9A-Za-z_\-]+"),
                    "[REDACTED JWT]".to_string(),
                ),
                (
                    compile(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
                    "***@***.***".to_string(),
                ),
                // Windows/Unix home directories: hide the user name only
                (
                    compile(r"(/home/|/Users/|C:\\Users\\)[^/\\\s]+"),
                    "$1***".to_string(),
                ),
            ]
        });

        Self {
            patterns: patterns.clone(),
        }
    }

    pub fn sanitize(&self, message: &str) -> String {
        let mut result = message.to_string();
        for (pattern, replacement) in &self.patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }
        result
    }
}

impl Default for LogSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
