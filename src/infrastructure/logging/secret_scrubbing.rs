use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SCRUBBER: LazyLock<SecretScrubber> = LazyLock::new(SecretScrubber::new);

/// Scrub a message with the shared scrubber.
pub fn scrub_secrets(message: &str) -> String {
    SCRUBBER.scrub_message(message)
}

/// Redacts provider credentials from text before it reaches a log line or
/// the terminal.
#[derive(Clone)]
pub struct SecretScrubber {
    google_key_pattern: Regex,
    openai_key_pattern: Regex,
    query_key_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
    password_pattern: Regex,
}

impl SecretScrubber {
    pub fn new() -> Self {
        Self {
            // Google API keys: AIza...
            google_key_pattern: Regex::new(r"AIza[0-9A-Za-z_\-]{10,}").expect("static regex"),
            // OpenAI style keys: sk-..., sk-proj-...
            openai_key_pattern: Regex::new(r"\bsk-[a-zA-Z0-9_\-]{16,}").expect("static regex"),
            // ?key=... / &key=... in request URLs
            query_key_pattern: Regex::new(r"([?&]key=)[^&\s]+").expect("static regex"),
            token_pattern: Regex::new(
                r#"["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*["']?([a-zA-Z0-9\-_\.]{20,})["']?"#,
            )
            .expect("static regex"),
            bearer_pattern: Regex::new(r"Bearer\s+[a-zA-Z0-9\-_\.]+").expect("static regex"),
            password_pattern: Regex::new(r#"["']?password["']?\s*[:=]\s*["']?([^"'\s,}]+)["']?"#)
                .expect("static regex"),
        }
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let mut scrubbed = self
            .query_key_pattern
            .replace_all(message, "${1}[REDACTED]")
            .to_string();
        scrubbed = self
            .google_key_pattern
            .replace_all(&scrubbed, "[API_KEY_REDACTED]")
            .to_string();
        scrubbed = self
            .openai_key_pattern
            .replace_all(&scrubbed, "[API_KEY_REDACTED]")
            .to_string();
        scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .token_pattern
            .replace_all(&scrubbed, |caps: &regex::Captures| {
                let full_match = &caps[0];
                if let Some(colon_pos) = full_match.find(':') {
                    format!("{}:[REDACTED]", &full_match[..colon_pos])
                } else if let Some(eq_pos) = full_match.find('=') {
                    format!("{}=[REDACTED]", &full_match[..eq_pos])
                } else {
                    "[REDACTED]".to_string()
                }
            })
            .to_string();
        self.password_pattern
            .replace_all(&scrubbed, "password=[REDACTED]")
            .to_string()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
