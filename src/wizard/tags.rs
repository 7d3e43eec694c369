use crate::model::is_valid_email;
use std::time::{Duration, Instant};

/// How long a rejected-address message stays visible.
pub const ERROR_TTL: Duration = Duration::from_secs(3);

/// Splits a pasted blob on commas, semicolons and whitespace.
pub fn split_addresses(blob: &str) -> impl Iterator<Item = &str> {
    blob.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCommit {
    pub added: Vec<String>,
    pub rejected: Vec<String>,
}

/// Free-text input that turns addresses into tags on an owned list.
#[derive(Debug, Clone, Default)]
pub struct TagInput {
    pub text: String,
    error: Option<(String, Instant)>,
}

impl TagInput {
    /// Enter: commits whatever is typed.
    pub fn commit(&mut self, tags: &mut Vec<String>, now: Instant) -> TagCommit {
        if self.text.trim().is_empty() {
            return TagCommit::default();
        }
        let text = std::mem::take(&mut self.text);
        self.add_candidates(tags, split_addresses(&text), now)
    }

    /// Paste: the blob never lands in the text field.
    pub fn paste(&mut self, tags: &mut Vec<String>, blob: &str, now: Instant) -> TagCommit {
        self.text.clear();
        self.add_candidates(tags, split_addresses(blob), now)
    }

    /// Backspace on an empty field removes the most recent tag.
    pub fn backspace(&self, tags: &mut Vec<String>) -> Option<String> {
        if self.text.is_empty() {
            tags.pop()
        } else {
            None
        }
    }

    pub fn error(&self, now: Instant) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|(_, at)| now.duration_since(*at) < ERROR_TTL)
            .map(|(msg, _)| msg.as_str())
    }

    fn add_candidates<'a>(
        &mut self,
        tags: &mut Vec<String>,
        candidates: impl Iterator<Item = &'a str>,
        now: Instant,
    ) -> TagCommit {
        let mut commit = TagCommit::default();
        for candidate in candidates {
            if !is_valid_email(candidate) {
                commit.rejected.push(candidate.to_string());
            } else if !tags.iter().any(|t| t == candidate) {
                tags.push(candidate.to_string());
                commit.added.push(candidate.to_string());
            }
        }

        if !commit.rejected.is_empty() {
            self.error = Some((
                format!("Invalid email(s): {}", commit.rejected.join(", ")),
                now,
            ));
        }
        commit
    }
}
