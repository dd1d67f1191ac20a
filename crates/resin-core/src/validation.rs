//! # Validation Results
//!
//! [`ValidationResult`] is the value type every field validator produces:
//! pass/fail plus an ordered list of human-readable messages. A failed
//! result with several messages yields one field error per message when
//! the decoder records it.

/// Outcome of running one field validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    messages: Vec<String>,
}

impl ValidationResult {
    /// A passing result with no messages.
    pub fn ok() -> Self {
        Self {
            valid: true,
            messages: Vec::new(),
        }
    }

    /// A failing result carrying a single message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            messages: vec![message.into()],
        }
    }

    /// A failing result carrying several messages, in order.
    ///
    /// An empty message list still fails; the decoder substitutes a
    /// generic detail when a validator declines to explain itself.
    pub fn fail_all(messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            valid: false,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the validated value passed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The messages, in the order the validator produced them.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Fold another result into this one: the merge passes only when both
    /// passed, and messages concatenate in order.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.valid = self.valid && other.valid;
        self.messages.extend(other.messages);
        self
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}
