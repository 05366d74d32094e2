#![forbid(unsafe_code)]

//! Session configuration.
//!
//! [`SessionConfig`] is built with `Default` plus `with_*` setters and checked
//! by [`SessionConfig::validate`] before a session starts.
//!
//! ```
//! use ambi_runtime::config::SessionConfig;
//!
//! let config = SessionConfig::default()
//!     .with_prompt("find>")
//!     .with_vocabulary(["robot", "robber"])
//!     .with_max_sequence_len(4);
//! assert!(config.validate().is_ok());
//! ```

use ambi_core::input_decoder::DEFAULT_MAX_SEQUENCE_LEN;
use thiserror::Error;

/// Default prompt label.
pub const DEFAULT_PROMPT: &str = "ambi>";

/// Largest accepted escape-sequence bound.
pub const MAX_SEQUENCE_LEN_LIMIT: usize = 32;

/// Invalid [`SessionConfig`] field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_sequence_len` outside `1..=32`.
    #[error("max sequence length {0} out of range (1..={max})", max = MAX_SEQUENCE_LEN_LIMIT)]
    SequenceLength(usize),
    /// The prompt would corrupt the display.
    #[error("prompt contains control character {0:?}")]
    PromptControl(char),
    /// A vocabulary word would corrupt the completion list.
    #[error("vocabulary word {word:?} contains control character {control:?}")]
    VocabularyControl { word: String, control: char },
}

/// Everything a [`TerminalSession`](crate::session::TerminalSession) needs
/// besides its I/O handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Text shown before the query.
    pub prompt: String,
    /// Words inserted into the trie at session start.
    pub vocabulary: Vec<String>,
    /// Escape-sequence framing bound in bytes.
    pub max_sequence_len: usize,
    /// Insert each non-empty submission into the trie.
    pub learn_submissions: bool,
    /// Emit SGR colors.
    pub styled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            vocabulary: Vec::new(),
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
            learn_submissions: false,
            styled: true,
        }
    }
}

impl SessionConfig {
    /// Set the prompt label.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the seed vocabulary.
    #[must_use]
    pub fn with_vocabulary<I, S>(mut self, vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = vocabulary.into_iter().map(Into::into).collect();
        self
    }

    /// Set the escape-sequence framing bound.
    #[must_use]
    pub fn with_max_sequence_len(mut self, len: usize) -> Self {
        self.max_sequence_len = len;
        self
    }

    /// Enable or disable learning from submissions.
    #[must_use]
    pub fn with_learn_submissions(mut self, learn: bool) -> Self {
        self.learn_submissions = learn;
        self
    }

    /// Enable or disable colors.
    #[must_use]
    pub fn with_styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SEQUENCE_LEN_LIMIT).contains(&self.max_sequence_len) {
            return Err(ConfigError::SequenceLength(self.max_sequence_len));
        }
        if let Some(c) = self.prompt.chars().find(|c| c.is_control()) {
            return Err(ConfigError::PromptControl(c));
        }
        for word in &self.vocabulary {
            if let Some(control) = word.chars().find(|c| c.is_control()) {
                return Err(ConfigError::VocabularyControl {
                    word: word.clone(),
                    control,
                });
            }
        }
        Ok(())
    }
}
