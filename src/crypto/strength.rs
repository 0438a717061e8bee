//! Password strength rules (OWASP guidelines).
//!
//! Run before a password is accepted for *encryption*.  Never consulted
//! while decrypting: an old journal with a weak password must still open.

use crate::errors::{JournalError, Result};

/// Tunables for [`check`].
#[derive(Debug, Clone, Copy)]
pub struct StrengthOptions {
    pub min_length: usize,
    pub max_length: usize,
    /// At or above this length a password counts as a passphrase and the
    /// character-class rules are skipped.
    pub min_phrase_length: usize,
    pub allow_passphrases: bool,
}

impl Default for StrengthOptions {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            min_phrase_length: 20,
            allow_passphrases: true,
        }
    }
}

impl StrengthOptions {
    pub fn with_min_length(min_length: usize) -> Self {
        Self {
            min_length,
            ..Self::default()
        }
    }
}

/// Return every rule the password violates.  Empty means acceptable.
///
/// Length and repetition always apply.  The character-class rules apply
/// to anything shorter than a passphrase, even when a length rule failed.
pub fn check(password: &str, options: &StrengthOptions) -> Vec<String> {
    let len = password.chars().count();
    let mut errors = Vec::new();

    if len < options.min_length {
        errors.push(format!(
            "The password must be at least {} characters long.",
            options.min_length
        ));
    }
    if len > options.max_length {
        errors.push(format!(
            "The password must be fewer than {} characters.",
            options.max_length
        ));
    }
    if has_triple_repeat(password) {
        errors.push(
            "The password may not contain sequences of three or more repeated characters."
                .to_string(),
        );
    }
    if options.allow_passphrases && len >= options.min_phrase_length {
        return errors;
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push("The password must contain at least one lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push("The password must contain at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("The password must contain at least one number.".to_string());
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        errors.push("The password must contain at least one special character.".to_string());
    }

    errors
}

/// [`check`], turned into an error when anything is violated.
pub fn ensure_strong(password: &str, options: &StrengthOptions) -> Result<()> {
    let violations = check(password, options);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(JournalError::WeakPassword(violations))
    }
}

fn has_triple_repeat(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}
