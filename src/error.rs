use thiserror::Error;

/// Errors raised by the generators.
///
/// Retry loops that run out of attempts are not errors: the generators keep
/// the last candidate and carry on.
#[derive(Debug, Error)]
pub enum Error {
    /// The operating system could not provide secure random bytes.
    #[error("secure random number generation is not available: {0}")]
    RandomUnavailable(#[source] getrandom::Error),

    /// The caller asked for something that cannot be generated.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The wordlist is empty or has fewer distinct words than requested.
    #[error("wordlist unavailable: {available} word(s) loaded, {required} required")]
    WordlistUnavailable { available: usize, required: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
