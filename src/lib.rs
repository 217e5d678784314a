pub mod charset;
pub mod entropy;
mod error;
pub mod passphrase;
pub mod password;
pub mod random;
pub mod username;
pub mod wordlist;

pub use charset::CharClasses;
pub use entropy::{EntropyResult, Strength, estimate_passphrase_entropy, estimate_password_entropy};
pub use error::Error;
pub use passphrase::{PassphraseOptions, generate_passphrase, generate_passphrase_cached};
pub use password::{GenerationOptions, Mode, generate_password};
pub use random::{Keystream, RandomSource};
pub use username::{Style, UsernameOptions, generate_username};
pub use wordlist::{EMOJI, Memo, WORDLIST};

/// Result type for the library.
pub type Result<T> = std::result::Result<T, Error>;
