//! Token generation and hashing.
//!
//! A [`Token`] is the bearer secret handed to the client. Only its
//! [`TokenHash`] ever reaches the store, so a leaked database cannot be
//! replayed as credentials.

use std::fmt;

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a token (64 hex characters once encoded).
pub const TOKEN_BYTES: usize = 32;

/// Raw bearer token as issued to the client.
///
/// `Debug` is redacted so tokens do not end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// The token text, as sent in the cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Hex-encoded digest of a [`Token`]; the storage key of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenHash(String);

impl TokenHash {
    /// The hex digest, as stored in `token_hash`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the hash, returning the hex digest.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for TokenHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Source of random bytes for token generation.
pub trait RandomSource: Send + Sync {
    /// Fills `dest` with random bytes. Failure of the source is fatal.
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::rngs::OsRng.fill_bytes(dest);
    }
}

/// Maps a token to the digest used as its storage key.
pub trait TokenHasher: Send + Sync {
    /// Digest of `token`; equal tokens always give equal hashes.
    fn hash(&self, token: &str) -> TokenHash;
}

/// SHA-256 over the UTF-8 bytes of the token, lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl TokenHasher for Sha256Hasher {
    fn hash(&self, token: &str) -> TokenHash {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        TokenHash(hex::encode(hasher.finalize()))
    }
}

/// Draws [`TOKEN_BYTES`] from `source` and hex-encodes them.
pub fn generate(source: &dyn RandomSource) -> Token {
    let mut bytes = [0u8; TOKEN_BYTES];
    source.fill_bytes(&mut bytes);
    Token(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u8);

    impl RandomSource for Fixed {
        fn fill_bytes(&self, dest: &mut [u8]) {
            dest.fill(self.0);
        }
    }

    #[test]
    fn generated_tokens_are_64_lowercase_hex() {
        let token = generate(&OsRandom);
        assert_eq!(token.as_str().len(), 64);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn generation_uses_injected_source() {
        let token = generate(&Fixed(0xab));
        assert_eq!(token.as_str(), "ab".repeat(32));
    }

    #[test]
    fn independent_tokens_differ() {
        assert_ne!(generate(&OsRandom), generate(&OsRandom));
    }

    #[test]
    fn sha256_matches_known_digest() {
        let hash = Sha256Hasher.hash("abc");
        assert_eq!(
            hash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hashing_is_deterministic_and_distinguishes_tokens() {
        let t1 = generate(&OsRandom);
        let t2 = generate(&OsRandom);

        assert_eq!(Sha256Hasher.hash(t1.as_str()), Sha256Hasher.hash(t1.as_str()));
        assert_ne!(Sha256Hasher.hash(t1.as_str()), Sha256Hasher.hash(t2.as_str()));
        assert_eq!(Sha256Hasher.hash(t1.as_str()).as_str().len(), 64);
    }

    #[test]
    fn debug_does_not_leak_token() {
        let token = Token::from("super-secret");
        assert_eq!(format!("{token:?}"), "Token(<redacted>)");
    }
}
