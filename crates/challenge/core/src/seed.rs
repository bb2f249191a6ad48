//! Deterministic seed derivation for challenge content.
//!
//! Challenges derive their content (expected answers, shuffles, targets) from
//! [`ChallengeMetadata`](crate::ChallengeMetadata) so that replaying the same
//! attempt reproduces the same content, while different attempts differ.
//!
//! # Determinism
//!
//! Everything here is a pure function of the bytes it is given. There is no
//! global state and no platform-dependent hashing.

use sha2::{Digest, Sha256};

/// SHA-256 of `material`, hex encoded.
pub fn digest_hex(material: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(material.as_ref()))
}

/// Stream of pseudo-random values drawn from a chain of SHA-256 digests.
///
/// Bytes are consumed in order from the current digest; once all 32 are used
/// the digest is hashed again to continue the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestStream {
    digest: [u8; 32],
    cursor: usize,
}

impl DigestStream {
    pub fn new(material: impl AsRef<[u8]>) -> Self {
        Self {
            digest: Sha256::digest(material.as_ref()).into(),
            cursor: 0,
        }
    }

    /// Next byte of the stream.
    pub fn next_byte(&mut self) -> u8 {
        if self.cursor == self.digest.len() {
            self.digest = Sha256::digest(self.digest).into();
            self.cursor = 0;
        }
        let byte = self.digest[self.cursor];
        self.cursor += 1;
        byte
    }

    /// Value in `0..bound`, or 0 when `bound` is 0.
    ///
    /// Uses a single byte, so bounds above 256 are not uniformly covered.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        u32::from(self.next_byte()) % bound
    }

    /// Next four bytes as a big-endian `u32`.
    pub fn next_u32(&mut self) -> u32 {
        let bytes = [
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
        ];
        u32::from_be_bytes(bytes)
    }
}
