//! SHA-256 digests for content-addressed comparison.
//!
//! Digests here are fingerprints used to compare generated secrets,
//! never for confidentiality. Two realizations produce identical
//! output and are picked when the auditor is built:
//!
//! - [`LibrarySha256`]: the `sha2` crate.
//! - [`CompactSha256`]: a dependency-free FIPS 180-4 implementation for
//!   freestanding targets.

mod compact;
mod library;

pub use compact::{CompactSha256, Sha256State};
pub use library::LibrarySha256;

/// Size of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Length of a hex-encoded digest, without terminator.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// A 32-byte digest.
pub type Digest = [u8; DIGEST_LEN];

/// A fixed 32-byte hash function.
pub trait HashProvider {
    /// Hashes `input` in one shot.
    fn digest(&self, input: &[u8]) -> Digest;

    /// Backend name, used in logs.
    fn name(&self) -> &'static str;
}

impl<H: HashProvider + ?Sized> HashProvider for &H {
    fn digest(&self, input: &[u8]) -> Digest {
        (**self).digest(input)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Renders a digest as 64 lowercase hex characters.
pub fn to_hex(digest: &Digest) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut out = String::with_capacity(DIGEST_HEX_LEN);
    for &b in digest {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}
