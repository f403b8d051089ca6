//! SHA-256 through the `sha2` crate.

use super::{Digest, HashProvider, DIGEST_LEN};
use sha2::{Digest as _, Sha256};

/// Library-backed SHA-256.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibrarySha256;

impl HashProvider for LibrarySha256 {
    fn digest(&self, input: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(input);
        let result = hasher.finalize();

        let mut data = [0u8; DIGEST_LEN];
        data.copy_from_slice(&result);
        data
    }

    fn name(&self) -> &'static str {
        "sha2"
    }
}
