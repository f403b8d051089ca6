//! Dependency-free SHA-256 (FIPS 180-4).
//!
//! Zero heap allocation. Supports incremental hashing: feeding the
//! same bytes through any sequence of [`Sha256State::update`] calls
//! yields the same digest as hashing them in one shot.

use super::{Digest, HashProvider, DIGEST_LEN};

/// Round constants, FIPS 180-4 section 4.2.2.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Initial hash value, FIPS 180-4 section 5.3.3.
const H0: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const BLOCK_LEN: usize = 64;

#[inline(always)]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline(always)]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline(always)]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

#[inline(always)]
fn ch(e: u32, f: u32, g: u32) -> u32 {
    (e & f) ^ ((!e) & g)
}

#[inline(always)]
fn maj(a: u32, b: u32, c: u32) -> u32 {
    (a & b) ^ (a & c) ^ (b & c)
}

/// Processes one 64-byte block, FIPS 180-4 section 6.2.2.
fn compress(state: &mut [u32; 8], block: &[u8; BLOCK_LEN]) {
    let mut w = [0u32; 64];

    for (i, chunk) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for t in 16..64 {
        w[t] = small_sigma1(w[t - 2])
            .wrapping_add(w[t - 7])
            .wrapping_add(small_sigma0(w[t - 15]))
            .wrapping_add(w[t - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for t in 0..64 {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K[t])
            .wrapping_add(w[t]);
        let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s = s.wrapping_add(v);
    }
}

/// Incremental SHA-256 context.
#[derive(Clone)]
pub struct Sha256State {
    state: [u32; 8],
    buffer: [u8; BLOCK_LEN],
    /// Total bytes fed so far.
    count: u64,
}

impl Sha256State {
    /// Starts a new hash computation.
    pub fn new() -> Self {
        Self {
            state: H0,
            buffer: [0u8; BLOCK_LEN],
            count: 0,
        }
    }

    /// Feeds more input.
    pub fn update(&mut self, mut data: &[u8]) {
        let buffered = (self.count % BLOCK_LEN as u64) as usize;
        self.count += data.len() as u64;

        if buffered > 0 {
            let need = BLOCK_LEN - buffered;
            if data.len() < need {
                self.buffer[buffered..buffered + data.len()].copy_from_slice(data);
                return;
            }
            self.buffer[buffered..].copy_from_slice(&data[..need]);
            let block = self.buffer;
            compress(&mut self.state, &block);
            data = &data[need..];
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            let mut full = [0u8; BLOCK_LEN];
            full.copy_from_slice(block);
            compress(&mut self.state, &full);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
    }

    /// Applies Merkle-Damgård padding and returns the digest.
    ///
    /// Padding is a single 0x80 byte, zeros up to byte 56 of the last
    /// block, then the message length in bits as a big-endian `u64`.
    pub fn finalize(mut self) -> Digest {
        let bit_len = self.count.wrapping_mul(8);
        let mut buffered = (self.count % BLOCK_LEN as u64) as usize;

        self.buffer[buffered] = 0x80;
        buffered += 1;

        if buffered > 56 {
            self.buffer[buffered..].fill(0);
            let block = self.buffer;
            compress(&mut self.state, &block);
            buffered = 0;
        }

        self.buffer[buffered..56].fill(0);
        self.buffer[56..].copy_from_slice(&bit_len.to_be_bytes());
        let block = self.buffer;
        compress(&mut self.state, &block);

        let mut out = [0u8; DIGEST_LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }

        // Scrub working state.
        self.state = [0; 8];
        self.buffer = [0; BLOCK_LEN];
        out
    }
}

impl Default for Sha256State {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sha256State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256State")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

/// Dependency-free SHA-256 provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompactSha256;

impl HashProvider for CompactSha256 {
    fn digest(&self, input: &[u8]) -> Digest {
        let mut state = Sha256State::new();
        state.update(input);
        state.finalize()
    }

    fn name(&self) -> &'static str {
        "compact"
    }
}
