//! Software fallbacks for the traits in [`crate::traits`], built from real
//! RustCrypto primitives. This is what a hosted/test build links against;
//! a hardware build would instead tunnel through the SBI trampolines this
//! crate's traits stand in for.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use sha2::{Digest, Sha256};

use crate::traits::{AccelBridge, BackingMedium, PageCipher, PageHasher};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// [`PageHasher`] backed by SHA-256.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl PageHasher for Sha256Hasher {
    fn hash(&self, chunks: &[&[u8]]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        hasher.finalize().into()
    }
}

/// [`PageCipher`] backed by AES-256 in CTR mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aes256CtrCipher;

impl PageCipher for Aes256CtrCipher {
    fn encrypt(&self, key: &[u8; 32], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
        let mut buf = plaintext.to_vec();
        Aes256Ctr::new(key.into(), iv.into()).apply_keystream(&mut buf);
        buf
    }

    fn decrypt(&self, key: &[u8; 32], iv: &[u8; 16], ciphertext: &[u8]) -> Vec<u8> {
        // CTR mode is its own inverse.
        self.encrypt(key, iv, ciphertext)
    }
}

/// A [`BackingMedium`] that hands out pages from a plain in-process byte
/// arena, standing in for the real untrusted backing region.
pub struct InMemoryBackingMedium {
    page_size: usize,
    region: Vec<u8>,
    next_offset: usize,
}

impl InMemoryBackingMedium {
    pub fn new(page_size: usize, num_pages: usize) -> Self {
        Self { page_size, region: vec![0u8; page_size * num_pages], next_offset: 0 }
    }

    pub fn page_size(&self) -> usize { self.page_size }
}

impl BackingMedium for InMemoryBackingMedium {
    fn alloc_backing_page(&mut self) -> Option<u64> {
        if self.next_offset + self.page_size > self.region.len() {
            return None;
        }
        let addr = self.next_offset as u64;
        self.next_offset += self.page_size;
        Some(addr)
    }
}

/// An [`AccelBridge`] with no actual accelerator: it performs the
/// encrypt/hash (or decrypt/hash) steps unfused, by calling the software
/// hasher and cipher directly. This mirrors the `#ifndef USE_HPME` branch of
/// the reference pager.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareAccel {
    hasher: Sha256Hasher,
    cipher: Aes256CtrCipher,
    key: [u8; 32],
}

impl SoftwareAccel {
    pub fn new(key: [u8; 32]) -> Self { Self { hasher: Sha256Hasher, cipher: Aes256CtrCipher, key } }

    fn iv_for(ctr: u64) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[8..].copy_from_slice(&ctr.to_le_bytes());
        iv
    }
}

impl AccelBridge for SoftwareAccel {
    fn hpme_enc(&mut self, plaintext: &[u8], ctr: u64) -> (Vec<u8>, [u8; 32]) {
        let hash = self.hasher.hash(&[plaintext, &ctr.to_le_bytes()]);
        let ciphertext = self.cipher.encrypt(&self.key, &Self::iv_for(ctr), plaintext);
        (ciphertext, hash)
    }

    fn hpme_dec(&mut self, ciphertext: &[u8], ctr: u64) -> (Vec<u8>, [u8; 32]) {
        let plaintext = self.cipher.decrypt(&self.key, &Self::iv_for(ctr), ciphertext);
        let hash = self.hasher.hash(&[&plaintext, &ctr.to_le_bytes()]);
        (plaintext, hash)
    }

    fn hpme_enc_swap(
        &mut self,
        new_plain: &[u8],
        old_ciphertext: &[u8],
        ctr_new: u64,
        ctr_old: u64,
    ) -> (Vec<u8>, [u8; 32], Vec<u8>, [u8; 32]) {
        let (new_ciphertext, new_hash) = self.hpme_enc(new_plain, ctr_new);
        let (old_plain, old_hash) = self.hpme_dec(old_ciphertext, ctr_old);
        (new_ciphertext, new_hash, old_plain, old_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctr_round_trip() {
        let cipher = Aes256CtrCipher;
        let key = [7u8; 32];
        let iv = [0u8; 16];
        let plaintext = vec![0xABu8; 4096];
        let ciphertext = cipher.encrypt(&key, &iv, &plaintext);
        assert_ne!(ciphertext, plaintext);
        assert_eq!(cipher.decrypt(&key, &iv, &ciphertext), plaintext);
    }

    #[test]
    fn hash_is_deterministic_and_counter_bound() {
        let hasher = Sha256Hasher;
        let page = vec![1u8; 64];
        let h1 = hasher.hash(&[&page, &1u64.to_le_bytes()]);
        let h2 = hasher.hash(&[&page, &1u64.to_le_bytes()]);
        let h3 = hasher.hash(&[&page, &2u64.to_le_bytes()]);
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn in_memory_backing_exhausts() {
        let mut medium = InMemoryBackingMedium::new(4096, 2);
        assert!(medium.alloc_backing_page().is_some());
        assert!(medium.alloc_backing_page().is_some());
        assert!(medium.alloc_backing_page().is_none());
    }
}
