//! Streaming content hashing
//!
//! Files are read through a fixed-size buffer so memory use stays bounded by
//! the chunk size regardless of file size.

use crate::config::HashAlgorithm;
use crate::error::HashError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

enum RunningDigest {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl RunningDigest {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => RunningDigest::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => RunningDigest::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            RunningDigest::Sha256(h) => h.update(chunk),
            RunningDigest::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            RunningDigest::Sha256(h) => hex::encode(h.finalize()),
            RunningDigest::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Computes lowercase hex digests of file contents
#[derive(Debug, Clone)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl ContentHasher {
    pub fn new(algorithm: HashAlgorithm, chunk_size: usize) -> Self {
        Self {
            algorithm,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash the content of the file at `path`
    ///
    /// The digest depends only on the bytes read, never on the path.
    pub fn hash(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::new(path, e))?;
        self.hash_reader(file).map_err(|e| HashError::new(path, e))
    }

    /// Hash everything readable from `reader`
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<String> {
        let mut digest = RunningDigest::new(self.algorithm);
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            digest.update(&buffer[..bytes_read]);
        }

        Ok(digest.finalize_hex())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default(), crate::config::DEFAULT_CHUNK_SIZE)
    }
}
