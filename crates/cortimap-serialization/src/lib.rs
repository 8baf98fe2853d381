// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! # Cortimap Projection Cache Serialization
//!
//! Persists the pair of sparse operators a mapper is built from, so later runs can skip
//! the projection build entirely.
//!
//! ## Design Goals
//! - **Verbatim**: values, indices, pointers and shapes round-trip bit-identically
//! - **Compact**: optional LZ4 compression
//! - **Checked**: magic number, format version and payload checksum are verified on load
//!
//! ## Usage
//! ```ignore
//! use cortimap_serialization::{load_cache, save_cache, ProjectionCache};
//!
//! let cache = ProjectionCache::from_operators(&operators, &shape);
//! save_cache(&cache, "S1_identity_pointnn.mapcache", true)?;
//! let (operators, shape) = load_cache("S1_identity_pointnn.mapcache")?.into_operators()?;
//! ```
//!
//! Writes go straight to the target path. Concurrent writers of the same file are not
//! coordinated; a torn write surfaces as a load error on the next read.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use cortimap_structures::CortimapDataError;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod format;

pub use format::ProjectionCache;

/// Cache I/O errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: u32,
        expected_version: u32,
    },

    #[error("Invalid magic number: expected CMAP, got {0:?}")]
    InvalidMagic([u8; 4]),

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Invalid operator in cache: {0}")]
    InvalidOperator(#[from] CortimapDataError),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Magic number for cache files: "CMAP"
const MAGIC: &[u8; 4] = b"CMAP";

/// Current format version (increment when format changes)
const FORMAT_VERSION: u32 = 1;

/// Flag bit 0: payload is LZ4 compressed
const FLAG_COMPRESSED: u8 = 1;

/// Encode a cache into its on-disk byte representation
///
/// # Format
/// ```text
/// [Header]
/// - Magic: "CMAP" (4 bytes)
/// - Version: u32 (4 bytes)
/// - Flags: u8 (1 byte) - bit 0: compressed
/// - Uncompressed Size: u64 (8 bytes, payload size before compression)
/// - Checksum: u64 (8 bytes, FNV-1a of the stored payload)
/// [Data]
/// - Bincode-serialized ProjectionCache (optionally LZ4 compressed)
/// ```
pub fn encode_cache(cache: &ProjectionCache, compress: bool) -> Result<Vec<u8>> {
    let data = bincode::serialize(cache).map_err(|e| CacheError::Serialization(e.to_string()))?;
    let uncompressed_size = data.len() as u64;

    let (payload, flags) = if compress {
        compress_payload(data)?
    } else {
        (data, 0u8)
    };

    let mut bytes = Vec::with_capacity(MAGIC.len() + 21 + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.push(flags);
    bytes.extend_from_slice(&uncompressed_size.to_le_bytes());
    bytes.extend_from_slice(&calculate_checksum(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

#[cfg(feature = "compression")]
fn compress_payload(data: Vec<u8>) -> Result<(Vec<u8>, u8)> {
    let compressed = lz4::block::compress(&data, None, false)
        .map_err(|e| CacheError::Compression(e.to_string()))?;
    Ok((compressed, FLAG_COMPRESSED))
}

#[cfg(not(feature = "compression"))]
fn compress_payload(data: Vec<u8>) -> Result<(Vec<u8>, u8)> {
    debug!("compression requested but the compression feature is disabled, writing raw payload");
    Ok((data, 0u8))
}

/// Decode a cache from bytes produced by [`encode_cache`]
pub fn decode_cache(bytes: &[u8]) -> Result<ProjectionCache> {
    let mut reader = bytes;

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(CacheError::InvalidMagic(magic));
    }

    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            file_version: version,
            expected_version: FORMAT_VERSION,
        });
    }

    let mut flags = [0u8; 1];
    reader.read_exact(&mut flags)?;
    let is_compressed = (flags[0] & FLAG_COMPRESSED) != 0;

    let mut size_bytes = [0u8; 8];
    reader.read_exact(&mut size_bytes)?;
    let uncompressed_size = u64::from_le_bytes(size_bytes);

    let mut checksum_bytes = [0u8; 8];
    reader.read_exact(&mut checksum_bytes)?;
    let expected_checksum = u64::from_le_bytes(checksum_bytes);

    // Remaining bytes are the payload
    let payload = reader;
    if calculate_checksum(payload) != expected_checksum {
        return Err(CacheError::ChecksumMismatch);
    }

    let data = if is_compressed {
        decompress_payload(payload, uncompressed_size)?
    } else {
        payload.to_vec()
    };

    bincode::deserialize(&data).map_err(|e| CacheError::Deserialization(e.to_string()))
}

#[cfg(feature = "compression")]
fn decompress_payload(payload: &[u8], uncompressed_size: u64) -> Result<Vec<u8>> {
    let size = i32::try_from(uncompressed_size).map_err(|_| {
        CacheError::Compression(format!(
            "uncompressed size {} exceeds the LZ4 block limit",
            uncompressed_size
        ))
    })?;
    lz4::block::decompress(payload, Some(size))
        .map_err(|e| CacheError::Compression(format!("Decompression failed: {}", e)))
}

#[cfg(not(feature = "compression"))]
fn decompress_payload(_payload: &[u8], _uncompressed_size: u64) -> Result<Vec<u8>> {
    Err(CacheError::Compression(
        "File is compressed but compression feature is not enabled".to_string(),
    ))
}

/// Save a projection cache to a file, overwriting any existing file
pub fn save_cache<P: AsRef<Path>>(cache: &ProjectionCache, path: P, compress: bool) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_cache(cache, compress)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote projection cache");
    Ok(())
}

/// Load a projection cache from a file
pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<ProjectionCache> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    decode_cache(&bytes)
}

/// FNV-1a hash of the payload
fn calculate_checksum(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
