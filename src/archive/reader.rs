//! Archive reader: index parsing and entry extraction.

use super::{ARCHIVE_MAGIC, ARCHIVE_VERSION, FLAG_COMPRESSED};
use crate::pipeline::error::{Error, Result};
use flate2::read::DeflateDecoder;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// One entry of a disk archive index.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry path relative to the archive root, `/`-separated.
    pub path: String,

    /// Whether the entry blob is deflate-compressed.
    pub compressed: bool,

    /// Size of the original content in bytes.
    pub original_size: u64,

    /// Size of the stored blob in bytes.
    pub stored_size: u64,

    /// SHA-256 digest of the original content.
    pub digest: [u8; 32],
}

/// Parses a disk archive produced by
/// [`ArchiveWriter`](super::ArchiveWriter).
#[derive(Debug)]
pub struct ArchiveReader {
    entries: Vec<ArchiveEntry>,
    blobs: Vec<Vec<u8>>,
}

impl ArchiveReader {
    /// Reads a full archive from a stream.
    ///
    /// # Errors
    ///
    /// Fails when the magic bytes or format version don't match, or the
    /// stream is truncated.
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_exact(r, &mut magic)?;
        if magic != ARCHIVE_MAGIC {
            return Err(Error::GenericError(
                "not a disk archive: bad magic bytes".to_string(),
            ));
        }
        let version = read_u32(r)?;
        if version != ARCHIVE_VERSION {
            return Err(Error::GenericError(format!(
                "unsupported archive version {} (expected {})",
                version, ARCHIVE_VERSION
            )));
        }

        let count = read_u32(r)? as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let path_len = read_u16(r)? as usize;
            let mut path = vec![0u8; path_len];
            read_exact(r, &mut path)?;
            let path = String::from_utf8(path)
                .map_err(|_| Error::GenericError("entry path is not valid UTF-8".to_string()))?;
            let mut flags = [0u8; 1];
            read_exact(r, &mut flags)?;
            let original_size = read_u64(r)?;
            let stored_size = read_u64(r)?;
            let mut digest = [0u8; 32];
            read_exact(r, &mut digest)?;
            entries.push(ArchiveEntry {
                path,
                compressed: flags[0] & FLAG_COMPRESSED != 0,
                original_size,
                stored_size,
                digest,
            });
        }

        let mut blobs = Vec::with_capacity(count);
        for entry in &entries {
            let mut blob = vec![0u8; entry.stored_size as usize];
            read_exact(r, &mut blob)?;
            blobs.push(blob);
        }

        Ok(Self { entries, blobs })
    }

    /// Opens and reads an archive file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::ResourceIo {
            action: "opening archive".to_string(),
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::read(&mut std::io::BufReader::new(file))
    }

    /// Returns the archive index in entry order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Extracts one entry's original content, decompressing and verifying
    /// its digest.
    pub fn entry_data(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| Error::GenericError(format!("no archive entry at index {}", index)))?;
        let blob = &self.blobs[index];

        let data = if entry.compressed {
            let mut data = Vec::with_capacity(entry.original_size as usize);
            DeflateDecoder::new(blob.as_slice())
                .read_to_end(&mut data)
                .map_err(|e| {
                    Error::GenericError(format!("decompressing entry `{}`: {}", entry.path, e))
                })?;
            data
        } else {
            blob.clone()
        };

        let digest: [u8; 32] = Sha256::digest(&data).into();
        if digest != entry.digest {
            return Err(Error::GenericError(format!(
                "digest mismatch for entry `{}`",
                entry.path
            )));
        }
        Ok(data)
    }
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    r.read_exact(buf)
        .map_err(|e| Error::GenericError(format!("truncated archive: {}", e)))
}

fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_exact(r, &mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_be_bytes(buf))
}
