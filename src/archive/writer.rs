//! Archive writer: ordered entries, per-entry compression policy.

use super::{
    compression_worthwhile, ARCHIVE_MAGIC, ARCHIVE_VERSION, FLAG_COMPRESSED,
};
use crate::pipeline::error::{Error, Result};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

struct PendingEntry {
    source: PathBuf,
    compress: bool,
}

struct EncodedEntry {
    path: String,
    compressed: bool,
    original_size: u64,
    digest: [u8; 32],
    stored: Vec<u8>,
}

/// Serializes build outputs into a single disk archive stream.
///
/// Entries are written in the order they were added. Entry source paths
/// must live under the writer's root directory; the stored entry path is
/// the `/`-separated path relative to that root.
///
/// The compression fallback is the writer's responsibility, not the
/// caller's: an entry added with `compress = true` is still stored raw
/// when compressing it saves less than 5%.
pub struct ArchiveWriter {
    root: PathBuf,
    entries: Vec<PendingEntry>,
}

impl ArchiveWriter {
    /// Creates a writer rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Submits one entry.
    ///
    /// `compress` is a hint: the writer compresses the entry and keeps the
    /// smaller-enough encoding, falling back to raw storage otherwise.
    pub fn add(&mut self, source: impl Into<PathBuf>, compress: bool) {
        self.entries.push(PendingEntry {
            source: source.into(),
            compress,
        });
    }

    /// Returns the number of submitted entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Serializes all submitted entries into the destination stream.
    ///
    /// Entries are read, encoded, and hashed one at a time, in add order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveSerialization`] when an entry source cannot
    /// be read (e.g. it vanished after aggregation), lies outside the
    /// writer root, or the destination stream fails.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut encoded = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            encoded.push(self.encode(entry)?);
        }

        let stream_err = |e: std::io::Error| Error::ArchiveSerialization {
            path: self.root.clone(),
            reason: format!("writing archive stream: {}", e),
        };

        out.write_all(&ARCHIVE_MAGIC).map_err(stream_err)?;
        out.write_all(&ARCHIVE_VERSION.to_be_bytes())
            .map_err(stream_err)?;
        out.write_all(&(encoded.len() as u32).to_be_bytes())
            .map_err(stream_err)?;

        for entry in &encoded {
            let path = entry.path.as_bytes();
            out.write_all(&(path.len() as u16).to_be_bytes())
                .map_err(stream_err)?;
            out.write_all(path).map_err(stream_err)?;
            let flags = if entry.compressed { FLAG_COMPRESSED } else { 0 };
            out.write_all(&[flags]).map_err(stream_err)?;
            out.write_all(&entry.original_size.to_be_bytes())
                .map_err(stream_err)?;
            out.write_all(&(entry.stored.len() as u64).to_be_bytes())
                .map_err(stream_err)?;
            out.write_all(&entry.digest).map_err(stream_err)?;
        }

        for entry in &encoded {
            out.write_all(&entry.stored).map_err(stream_err)?;
        }

        Ok(())
    }

    fn encode(&self, entry: &PendingEntry) -> Result<EncodedEntry> {
        let data = std::fs::read(&entry.source).map_err(|e| Error::ArchiveSerialization {
            path: entry.source.clone(),
            reason: format!("reading entry source: {}", e),
        })?;

        let rel = entry
            .source
            .strip_prefix(&self.root)
            .map_err(|_| Error::ArchiveSerialization {
                path: entry.source.clone(),
                reason: format!("entry source is outside archive root {:?}", self.root),
            })?;
        let path = rel.to_string_lossy().replace('\\', "/");

        let original_size = data.len() as u64;
        let digest: [u8; 32] = Sha256::digest(&data).into();

        let (stored, compressed) = if entry.compress {
            Self::try_compress(&entry.source, data)?
        } else {
            (data, false)
        };

        log::debug!(
            "archive entry `{}`: {} bytes, {}",
            path,
            original_size,
            if compressed { "compressed" } else { "stored" }
        );

        Ok(EncodedEntry {
            path,
            compressed,
            original_size,
            digest,
            stored,
        })
    }

    /// Compresses the entry and keeps whichever encoding the ratio policy
    /// picks. Returns the stored bytes and whether they are compressed.
    fn try_compress(source: &Path, data: Vec<u8>) -> Result<(Vec<u8>, bool)> {
        let compress_err = |e: std::io::Error| Error::ArchiveSerialization {
            path: source.to_path_buf(),
            reason: format!("compressing entry: {}", e),
        };

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).map_err(compress_err)?;
        let compressed = encoder.finish().map_err(compress_err)?;

        if compression_worthwhile(data.len(), compressed.len()) {
            Ok((compressed, true))
        } else {
            Ok((data, false))
        }
    }
}
