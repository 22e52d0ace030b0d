//! Archive writer/reader behavior: ordering, compression policy,
//! determinism, and failure handling.

use project_bundler::archive::{
    compression_worthwhile, ArchiveReader, ArchiveWriter, MAX_COMPRESSION_RATIO,
};
use project_bundler::pipeline::Error;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Deterministic bytes that deflate cannot shrink below the ratio cutoff.
fn incompressible(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut block: [u8; 32] = Sha256::digest(b"seed").into();
    while out.len() < len {
        out.extend_from_slice(&block);
        block = Sha256::digest(block).into();
    }
    out.truncate(len);
    out
}

fn write_archive(writer: &ArchiveWriter) -> Vec<u8> {
    let mut buf = Vec::new();
    writer.write(&mut buf).expect("archive write failed");
    buf
}

#[test]
fn ratio_policy_stores_at_96_percent_and_compresses_at_80() {
    assert!(!compression_worthwhile(100, 96));
    assert!(compression_worthwhile(100, 80));
    // The cutoff itself still saves 5%, so it compresses.
    assert!(compression_worthwhile(100, 95));
    assert!(!compression_worthwhile(0, 0));
    assert!(MAX_COMPRESSION_RATIO > 0.94 && MAX_COMPRESSION_RATIO < 0.96);
}

#[test]
fn entries_keep_add_order_and_content() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.texturec"), b"texture content").unwrap();
    fs::write(dir.path().join("b.luac"), b"script content").unwrap();

    let mut writer = ArchiveWriter::new(dir.path());
    writer.add(dir.path().join("a.texturec"), false);
    writer.add(dir.path().join("b.luac"), false);
    let buf = write_archive(&writer);

    let reader = ArchiveReader::read(&mut buf.as_slice()).unwrap();
    let entries = reader.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].path, "a.texturec");
    assert_eq!(entries[1].path, "b.luac");
    assert!(!entries[0].compressed);
    assert!(!entries[1].compressed);
    assert_eq!(reader.entry_data(0).unwrap(), b"texture content");
    assert_eq!(reader.entry_data(1).unwrap(), b"script content");
}

#[test]
fn compress_hint_honors_ratio_fallback() {
    let dir = tempfile::tempdir().unwrap();
    // Repetitive content compresses far below the cutoff.
    fs::write(dir.path().join("level.datac"), vec![b'x'; 16 * 1024]).unwrap();
    // High-entropy content lands above it and must be stored raw.
    fs::write(dir.path().join("noise.binc"), incompressible(16 * 1024)).unwrap();

    let mut writer = ArchiveWriter::new(dir.path());
    writer.add(dir.path().join("level.datac"), true);
    writer.add(dir.path().join("noise.binc"), true);
    let buf = write_archive(&writer);

    let reader = ArchiveReader::read(&mut buf.as_slice()).unwrap();
    let entries = reader.entries();

    assert!(entries[0].compressed);
    assert!(entries[0].stored_size < entries[0].original_size);

    assert!(!entries[1].compressed);
    assert_eq!(entries[1].stored_size, entries[1].original_size);

    // The stored encoding still decodes to the original bytes.
    assert_eq!(reader.entry_data(0).unwrap(), vec![b'x'; 16 * 1024]);
    assert_eq!(reader.entry_data(1).unwrap(), incompressible(16 * 1024));
}

#[test]
fn serialization_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.texturec"), vec![b'a'; 4096]).unwrap();
    fs::write(dir.path().join("b.luac"), incompressible(4096)).unwrap();

    let mut writer = ArchiveWriter::new(dir.path());
    writer.add(dir.path().join("a.texturec"), true);
    writer.add(dir.path().join("b.luac"), true);

    assert_eq!(write_archive(&writer), write_archive(&writer));
}

#[test]
fn vanished_entry_source_is_a_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = ArchiveWriter::new(dir.path());
    writer.add(dir.path().join("gone.binc"), false);

    let mut buf = Vec::new();
    let err = writer.write(&mut buf).unwrap_err();
    assert!(matches!(err, Error::ArchiveSerialization { .. }));
}

#[test]
fn entry_outside_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("stray.binc"), b"stray").unwrap();

    let mut writer = ArchiveWriter::new(dir.path());
    writer.add(outside.path().join("stray.binc"), false);

    let mut buf = Vec::new();
    let err = writer.write(&mut buf).unwrap_err();
    assert!(matches!(err, Error::ArchiveSerialization { .. }));
}

#[test]
fn reader_rejects_bad_magic_and_truncation() {
    assert!(ArchiveReader::read(&mut &b"NOPE\0\0\0\x01\0\0\0\0"[..]).is_err());

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.binc"), b"payload").unwrap();
    let mut writer = ArchiveWriter::new(dir.path());
    writer.add(dir.path().join("a.binc"), false);
    let buf = write_archive(&writer);

    assert!(ArchiveReader::read(&mut &buf[..buf.len() - 3]).is_err());
}

#[test]
fn open_missing_archive_is_a_resource_error() {
    let err = ArchiveReader::open(Path::new("/no/such/game.darc")).unwrap_err();
    assert!(matches!(err, Error::ResourceIo { .. }));
}
