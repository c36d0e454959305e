//! Whole-file helpers.
//!
//! Files are read into memory in one go; the codec works on byte slices.

use std::fs;
use std::path::Path;

use log::info;

use crate::codec::{Header, ReadOptions, decode_document, decode_document_with, encode_document};
use crate::error::{Error, Result};
use crate::model::Document;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::IoFailure {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads and decodes a file with default limits.
pub fn read_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(io_error(path))?;
    info!("read {} ({} bytes)", path.display(), data.len());
    decode_document(&data)
}

/// Reads and decodes a file, see [`decode_document_with`].
pub fn read_file_with<F>(path: impl AsRef<Path>, options: &ReadOptions, inspect: F) -> Result<Document>
where
    F: FnOnce(&Header) -> Result<()>,
{
    let path = path.as_ref();
    let data = fs::read(path).map_err(io_error(path))?;
    info!("read {} ({} bytes)", path.display(), data.len());
    decode_document_with(&data, options, inspect)
}

/// Encodes a document and writes it to `path`, replacing any existing
/// file. Nothing is written if encoding fails.
pub fn write_file(path: impl AsRef<Path>, document: &Document) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_document(document)?;
    fs::write(path, &bytes).map_err(io_error(path))?;
    info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

impl Document {
    /// Shorthand for [`read_file`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        read_file(path)
    }

    /// Shorthand for [`write_file`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_file(path, self)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::ErrorKind;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fbx-io-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_save_and_open() {
        let mut doc = Document::new(7300);
        let root = doc.create_record("FBXHeaderExtension", None).unwrap();
        let version = doc.create_record("FBXVersion", Some(root)).unwrap();
        doc[version].push(7300i32);

        let path = temp_path("save.fbx");
        doc.save(&path).unwrap();
        let opened = Document::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(opened, doc);
    }

    #[test]
    fn test_read_with_inspection() {
        let path = temp_path("inspect.fbx");
        write_file(&path, &Document::new(7700)).unwrap();
        let result = read_file_with(&path, &ReadOptions::default(), |header| {
            if header.version >= 7500 {
                return Err(Error::UnsupportedFile {
                    reason: format!("64-bit offsets (version {})", header.version),
                });
            }
            Ok(())
        });
        fs::remove_file(&path).unwrap();

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_missing_file() {
        let path = temp_path("does-not-exist.fbx");
        match read_file(&path) {
            Err(Error::IoFailure { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
