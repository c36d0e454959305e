//! Reader and writer for binary FBX files.
//!
//! This crate decodes the binary FBX container into an in-memory record
//! tree, lets callers inspect and edit it, and encodes it back to bytes.
//! Only the container is handled: records, their typed properties and
//! their nesting. Scene semantics (meshes, materials, animation) are left
//! to the caller.
//!
//! # Overview
//!
//! A file is a header followed by a tree of named [`Record`]s. Each record
//! carries an ordered [`PropertyList`] of typed [`Property`] values and an
//! ordered list of child records. Records live in a [`Document`] arena and
//! are addressed by [`RecordId`] handles.
//!
//! # Quick Start
//!
//! ```rust
//! use fbx::{Document, Property, decode_document, encode_document};
//!
//! let mut doc = Document::new(7400);
//! let root = doc.create_record("Root", None).unwrap();
//! let geometry = doc.create_record("Geometry", Some(root)).unwrap();
//! doc[geometry].push(vec![1i32, 2, 3]).push("mesh");
//!
//! let bytes = encode_document(&doc).unwrap();
//! let decoded = decode_document(&bytes).unwrap();
//!
//! let geometry = decoded.find(decoded.find(None, "Root"), "Geometry").unwrap();
//! assert_eq!(decoded[geometry].properties()[0], Property::Integer32Array(vec![1, 2, 3]));
//! assert_eq!(decoded, doc);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Document, Record, Property and PropertyList
//! - [`codec`]: Binary encoding/decoding with zlib array support
//! - [`io`]: Whole-file read/write helpers
//! - [`error`]: Error types
//! - [`limits`]: Wire constants and default decode limits
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Every offset and length is checked against its enclosing scope
//! - Nesting depth and array sizes are bounded by [`ReadOptions`]
//! - Decompressed arrays must inflate to exactly their declared size
//! - Nesting is parsed with an explicit stack, never recursion
//!
//! # Wire Format
//!
//! - Header: 21-byte magic, `0x1A 0x00`, `u32` version
//! - Record: `end_offset`, `num_properties`, `property_list_len` (`u32`),
//!   `name_len` (`u8`), name, properties, nested records, null record
//! - Properties: one type code from `CYILFDbilfdSR` and its payload
//!
//! Only 32-bit offsets are supported. Use [`decode_document_with`] to
//! reject files by version before any record is read.

pub mod codec;
pub mod error;
pub mod io;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{Header, ReadOptions, decode_document, decode_document_with, encode_document};
pub use error::{Error, ErrorKind, Result};
pub use io::{read_file, read_file_with, write_file};
pub use model::{Document, Property, PropertyList, PropertyType, Record, RecordId, Walk};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
