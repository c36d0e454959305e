//! Binary encoding/decoding for FBX files.
//!
//! Only the 32-bit offset layout is handled; 64-bit offset files
//! (version 7500 and later) can be rejected through header inspection.

pub mod compression;
pub mod primitives;
pub mod property;
pub mod reader;
pub mod writer;

pub use compression::{CompressionError, deflate, inflate};
pub use primitives::{Reader, Writer};
pub use property::{array_payload, decode_property, encode_property};
pub use reader::{Header, ReadOptions, decode_document, decode_document_with, decode_header};
pub use writer::{encode_document, encode_header};
