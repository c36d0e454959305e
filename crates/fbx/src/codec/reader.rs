//! Document decoding.
//!
//! The record tree is parsed with an explicit stack of open scopes rather
//! than recursion, so nesting depth only costs one small frame per level.
//! Every record's `end_offset` must nest strictly inside its parent's,
//! and its property section must decode to exactly the declared length.

use log::{debug, trace};

use crate::codec::primitives::Reader;
use crate::codec::property::decode_property;
use crate::error::{Error, Result};
use crate::limits::{
    DEFAULT_MAX_ARRAY_BYTES, DEFAULT_MAX_DEPTH, HEADER_LEN, MAGIC, MAGIC_LEN, MAX_FILE_LEN,
    RECORD_HEADER_LEN, VERSION_OFFSET,
};
use crate::model::{Document, PropertyList, Record, RecordId};

/// File header fields surfaced before the body is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The first 20 bytes of the file.
    pub magic: [u8; MAGIC_LEN],
    /// Format version, e.g. 7400.
    pub version: u32,
}

impl Header {
    /// Returns true if the magic reads `Kaydara FBX Binary  `.
    pub fn has_standard_magic(&self) -> bool {
        self.magic[..] == MAGIC[..MAGIC_LEN]
    }
}

/// Decoder limits.
///
/// These guard resource use on hostile input; structural validation
/// happens regardless of their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Maximum record nesting depth (top-level records have depth 1).
    pub max_depth: usize,
    /// Maximum decoded byte size of one array property.
    pub max_array_bytes: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_bytes: DEFAULT_MAX_ARRAY_BYTES,
        }
    }
}

impl ReadOptions {
    /// Creates the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_array_bytes(mut self, max_array_bytes: usize) -> Self {
        self.max_array_bytes = max_array_bytes;
        self
    }
}

/// One open scope: the record whose children are being read (`None` for
/// the file root) and the offset where that scope ends.
#[derive(Debug, Clone, Copy)]
struct Frame {
    owner: Option<RecordId>,
    end: usize,
}

/// Parses the fixed-size file header.
///
/// The magic is returned as-is; rejecting foreign files is left to the
/// caller (see [`decode_document_with`]).
pub fn decode_header(input: &[u8]) -> Result<Header> {
    if input.len() < HEADER_LEN || input.len() > MAX_FILE_LEN {
        return Err(Error::MalformedHeader { len: input.len() });
    }
    let mut reader = Reader::new(input);
    let mut magic = [0u8; MAGIC_LEN];
    magic.copy_from_slice(reader.read_bytes(MAGIC_LEN, "magic")?);
    reader.seek(VERSION_OFFSET);
    let version = reader.read_u32("version")?;
    Ok(Header { magic, version })
}

/// Decodes a whole file with default limits and no header inspection.
pub fn decode_document(input: &[u8]) -> Result<Document> {
    decode_document_with(input, &ReadOptions::default(), |_| Ok(()))
}

/// Decodes a whole file.
///
/// `inspect` runs once the header is parsed and before any record is
/// read; returning an error aborts decoding with that error.
///
/// ```ignore
/// let doc = decode_document_with(&bytes, &ReadOptions::default(), |header| {
///     if !header.has_standard_magic() || header.version >= 7500 {
///         return Err(Error::UnsupportedFile { reason: format!("version {}", header.version) });
///     }
///     Ok(())
/// })?;
/// ```
pub fn decode_document_with<F>(input: &[u8], options: &ReadOptions, inspect: F) -> Result<Document>
where
    F: FnOnce(&Header) -> Result<()>,
{
    let header = decode_header(input)?;
    inspect(&header)?;
    debug!(
        "decoding FBX version {} ({} bytes)",
        header.version,
        input.len()
    );

    let file_len = input.len();
    let mut document = Document::new(header.version);
    let mut reader = Reader::new(input);
    reader.seek(HEADER_LEN);

    let mut stack = vec![Frame {
        owner: None,
        end: file_len,
    }];

    while let Some(&frame) = stack.last() {
        let pos = reader.position();
        match frame.owner {
            // Reaching end of file closes the top level as well as a null
            // record does.
            None if pos >= file_len => {
                stack.pop();
                continue;
            }
            Some(owner) if pos + RECORD_HEADER_LEN > frame.end => {
                return Err(Error::MissingNestedListTerminator {
                    record: document[owner].name().to_string(),
                    end_offset: frame.end,
                });
            }
            _ => {}
        }

        let end_offset = reader.read_u32("record end offset")?;
        let num_properties = reader.read_u32("record property count")?;
        let property_list_len = reader.read_u32("record property list length")?;
        let name_len = reader.read_byte("record name length")?;

        if end_offset == 0 {
            trace!("{}: end of nested list", pos);
            stack.pop();
            continue;
        }

        let name_bytes = reader.read_bytes(usize::from(name_len), "record name")?;
        let end = end_offset as usize;

        if end > file_len {
            return Err(Error::OffsetOutOfRange {
                record: String::from_utf8_lossy(name_bytes).into_owned(),
                end_offset,
                file_len,
            });
        }
        if frame.owner.is_some() && end >= frame.end {
            return Err(Error::OffsetExceedsParent {
                record: String::from_utf8_lossy(name_bytes).into_owned(),
                end_offset,
                parent_end: frame.end,
            });
        }
        let props_start = reader.position();
        if props_start + property_list_len as usize > end {
            return Err(Error::InvalidPropertyListLength {
                record: String::from_utf8_lossy(name_bytes).into_owned(),
                position: props_start,
                property_list_len,
                end_offset,
            });
        }

        let depth = stack.len();
        if depth > options.max_depth {
            return Err(Error::NestingTooDeep {
                depth,
                max: options.max_depth,
            });
        }

        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| Error::InvalidUtf8 {
                field: "record name",
            })?
            .to_string();

        // Properties may not run past the record, but may run past the
        // declared length; the byte count is checked afterwards.
        let mut props = reader.bounded(end);
        // The smallest property (a boolean) takes two bytes.
        let capacity = (num_properties as usize).min(property_list_len as usize / 2);
        let mut properties = PropertyList::with_capacity(capacity);
        for _ in 0..num_properties {
            properties.push(decode_property(&mut props, &name, options)?);
        }
        let consumed = props.position() - props_start;
        if consumed != property_list_len as usize {
            return Err(Error::PropertyListLengthMismatch {
                record: name,
                declared: property_list_len,
                actual: consumed,
            });
        }
        reader.seek(props.position());

        trace!("{}: record {:?} ends at {}", pos, name, end);
        let id = document.attach_new(Record::with_properties(name, properties)?, frame.owner);

        // A record whose properties end exactly at its end offset has no
        // nested list (and no null record).
        if reader.position() != end {
            stack.push(Frame {
                owner: Some(id),
                end,
            });
        }
    }

    debug!("decoded {} records", document.len());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::compression::deflate;
    use crate::codec::property::array_payload;
    use crate::limits::{HEADER_PAD, NULL_RECORD};
    use crate::model::Property;

    /// Hand-assembles files so tests can corrupt individual fields.
    struct FileBuilder {
        buf: Vec<u8>,
    }

    impl FileBuilder {
        fn new(version: u32) -> Self {
            let mut buf = MAGIC.to_vec();
            buf.extend_from_slice(&HEADER_PAD);
            buf.extend_from_slice(&version.to_le_bytes());
            Self { buf }
        }

        fn pos(&self) -> usize {
            self.buf.len()
        }

        /// Writes a record header; returns the offset of its end-offset
        /// field.
        fn header(&mut self, end: u32, num_props: u32, props_len: u32, name: &str) -> usize {
            let at = self.buf.len();
            self.buf.extend_from_slice(&end.to_le_bytes());
            self.buf.extend_from_slice(&num_props.to_le_bytes());
            self.buf.extend_from_slice(&props_len.to_le_bytes());
            self.buf.push(name.len() as u8);
            self.buf.extend_from_slice(name.as_bytes());
            at
        }

        fn bytes(&mut self, bytes: &[u8]) {
            self.buf.extend_from_slice(bytes);
        }

        fn null(&mut self) {
            self.buf.extend_from_slice(&NULL_RECORD);
        }

        fn patch(&mut self, at: usize, value: u32) {
            self.buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }
    }

    const INT_PROP: [u8; 5] = [b'I', 42, 0, 0, 0];

    /// `Root { I 42; Child { I 42 } }` followed by a top-level null record.
    fn nested_file() -> FileBuilder {
        let mut f = FileBuilder::new(7400);
        let root = f.header(0, 1, 5, "Root");
        f.bytes(&INT_PROP);
        let child = f.header(0, 1, 5, "Child");
        f.bytes(&INT_PROP);
        let child_end = f.pos() as u32;
        f.patch(child, child_end);
        f.null();
        let root_end = f.pos() as u32;
        f.patch(root, root_end);
        f.null();
        f
    }

    #[test]
    fn test_header() {
        let f = FileBuilder::new(7500);
        let header = decode_header(&f.buf).unwrap();
        assert_eq!(header.version, 7500);
        assert!(header.has_standard_magic());
        assert_eq!(&header.magic, b"Kaydara FBX Binary  ");
    }

    #[test]
    fn test_header_too_short() {
        let f = FileBuilder::new(7400);
        assert!(matches!(
            decode_document(&f.buf[..26]),
            Err(Error::MalformedHeader { len: 26 })
        ));
        assert!(matches!(decode_document(&[]), Err(Error::MalformedHeader { len: 0 })));
    }

    #[test]
    fn test_header_only_file() {
        let f = FileBuilder::new(7100);
        let doc = decode_document(&f.buf).unwrap();
        assert_eq!(doc.version(), 7100);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_nested_records() {
        let f = nested_file();
        let doc = decode_document(&f.buf).unwrap();
        assert_eq!(doc.roots().len(), 1);
        let root = &doc[doc.roots()[0]];
        assert_eq!(root.name(), "Root");
        assert_eq!(root.properties()[0], Property::Integer32(42));
        assert_eq!(root.children().len(), 1);
        let child = &doc[root.children()[0]];
        assert_eq!(child.name(), "Child");
        assert!(child.children().is_empty());
        assert_eq!(child.parent(), Some(doc.roots()[0]));
    }

    #[test]
    fn test_top_level_ends_at_eof() {
        // No trailing null record: end of file closes the top level.
        let mut f = FileBuilder::new(7400);
        let a = f.header(0, 1, 5, "A");
        f.bytes(&INT_PROP);
        let end = f.pos() as u32;
        f.patch(a, end);
        let doc = decode_document(&f.buf).unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_stops_at_top_level_null_record() {
        let mut f = nested_file();
        // Footer bytes after the top-level null record are not parsed.
        f.bytes(&[0xFA, 0xBC, 0xAB, 0x09, 0xD0, 0xC8, 0xD4, 0x66]);
        let doc = decode_document(&f.buf).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_offset_out_of_range() {
        let mut f = nested_file();
        let len = f.buf.len() as u32;
        f.patch(HEADER_LEN, len + 1);
        assert!(matches!(
            decode_document(&f.buf),
            Err(Error::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn test_offset_exceeds_parent() {
        let mut f = nested_file();
        // Child header follows Root header (13 + 4 name) and its property.
        let child = HEADER_LEN + 13 + 4 + 5;
        let root_end = u32::from_le_bytes(f.buf[HEADER_LEN..HEADER_LEN + 4].try_into().unwrap());
        f.patch(child, root_end);
        match decode_document(&f.buf) {
            Err(Error::OffsetExceedsParent {
                record, parent_end, ..
            }) => {
                assert_eq!(record, "Child");
                assert_eq!(parent_end, root_end as usize);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_property_list_length() {
        let mut f = FileBuilder::new(7400);
        let a = f.header(0, 1, 500, "A");
        f.bytes(&INT_PROP);
        let end = f.pos() as u32;
        f.patch(a, end);
        f.null();
        assert!(matches!(
            decode_document(&f.buf),
            Err(Error::InvalidPropertyListLength {
                property_list_len: 500,
                ..
            })
        ));
    }

    #[test]
    fn test_property_list_one_byte_short_and_long() {
        for declared in [4u32, 6] {
            let mut f = FileBuilder::new(7400);
            let a = f.header(0, 1, declared, "A");
            f.bytes(&INT_PROP);
            // Padding keeps a declared length of 6 inside the record.
            f.bytes(&[0]);
            f.null();
            let end = f.pos() as u32;
            f.patch(a, end);
            f.null();

            match decode_document(&f.buf) {
                Err(Error::PropertyListLengthMismatch {
                    declared: d,
                    actual,
                    ..
                }) => {
                    assert_eq!(d, declared);
                    assert_eq!(actual, 5);
                }
                other => panic!("declared {declared}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_nested_list_terminator() {
        let mut f = FileBuilder::new(7400);
        let a = f.header(0, 0, 0, "A");
        let b = f.header(0, 0, 0, "B");
        let b_end = f.pos() as u32;
        f.patch(b, b_end);
        // A ends right after B without a null record.
        f.patch(a, b_end + 1);
        f.bytes(&[0]);
        f.null();

        assert!(matches!(
            decode_document(&f.buf),
            Err(Error::MissingNestedListTerminator { ref record, .. }) if record == "A"
        ));
    }

    #[test]
    fn test_unknown_property_code_in_record() {
        let mut f = FileBuilder::new(7400);
        let a = f.header(0, 1, 2, "A");
        f.bytes(&[b'?', 0]);
        let end = f.pos() as u32;
        f.patch(a, end);
        f.null();
        assert!(matches!(
            decode_document(&f.buf),
            Err(Error::UnknownPropertyCode { code: b'?', .. })
        ));
    }

    #[test]
    fn test_compressed_array_record() {
        let values: Vec<f64> = (0..1000).map(|i| (i as f64).sin()).collect();
        let compressed = deflate(&array_payload(&Property::from(values.clone())).unwrap(), 9).unwrap();

        let build = |payload: &[u8]| {
            let mut prop = vec![b'd'];
            prop.extend_from_slice(&1000u32.to_le_bytes());
            prop.extend_from_slice(&1u32.to_le_bytes());
            prop.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            prop.extend_from_slice(payload);

            let mut f = FileBuilder::new(7400);
            let a = f.header(0, 1, prop.len() as u32, "Vertices");
            f.bytes(&prop);
            let end = f.pos() as u32;
            f.patch(a, end);
            f.null();
            f.buf
        };

        let doc = decode_document(&build(&compressed)).unwrap();
        let record = &doc[doc.roots()[0]];
        assert_eq!(record.properties()[0].as_float64_array(), values.as_slice());

        let mut corrupt = compressed.clone();
        corrupt[0] ^= 0xFF;
        assert!(matches!(
            decode_document(&build(&corrupt)),
            Err(Error::DecompressionFailed { ref record, .. }) if record == "Vertices"
        ));
    }

    #[test]
    fn test_depth_limit() {
        let f = nested_file();
        let options = ReadOptions::new().max_depth(1);
        assert!(matches!(
            decode_document_with(&f.buf, &options, |_| Ok(())),
            Err(Error::NestingTooDeep { depth: 2, max: 1 })
        ));
        let options = ReadOptions::new().max_depth(2);
        assert!(decode_document_with(&f.buf, &options, |_| Ok(())).is_ok());
    }

    #[test]
    fn test_inspect_rejects() {
        let f = nested_file();
        let mut seen = None;
        let result = decode_document_with(&f.buf, &ReadOptions::default(), |header| {
            seen = Some(header.version);
            Err(Error::UnsupportedFile {
                reason: "version".to_string(),
            })
        });
        assert_eq!(seen, Some(7400));
        assert!(matches!(result, Err(Error::UnsupportedFile { .. })));
    }

    #[test]
    fn test_invalid_utf8_name() {
        let mut f = FileBuilder::new(7400);
        let a = f.buf.len();
        f.bytes(&[0; 12]);
        f.bytes(&[1, 0xFF]);
        let end = f.pos() as u32;
        f.patch(a, end);
        f.null();
        let err = decode_document(&f.buf).unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8 { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidName);
    }

    #[test]
    fn test_huge_property_count_fails_cleanly() {
        // Declares u32::MAX properties in a four-byte property section.
        let mut f = FileBuilder::new(7400);
        let a = f.header(0, u32::MAX, 4, "A");
        f.bytes(&[b'C', 1, b'C', 0]);
        let end = f.pos() as u32;
        f.patch(a, end);
        f.null();
        assert!(matches!(
            decode_document(&f.buf),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_truncated_record_header() {
        let mut f = nested_file();
        f.buf.truncate(HEADER_LEN + 6);
        assert!(matches!(
            decode_document(&f.buf),
            Err(Error::UnexpectedEof { .. })
        ));
    }
}
