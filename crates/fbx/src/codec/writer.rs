//! Document encoding.
//!
//! Record sizes are not known until their contents are written, so each
//! record's `end_offset` (and `property_list_len`) is written as a zero
//! placeholder and patched once the bytes after it are final. Nesting is
//! tracked with an explicit stack, one frame per open sibling list.

use log::debug;

use crate::codec::primitives::{Writer, to_u32};
use crate::codec::property::encode_property;
use crate::error::{Error, Result};
use crate::limits::{HEADER_LEN, HEADER_PAD, MAGIC, MAX_NAME_LEN, NULL_RECORD};
use crate::model::{Document, Record, RecordId};

/// A sibling list being written.
struct Frame<'a> {
    siblings: &'a [RecordId],
    next: usize,
    /// `end_offset` slot of the previous sibling, patched once its nested
    /// list has been closed.
    pending: Option<usize>,
}

/// Writes the 27-byte file header.
pub fn encode_header(writer: &mut Writer, version: u32) {
    writer.write_bytes(MAGIC);
    writer.write_bytes(&HEADER_PAD);
    writer.write_u32(version);
}

/// Encodes a document into a complete binary file.
///
/// Every sibling list, including the top level, is closed with a null
/// record. Arrays are written uncompressed.
pub fn encode_document(document: &Document) -> Result<Vec<u8>> {
    let mut writer = Writer::with_capacity(HEADER_LEN + document.len() * 64);
    encode_header(&mut writer, document.version());

    let mut stack = Vec::new();
    if !document.roots().is_empty() {
        stack.push(Frame {
            siblings: document.roots(),
            next: 0,
            pending: None,
        });
    }

    while let Some(frame) = stack.last_mut() {
        if let Some(slot) = frame.pending.take() {
            let end = writer.offset()?;
            writer.patch_u32(slot, end);
        }

        let Some(&id) = frame.siblings.get(frame.next) else {
            writer.write_bytes(&NULL_RECORD);
            stack.pop();
            continue;
        };
        frame.next += 1;

        let record = document.record(id)?;
        let end_slot = encode_record(&mut writer, record)?;
        if record.has_children() {
            frame.pending = Some(end_slot);
            stack.push(Frame {
                siblings: record.children(),
                next: 0,
                pending: None,
            });
        } else {
            let end = writer.offset()?;
            writer.patch_u32(end_slot, end);
        }
    }

    to_u32(writer.len(), "file length")?;
    debug!(
        "encoded {} records into {} bytes",
        document.len(),
        writer.len()
    );
    Ok(writer.into_bytes())
}

/// Writes a record's header and property list. The `end_offset` field is
/// left as a placeholder whose offset is returned.
fn encode_record(writer: &mut Writer, record: &Record) -> Result<usize> {
    let name = record.name().as_bytes();
    if name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong { len: name.len() });
    }

    let end_slot = writer.reserve_u32();
    writer.write_u32(to_u32(record.property_count(), "property count")?);
    let list_len_slot = writer.reserve_u32();
    writer.write_byte(name.len() as u8);
    writer.write_bytes(name);

    let start = writer.len();
    for property in record.properties() {
        encode_property(writer, property)?;
    }
    let list_len = to_u32(writer.len() - start, "property list length")?;
    writer.patch_u32(list_len_slot, list_len);

    Ok(end_slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reader::decode_document;
    use crate::limits::RECORD_HEADER_LEN;
    use crate::model::Property;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_empty_document() {
        let bytes = encode_document(&Document::new(7400)).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[..21], MAGIC);
        assert_eq!(&bytes[21..23], &HEADER_PAD);
        assert_eq!(u32_at(&bytes, 23), 7400);
    }

    #[test]
    fn test_leaf_end_offset() {
        let mut doc = Document::new(7400);
        let id = doc.create_record("Leaf", None).unwrap();
        doc[id].push(1i32).push("abc");

        let bytes = encode_document(&doc).unwrap();
        let props_len = 5 + 8;
        let end = HEADER_LEN + RECORD_HEADER_LEN + 4 + props_len;
        assert_eq!(u32_at(&bytes, HEADER_LEN) as usize, end);
        assert_eq!(u32_at(&bytes, HEADER_LEN + 4), 2);
        assert_eq!(u32_at(&bytes, HEADER_LEN + 8) as usize, props_len);
        // Top-level null record follows the leaf.
        assert_eq!(&bytes[end..], &NULL_RECORD);
    }

    #[test]
    fn test_nested_layout() {
        let mut doc = Document::new(7400);
        let root = doc.create_record("Root", None).unwrap();
        let geometry = doc.create_record("Geometry", Some(root)).unwrap();
        doc[geometry]
            .push(vec![1i32, 2, 3])
            .push("mesh");

        let bytes = encode_document(&doc).unwrap();

        let geometry_at = HEADER_LEN + RECORD_HEADER_LEN + 4;
        let geometry_end = geometry_at + RECORD_HEADER_LEN + 8 + (13 + 12) + (5 + 4);
        assert_eq!(u32_at(&bytes, geometry_at) as usize, geometry_end);

        // Root closes its child list with a null record.
        let root_end = geometry_end + RECORD_HEADER_LEN;
        assert_eq!(&bytes[geometry_end..root_end], &NULL_RECORD);
        assert_eq!(u32_at(&bytes, HEADER_LEN) as usize, root_end);
        assert_eq!(bytes.len(), root_end + RECORD_HEADER_LEN);

        let decoded = decode_document(&bytes).unwrap();
        assert_eq!(decoded, doc);
        let g = &decoded[decoded.find(decoded.find(None, "Root"), "Geometry").unwrap()];
        assert_eq!(g.properties()[0], Property::Integer32Array(vec![1, 2, 3]));
        assert_eq!(g.properties()[1].as_str(), "mesh");
    }

    #[test]
    fn test_deep_chain() {
        let mut doc = Document::new(7500);
        let mut parent = None;
        for depth in 0..200 {
            let id = doc.create_record(format!("N{depth}"), parent).unwrap();
            doc[id].push(depth as i64);
            parent = Some(id);
        }
        let bytes = encode_document(&doc).unwrap();
        let decoded = decode_document(&bytes).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(decoded.walk().map(|(depth, _)| depth).max(), Some(199));
    }

    #[test]
    fn test_siblings_after_nested_list() {
        let mut doc = Document::new(7400);
        let a = doc.create_record("A", None).unwrap();
        doc.create_record("A1", Some(a)).unwrap();
        doc.create_record("A2", Some(a)).unwrap();
        let b = doc.create_record("B", None).unwrap();
        doc[b].push(true);

        let decoded = decode_document(&encode_document(&doc).unwrap()).unwrap();
        assert_eq!(decoded, doc);
        let names: Vec<_> = decoded
            .walk()
            .map(|(_, id)| decoded[id].name().to_string())
            .collect();
        assert_eq!(names, ["A", "A1", "A2", "B"]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut doc = Document::new(7400);
        let a = doc.create_record("Objects", None).unwrap();
        let m = doc.create_record("Model", Some(a)).unwrap();
        doc[m].push(42i64).push("Model::Cube").push("Mesh");

        let first = encode_document(&doc).unwrap();
        let again = encode_document(&decode_document(&first).unwrap()).unwrap();
        assert_eq!(first, again);
    }
}
