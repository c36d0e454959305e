//! Property encoding/decoding.
//!
//! Each property is a one-byte type code followed by its payload:
//! - scalars: fixed-width little-endian value
//! - `S`/`R`: `u32` byte length, then the bytes
//! - arrays: `length`, `encoding`, `compressed_length` (all `u32`), then
//!   either `length * width` raw bytes or `compressed_length` zlib bytes

use std::borrow::Cow;

use crate::codec::compression::inflate;
use crate::codec::primitives::{Reader, Writer, to_u32};
use crate::codec::reader::ReadOptions;
use crate::error::{Error, Result};
use crate::limits::{ARRAY_ENCODING_DEFLATE, ARRAY_ENCODING_RAW};
use crate::model::{Property, PropertyType};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes one property. `record` names the owning record in errors.
pub fn decode_property(
    reader: &mut Reader<'_>,
    record: &str,
    options: &ReadOptions,
) -> Result<Property> {
    let code = reader.read_byte("property code")?;
    let ty = PropertyType::from_code(code).ok_or_else(|| Error::UnknownPropertyCode {
        record: record.to_string(),
        code,
    })?;

    let property = match ty {
        PropertyType::Boolean => Property::Boolean(reader.read_byte("boolean")? != 0),
        PropertyType::Integer16 => Property::Integer16(reader.read_i16("integer16")?),
        PropertyType::Integer32 => Property::Integer32(reader.read_i32("integer32")?),
        PropertyType::Integer64 => Property::Integer64(reader.read_i64("integer64")?),
        PropertyType::Float32 => Property::Float32(reader.read_f32("float32")?),
        PropertyType::Float64 => Property::Float64(reader.read_f64("float64")?),
        PropertyType::String => Property::String(reader.read_blob("string")?.to_vec()),
        PropertyType::Raw => Property::Raw(reader.read_blob("raw")?.to_vec()),
        array => decode_array(reader, array, record, options)?,
    };
    Ok(property)
}

fn decode_array(
    reader: &mut Reader<'_>,
    ty: PropertyType,
    record: &str,
    options: &ReadOptions,
) -> Result<Property> {
    let length = reader.read_u32("array length")? as usize;
    let encoding = reader.read_u32("array encoding")?;
    let compressed_len = reader.read_u32("array compressed length")? as usize;

    if encoding != ARRAY_ENCODING_RAW && encoding != ARRAY_ENCODING_DEFLATE {
        return Err(Error::UnknownArrayEncoding {
            record: record.to_string(),
            encoding,
        });
    }

    let byte_len = length
        .checked_mul(ty.element_width())
        .filter(|&n| n <= options.max_array_bytes)
        .ok_or_else(|| Error::LengthExceedsLimit {
            field: "array",
            len: length.saturating_mul(ty.element_width()),
            max: options.max_array_bytes,
        })?;

    let bytes: Cow<'_, [u8]> = if encoding == ARRAY_ENCODING_RAW {
        Cow::Borrowed(reader.read_bytes(byte_len, "array elements")?)
    } else {
        let compressed = reader.read_bytes(compressed_len, "compressed array")?;
        let inflated = inflate(compressed, byte_len).map_err(|e| Error::DecompressionFailed {
            record: record.to_string(),
            reason: e.to_string(),
        })?;
        Cow::Owned(inflated)
    };

    Ok(array_from_le_bytes(ty, &bytes))
}

#[inline]
fn le<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(chunk);
    out
}

/// Builds an array property from its little-endian element bytes.
/// `bytes.len()` must be a multiple of the element width.
fn array_from_le_bytes(ty: PropertyType, bytes: &[u8]) -> Property {
    match ty {
        PropertyType::BooleanArray => Property::BooleanArray(bytes.iter().map(|&b| b != 0).collect()),
        PropertyType::Integer32Array => Property::Integer32Array(
            bytes.chunks_exact(4).map(|c| i32::from_le_bytes(le(c))).collect(),
        ),
        PropertyType::Integer64Array => Property::Integer64Array(
            bytes.chunks_exact(8).map(|c| i64::from_le_bytes(le(c))).collect(),
        ),
        PropertyType::Float32Array => Property::Float32Array(
            bytes.chunks_exact(4).map(|c| f32::from_le_bytes(le(c))).collect(),
        ),
        PropertyType::Float64Array => Property::Float64Array(
            bytes.chunks_exact(8).map(|c| f64::from_le_bytes(le(c))).collect(),
        ),
        // Only array types reach this point.
        _ => Property::Raw(bytes.to_vec()),
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes one property. Arrays are always written uncompressed.
pub fn encode_property(writer: &mut Writer, property: &Property) -> Result<()> {
    writer.write_byte(property.code());
    match property {
        Property::Boolean(v) => writer.write_byte(u8::from(*v)),
        Property::Integer16(v) => writer.write_i16(*v),
        Property::Integer32(v) => writer.write_i32(*v),
        Property::Integer64(v) => writer.write_i64(*v),
        Property::Float32(v) => writer.write_f32(*v),
        Property::Float64(v) => writer.write_f64(*v),
        Property::String(v) => writer.write_blob(v, "string length")?,
        Property::Raw(v) => writer.write_blob(v, "raw length")?,
        array => {
            let length = to_u32(array.size(), "array length")?;
            let byte_len = to_u32(
                array.size() * array.property_type().element_width(),
                "array byte length",
            )?;
            writer.write_u32(length);
            writer.write_u32(ARRAY_ENCODING_RAW);
            writer.write_u32(byte_len);
            write_array_elements(writer, array);
        }
    }
    Ok(())
}

fn write_array_elements(writer: &mut Writer, property: &Property) {
    match property {
        Property::BooleanArray(v) => v.iter().for_each(|&b| writer.write_byte(u8::from(b))),
        Property::Integer32Array(v) => v.iter().for_each(|&x| writer.write_i32(x)),
        Property::Integer64Array(v) => v.iter().for_each(|&x| writer.write_i64(x)),
        Property::Float32Array(v) => v.iter().for_each(|&x| writer.write_f32(x)),
        Property::Float64Array(v) => v.iter().for_each(|&x| writer.write_f64(x)),
        _ => {}
    }
}

/// Little-endian element bytes of an array property, as stored by
/// encoding 0 and as compressed by encoding 1. `None` for non-arrays.
pub fn array_payload(property: &Property) -> Option<Vec<u8>> {
    if !property.property_type().is_array() {
        return None;
    }
    let mut writer =
        Writer::with_capacity(property.size() * property.property_type().element_width());
    write_array_elements(&mut writer, property);
    Some(writer.into_bytes())
}
