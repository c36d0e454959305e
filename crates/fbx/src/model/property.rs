//! Property values attached to records.
//!
//! A property is one typed scalar, a homogeneous array, a string or an
//! opaque byte blob. The variant is fixed at construction.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use crate::error::{Error, Result};
use crate::limits::TYPE_CODES;

/// Property types, in wire-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyType {
    Boolean = 0,
    Integer16 = 1,
    Integer32 = 2,
    Integer64 = 3,
    Float32 = 4,
    Float64 = 5,
    BooleanArray = 6,
    Integer32Array = 7,
    Integer64Array = 8,
    Float32Array = 9,
    Float64Array = 10,
    String = 11,
    Raw = 12,
}

impl PropertyType {
    /// All types, in ordinal order.
    pub const ALL: [PropertyType; 13] = [
        PropertyType::Boolean,
        PropertyType::Integer16,
        PropertyType::Integer32,
        PropertyType::Integer64,
        PropertyType::Float32,
        PropertyType::Float64,
        PropertyType::BooleanArray,
        PropertyType::Integer32Array,
        PropertyType::Integer64Array,
        PropertyType::Float32Array,
        PropertyType::Float64Array,
        PropertyType::String,
        PropertyType::Raw,
    ];

    /// Returns the single-byte wire tag for this type.
    pub fn code(self) -> u8 {
        TYPE_CODES[self as usize]
    }

    /// Looks up the type for a wire tag.
    pub fn from_code(code: u8) -> Option<PropertyType> {
        TYPE_CODES
            .iter()
            .position(|&c| c == code)
            .map(|i| PropertyType::ALL[i])
    }

    /// Human-readable type name.
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Boolean => "Boolean",
            PropertyType::Integer16 => "Integer16",
            PropertyType::Integer32 => "Integer32",
            PropertyType::Integer64 => "Integer64",
            PropertyType::Float32 => "Float32",
            PropertyType::Float64 => "Float64",
            PropertyType::BooleanArray => "BooleanArray",
            PropertyType::Integer32Array => "Integer32Array",
            PropertyType::Integer64Array => "Integer64Array",
            PropertyType::Float32Array => "Float32Array",
            PropertyType::Float64Array => "Float64Array",
            PropertyType::String => "String",
            PropertyType::Raw => "Raw",
        }
    }

    /// Width in bytes of one value (scalars) or one element (arrays).
    ///
    /// Strings and raw blobs are byte sequences and report 1.
    pub fn element_width(self) -> usize {
        match self {
            PropertyType::Boolean | PropertyType::BooleanArray => 1,
            PropertyType::Integer16 => 2,
            PropertyType::Integer32
            | PropertyType::Float32
            | PropertyType::Integer32Array
            | PropertyType::Float32Array => 4,
            PropertyType::Integer64
            | PropertyType::Float64
            | PropertyType::Integer64Array
            | PropertyType::Float64Array => 8,
            PropertyType::String | PropertyType::Raw => 1,
        }
    }

    pub fn is_primitive(self) -> bool {
        (self as u8) <= PropertyType::Float64 as u8
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            PropertyType::BooleanArray
                | PropertyType::Integer32Array
                | PropertyType::Integer64Array
                | PropertyType::Float32Array
                | PropertyType::Float64Array
        )
    }

    pub fn is_string(self) -> bool {
        self == PropertyType::String
    }

    pub fn is_raw(self) -> bool {
        self == PropertyType::Raw
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed property value.
///
/// String payloads are kept as bytes: FBX strings embed NUL/0x01 separators
/// and are not required to be UTF-8. Use [`Property::as_str`] for text.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Boolean(bool),
    Integer16(i16),
    Integer32(i32),
    Integer64(i64),
    Float32(f32),
    Float64(f64),
    BooleanArray(Vec<bool>),
    Integer32Array(Vec<i32>),
    Integer64Array(Vec<i64>),
    Float32Array(Vec<f32>),
    Float64Array(Vec<f64>),
    String(Vec<u8>),
    Raw(Vec<u8>),
}

impl Property {
    /// Creates a string property from text.
    pub fn string(value: impl Into<String>) -> Self {
        Property::String(value.into().into_bytes())
    }

    /// Creates a raw byte property.
    pub fn raw(value: impl Into<Vec<u8>>) -> Self {
        Property::Raw(value.into())
    }

    /// Returns the type of this property.
    pub fn property_type(&self) -> PropertyType {
        match self {
            Property::Boolean(_) => PropertyType::Boolean,
            Property::Integer16(_) => PropertyType::Integer16,
            Property::Integer32(_) => PropertyType::Integer32,
            Property::Integer64(_) => PropertyType::Integer64,
            Property::Float32(_) => PropertyType::Float32,
            Property::Float64(_) => PropertyType::Float64,
            Property::BooleanArray(_) => PropertyType::BooleanArray,
            Property::Integer32Array(_) => PropertyType::Integer32Array,
            Property::Integer64Array(_) => PropertyType::Integer64Array,
            Property::Float32Array(_) => PropertyType::Float32Array,
            Property::Float64Array(_) => PropertyType::Float64Array,
            Property::String(_) => PropertyType::String,
            Property::Raw(_) => PropertyType::Raw,
        }
    }

    /// Returns the wire tag of this property.
    pub fn code(&self) -> u8 {
        self.property_type().code()
    }

    /// Element count for arrays, byte count for strings and raw blobs, and
    /// the fixed byte width for scalars.
    pub fn size(&self) -> usize {
        match self {
            Property::BooleanArray(v) => v.len(),
            Property::Integer32Array(v) => v.len(),
            Property::Integer64Array(v) => v.len(),
            Property::Float32Array(v) => v.len(),
            Property::Float64Array(v) => v.len(),
            Property::String(v) | Property::Raw(v) => v.len(),
            scalar => scalar.property_type().element_width(),
        }
    }

    fn mismatch(&self, expected: PropertyType) -> Error {
        Error::PropertyTypeMismatch {
            expected,
            found: self.property_type(),
        }
    }

    // =========================================================================
    // Lenient accessors: the wrong variant yields a zero/empty value.
    // =========================================================================

    pub fn as_boolean(&self) -> bool {
        self.try_boolean().unwrap_or_default()
    }

    pub fn as_integer16(&self) -> i16 {
        self.try_integer16().unwrap_or_default()
    }

    pub fn as_integer32(&self) -> i32 {
        self.try_integer32().unwrap_or_default()
    }

    pub fn as_integer64(&self) -> i64 {
        self.try_integer64().unwrap_or_default()
    }

    pub fn as_float32(&self) -> f32 {
        self.try_float32().unwrap_or_default()
    }

    pub fn as_float64(&self) -> f64 {
        self.try_float64().unwrap_or_default()
    }

    pub fn as_boolean_array(&self) -> &[bool] {
        self.try_boolean_array().unwrap_or_default()
    }

    pub fn as_integer32_array(&self) -> &[i32] {
        self.try_integer32_array().unwrap_or_default()
    }

    pub fn as_integer64_array(&self) -> &[i64] {
        self.try_integer64_array().unwrap_or_default()
    }

    pub fn as_float32_array(&self) -> &[f32] {
        self.try_float32_array().unwrap_or_default()
    }

    pub fn as_float64_array(&self) -> &[f64] {
        self.try_float64_array().unwrap_or_default()
    }

    /// String payload as text; invalid UTF-8 is replaced. Empty for other
    /// variants.
    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Property::String(bytes) => String::from_utf8_lossy(bytes),
            _ => Cow::Borrowed(""),
        }
    }

    /// Raw payload bytes. Empty for other variants.
    pub fn as_raw(&self) -> &[u8] {
        self.try_raw().unwrap_or_default()
    }

    // =========================================================================
    // Strict accessors
    // =========================================================================

    pub fn try_boolean(&self) -> Result<bool> {
        match self {
            Property::Boolean(v) => Ok(*v),
            other => Err(other.mismatch(PropertyType::Boolean)),
        }
    }

    pub fn try_integer16(&self) -> Result<i16> {
        match self {
            Property::Integer16(v) => Ok(*v),
            other => Err(other.mismatch(PropertyType::Integer16)),
        }
    }

    pub fn try_integer32(&self) -> Result<i32> {
        match self {
            Property::Integer32(v) => Ok(*v),
            other => Err(other.mismatch(PropertyType::Integer32)),
        }
    }

    pub fn try_integer64(&self) -> Result<i64> {
        match self {
            Property::Integer64(v) => Ok(*v),
            other => Err(other.mismatch(PropertyType::Integer64)),
        }
    }

    pub fn try_float32(&self) -> Result<f32> {
        match self {
            Property::Float32(v) => Ok(*v),
            other => Err(other.mismatch(PropertyType::Float32)),
        }
    }

    pub fn try_float64(&self) -> Result<f64> {
        match self {
            Property::Float64(v) => Ok(*v),
            other => Err(other.mismatch(PropertyType::Float64)),
        }
    }

    pub fn try_boolean_array(&self) -> Result<&[bool]> {
        match self {
            Property::BooleanArray(v) => Ok(v),
            other => Err(other.mismatch(PropertyType::BooleanArray)),
        }
    }

    pub fn try_integer32_array(&self) -> Result<&[i32]> {
        match self {
            Property::Integer32Array(v) => Ok(v),
            other => Err(other.mismatch(PropertyType::Integer32Array)),
        }
    }

    pub fn try_integer64_array(&self) -> Result<&[i64]> {
        match self {
            Property::Integer64Array(v) => Ok(v),
            other => Err(other.mismatch(PropertyType::Integer64Array)),
        }
    }

    pub fn try_float32_array(&self) -> Result<&[f32]> {
        match self {
            Property::Float32Array(v) => Ok(v),
            other => Err(other.mismatch(PropertyType::Float32Array)),
        }
    }

    pub fn try_float64_array(&self) -> Result<&[f64]> {
        match self {
            Property::Float64Array(v) => Ok(v),
            other => Err(other.mismatch(PropertyType::Float64Array)),
        }
    }

    /// String payload bytes.
    pub fn try_string(&self) -> Result<&[u8]> {
        match self {
            Property::String(v) => Ok(v),
            other => Err(other.mismatch(PropertyType::String)),
        }
    }

    pub fn try_raw(&self) -> Result<&[u8]> {
        match self {
            Property::Raw(v) => Ok(v),
            other => Err(other.mismatch(PropertyType::Raw)),
        }
    }
}

fn fmt_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Boolean(v) => write!(f, "{}", v),
            Property::Integer16(v) => write!(f, "{}", v),
            Property::Integer32(v) => write!(f, "{}", v),
            Property::Integer64(v) => write!(f, "{}", v),
            Property::Float32(v) => write!(f, "{}", v),
            Property::Float64(v) => write!(f, "{}", v),
            Property::BooleanArray(v) => fmt_list(f, v),
            Property::Integer32Array(v) => fmt_list(f, v),
            Property::Integer64Array(v) => fmt_list(f, v),
            Property::Float32Array(v) => fmt_list(f, v),
            Property::Float64Array(v) => fmt_list(f, v),
            Property::String(_) => write!(f, "{:?}", self.as_str()),
            Property::Raw(v) => write!(f, "RAW[{}]", v.len()),
        }
    }
}

impl From<bool> for Property {
    fn from(v: bool) -> Self {
        Property::Boolean(v)
    }
}

impl From<i16> for Property {
    fn from(v: i16) -> Self {
        Property::Integer16(v)
    }
}

impl From<i32> for Property {
    fn from(v: i32) -> Self {
        Property::Integer32(v)
    }
}

impl From<i64> for Property {
    fn from(v: i64) -> Self {
        Property::Integer64(v)
    }
}

impl From<f32> for Property {
    fn from(v: f32) -> Self {
        Property::Float32(v)
    }
}

impl From<f64> for Property {
    fn from(v: f64) -> Self {
        Property::Float64(v)
    }
}

impl From<Vec<bool>> for Property {
    fn from(v: Vec<bool>) -> Self {
        Property::BooleanArray(v)
    }
}

impl From<Vec<i32>> for Property {
    fn from(v: Vec<i32>) -> Self {
        Property::Integer32Array(v)
    }
}

impl From<Vec<i64>> for Property {
    fn from(v: Vec<i64>) -> Self {
        Property::Integer64Array(v)
    }
}

impl From<Vec<f32>> for Property {
    fn from(v: Vec<f32>) -> Self {
        Property::Float32Array(v)
    }
}

impl From<Vec<f64>> for Property {
    fn from(v: Vec<f64>) -> Self {
        Property::Float64Array(v)
    }
}

impl From<&str> for Property {
    fn from(v: &str) -> Self {
        Property::String(v.as_bytes().to_vec())
    }
}

impl From<String> for Property {
    fn from(v: String) -> Self {
        Property::String(v.into_bytes())
    }
}

/// Ordered properties owned by one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyList {
    items: Vec<Property>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Appends a property, returning a reference to it.
    pub fn push(&mut self, property: impl Into<Property>) -> &mut Property {
        self.items.push(property.into());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Inserts a property at `index`, shifting later ones.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, property: impl Into<Property>) {
        self.items.insert(index, property.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<Property> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[Property] {
        &self.items
    }
}

impl Deref for PropertyList {
    type Target = [Property];

    fn deref(&self) -> &[Property] {
        &self.items
    }
}

impl FromIterator<Property> for PropertyList {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PropertyList {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for PropertyList {
    type Item = Property;
    type IntoIter = std::vec::IntoIter<Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_table() {
        let codes: Vec<u8> = PropertyType::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(codes, b"CYILFDbilfdSR".to_vec());
        for t in PropertyType::ALL {
            assert_eq!(PropertyType::from_code(t.code()), Some(t));
        }
        assert_eq!(PropertyType::from_code(b'X'), None);
        assert_eq!(PropertyType::from_code(0), None);
    }

    #[test]
    fn test_classification() {
        assert!(PropertyType::Float64.is_primitive());
        assert!(!PropertyType::Float64.is_array());
        assert!(PropertyType::BooleanArray.is_array());
        assert!(!PropertyType::BooleanArray.is_primitive());
        assert!(PropertyType::String.is_string());
        assert!(PropertyType::Raw.is_raw());
        assert!(!PropertyType::Raw.is_primitive());
    }

    #[test]
    fn test_size_units() {
        assert_eq!(Property::Boolean(true).size(), 1);
        assert_eq!(Property::Integer16(3).size(), 2);
        assert_eq!(Property::Float32(1.0).size(), 4);
        assert_eq!(Property::Integer64(9).size(), 8);
        // Arrays report elements, not bytes.
        assert_eq!(Property::Float64Array(vec![0.0; 5]).size(), 5);
        assert_eq!(Property::string("mesh").size(), 4);
        assert_eq!(Property::raw(vec![1u8, 2, 3]).size(), 3);
    }

    #[test]
    fn test_lenient_accessors_default_on_mismatch() {
        let p = Property::Integer32(1234567);
        assert_eq!(p.as_integer32(), 1234567);
        assert_eq!(p.as_integer64(), 0);
        assert!(!p.as_boolean());
        assert_eq!(p.as_float64(), 0.0);
        assert!(p.as_float64_array().is_empty());
        assert_eq!(p.as_str(), "");
        assert!(p.as_raw().is_empty());
    }

    #[test]
    fn test_strict_accessors_report_mismatch() {
        let p = Property::from(vec![1i32, 2, 3]);
        assert_eq!(p.try_integer32_array().unwrap(), &[1, 2, 3]);
        let err = p.try_integer64_array().unwrap_err();
        assert!(matches!(
            err,
            Error::PropertyTypeMismatch {
                expected: PropertyType::Integer64Array,
                found: PropertyType::Integer32Array,
            }
        ));
    }

    #[test]
    fn test_string_display() {
        let p = Property::from("mesh");
        assert_eq!(p.property_type(), PropertyType::String);
        assert_eq!(p.as_str(), "mesh");
        assert_eq!(p.to_string(), "\"mesh\"");

        let p = Property::String(vec![b'a', 0xFF]);
        assert_eq!(p.as_str(), "a\u{FFFD}");
    }

    #[test]
    fn test_display_arrays_and_raw() {
        assert_eq!(Property::from(vec![1i64, -2]).to_string(), "[1, -2]");
        assert_eq!(Property::from(vec![true, false]).to_string(), "[true, false]");
        assert_eq!(Property::raw(vec![0u8; 7]).to_string(), "RAW[7]");
        assert_eq!(PropertyType::Float32Array.to_string(), "Float32Array");
    }

    #[test]
    fn test_property_list_order() {
        let mut list = PropertyList::new();
        list.push(1i32);
        list.push("two");
        list.insert(0, true);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], Property::Boolean(true));
        assert_eq!(list[1], Property::Integer32(1));
        assert_eq!(list[2].as_str(), "two");

        assert_eq!(list.remove(0), Some(Property::Boolean(true)));
        assert_eq!(list.remove(5), None);
        assert_eq!(list.len(), 2);
    }
}
