//! Named tree nodes.

use crate::error::{Error, Result};
use crate::limits::MAX_NAME_LEN;
use crate::model::{Property, PropertyList};

/// Handle to a record stored in a [`crate::Document`].
///
/// Handles are never reused within a document, so a handle to a removed
/// record stays dead instead of aliasing a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub(crate) usize);

impl RecordId {
    /// Arena slot of this record.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Checks that `name` fits the one-byte length prefix.
pub fn validate_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong { len: name.len() });
    }
    Ok(())
}

/// A named node carrying properties and child records.
///
/// The document owns every record. `parent` is a plain handle and never
/// keeps anything alive; child order is the serialization order.
///
/// Records are not `PartialEq`; their handles only mean something inside
/// one document. Compare documents instead.
#[derive(Debug, Clone)]
pub struct Record {
    name: String,
    properties: PropertyList,
    pub(crate) parent: Option<RecordId>,
    pub(crate) children: Vec<RecordId>,
}

impl Record {
    pub(crate) fn new(name: String) -> Result<Self> {
        validate_name(&name)?;
        Ok(Self {
            name,
            properties: PropertyList::new(),
            parent: None,
            children: Vec::new(),
        })
    }

    pub(crate) fn with_properties(name: String, properties: PropertyList) -> Result<Self> {
        let mut record = Self::new(name)?;
        record.properties = properties;
        Ok(record)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the record. Names longer than 255 bytes are rejected and
    /// leave the record unchanged.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyList {
        &mut self.properties
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn property(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    /// Appends a property.
    pub fn push(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property);
        self
    }

    /// Parent record, or `None` for a root.
    pub fn parent(&self) -> Option<RecordId> {
        self.parent
    }

    pub fn children(&self) -> &[RecordId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
