//! Data model types for FBX documents.
//!
//! - Properties (typed scalars, arrays, strings and raw blobs)
//! - Records (named tree nodes)
//! - Documents (version plus record forest)

pub mod document;
pub mod property;
pub mod record;

pub use document::{Document, Walk};
pub use property::{Property, PropertyList, PropertyType};
pub use record::{validate_name, Record, RecordId};
