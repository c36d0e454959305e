//! Wire constants and default decode limits.

/// Magic string at the start of every binary FBX file, including its
/// terminating NUL.
pub const MAGIC: &[u8; 21] = b"Kaydara FBX Binary  \x00";

/// Number of magic bytes surfaced to header inspection (the NUL excluded).
pub const MAGIC_LEN: usize = 20;

/// The two bytes written after [`MAGIC`].
pub const HEADER_PAD: [u8; 2] = [0x1A, 0x00];

/// Byte offset of the little-endian `u32` format version.
pub const VERSION_OFFSET: usize = 23;

/// Total header length: magic, padding and version.
pub const HEADER_LEN: usize = 27;

/// Record header: end offset, property count, property list length and
/// name length.
pub const RECORD_HEADER_LEN: usize = 13;

/// A zeroed record header terminates a nested list.
pub const NULL_RECORD: [u8; RECORD_HEADER_LEN] = [0; RECORD_HEADER_LEN];

/// Maximum record name length in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Largest file the 32-bit offset layout can address.
pub const MAX_FILE_LEN: usize = u32::MAX as usize;

/// Property type codes, indexed by [`crate::model::PropertyType`] ordinal.
pub const TYPE_CODES: &[u8; 13] = b"CYILFDbilfdSR";

/// Array encoding: elements stored as raw little-endian bytes.
pub const ARRAY_ENCODING_RAW: u32 = 0;

/// Array encoding: elements stored as a zlib stream.
pub const ARRAY_ENCODING_DEFLATE: u32 = 1;

/// Version written for documents created without an explicit version.
pub const DEFAULT_VERSION: u32 = 7400;

/// Default maximum record nesting depth accepted by the reader.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Default maximum decoded size of a single array property (256 MiB).
pub const DEFAULT_MAX_ARRAY_BYTES: usize = 256 * 1024 * 1024;
