//! The top-level container: format version plus an ordered forest of
//! records.

use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};
use crate::limits::DEFAULT_VERSION;
use crate::model::{Record, RecordId};

/// A decoded (or hand-built) FBX document.
///
/// Records live in an arena owned by the document. Each record appears in
/// exactly one sibling list, either [`Document::roots`] or its parent's
/// children, and its `parent` handle always names the owner of that list.
/// Removing a record removes its whole subtree.
///
/// Removed slots are tombstoned, never recycled: a stale [`RecordId`]
/// keeps failing instead of aliasing a newer record. The arena therefore
/// grows with every record ever created; rebuild the document (for
/// example by encoding and decoding it) to compact it.
#[derive(Debug, Clone)]
pub struct Document {
    version: u32,
    roots: Vec<RecordId>,
    records: Vec<Option<Record>>,
    live: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION)
    }
}

impl Document {
    /// Creates an empty document with the given format version.
    pub fn new(version: u32) -> Self {
        Self {
            version,
            roots: Vec::new(),
            records: Vec::new(),
            live: 0,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    /// Number of live records in the document.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Top-level records in order.
    pub fn roots(&self) -> &[RecordId] {
        &self.roots
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Like [`Document::get`], failing with `RecordNotFound`.
    pub fn record(&self, id: RecordId) -> Result<&Record> {
        self.get(id).ok_or(Error::RecordNotFound { id })
    }

    /// Like [`Document::get_mut`], failing with `RecordNotFound`.
    pub fn record_mut(&mut self, id: RecordId) -> Result<&mut Record> {
        self.get_mut(id).ok_or(Error::RecordNotFound { id })
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    // =========================================================================
    // Tree editing
    // =========================================================================

    /// Creates a record and appends it to `parent`'s children, or to the
    /// roots when `parent` is `None`.
    pub fn create_record(
        &mut self,
        name: impl Into<String>,
        parent: Option<RecordId>,
    ) -> Result<RecordId> {
        let record = Record::new(name.into())?;
        if let Some(parent) = parent {
            self.record(parent)?;
        }
        Ok(self.attach_new(record, parent))
    }

    /// Appends a freshly built record. `parent` must be live.
    pub(crate) fn attach_new(&mut self, mut record: Record, parent: Option<RecordId>) -> RecordId {
        let id = RecordId(self.records.len());
        record.parent = parent;
        self.records.push(Some(record));
        self.live += 1;
        self.list_mut(parent).push(id);
        id
    }

    /// Moves `id` (with its subtree) to the end of `parent`'s children.
    pub fn insert(&mut self, id: RecordId, parent: Option<RecordId>) -> Result<()> {
        self.insert_at(id, parent, usize::MAX)
    }

    /// Moves `id` (with its subtree) to position `index` of `parent`'s
    /// children, detaching it from its current list first. `index` is
    /// clamped to the list length; `0` inserts at the front.
    ///
    /// Fails without changing anything if either record is unknown or if
    /// `parent` lies inside the subtree of `id`.
    pub fn insert_at(&mut self, id: RecordId, parent: Option<RecordId>, index: usize) -> Result<()> {
        self.record(id)?;
        let mut cursor = parent;
        while let Some(current) = cursor {
            if current == id {
                return Err(Error::CyclicInsert { id });
            }
            cursor = self.record(current)?.parent;
        }

        self.detach(id);
        let list = self.list_mut(parent);
        let index = index.min(list.len());
        list.insert(index, id);
        if let Some(record) = self.get_mut(id) {
            record.parent = parent;
        }
        Ok(())
    }

    /// Removes `id` and its entire subtree, returning the removed record.
    pub fn remove(&mut self, id: RecordId) -> Result<Record> {
        self.record(id)?;
        self.detach(id);

        let removed = self.records[id.0].take().ok_or(Error::RecordNotFound { id })?;
        self.live -= 1;

        let mut stack: Vec<RecordId> = removed.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(record) = self.records[child.0].take() {
                self.live -= 1;
                stack.extend_from_slice(&record.children);
            }
        }
        Ok(removed)
    }

    /// Removes every record. The version is kept, and handles issued
    /// before the call stay dead.
    pub fn clear(&mut self) {
        self.roots.clear();
        for slot in &mut self.records {
            *slot = None;
        }
        self.live = 0;
    }

    fn detach(&mut self, id: RecordId) {
        let parent = self.get(id).and_then(Record::parent);
        let list = self.list_mut(parent);
        if let Some(pos) = list.iter().position(|&c| c == id) {
            list.remove(pos);
        }
    }

    fn list_mut(&mut self, parent: Option<RecordId>) -> &mut Vec<RecordId> {
        match parent {
            None => &mut self.roots,
            Some(p) => match self.records.get_mut(p.0).and_then(Option::as_mut) {
                Some(record) => &mut record.children,
                // Callers validate `parent` first.
                None => &mut self.roots,
            },
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Sibling list under `parent` (the roots for `None`). Empty for an
    /// unknown parent.
    pub fn children(&self, parent: Option<RecordId>) -> &[RecordId] {
        match parent {
            None => &self.roots,
            Some(p) => self.get(p).map(Record::children).unwrap_or_default(),
        }
    }

    pub fn parent(&self, id: RecordId) -> Option<RecordId> {
        self.get(id).and_then(Record::parent)
    }

    fn sibling_position(&self, id: RecordId) -> Option<(&[RecordId], usize)> {
        let record = self.get(id)?;
        let list = self.children(record.parent);
        let pos = list.iter().position(|&c| c == id)?;
        Some((list, pos))
    }

    pub fn next_sibling(&self, id: RecordId) -> Option<RecordId> {
        let (list, pos) = self.sibling_position(id)?;
        list.get(pos + 1).copied()
    }

    pub fn prev_sibling(&self, id: RecordId) -> Option<RecordId> {
        let (list, pos) = self.sibling_position(id)?;
        pos.checked_sub(1).map(|p| list[p])
    }

    /// First record named `name` under `parent`.
    pub fn find(&self, parent: Option<RecordId>, name: &str) -> Option<RecordId> {
        self.find_all(parent, name).next()
    }

    /// All records named `name` under `parent`, in order.
    pub fn find_all<'a>(
        &'a self,
        parent: Option<RecordId>,
        name: &'a str,
    ) -> impl Iterator<Item = RecordId> + 'a {
        self.children(parent)
            .iter()
            .copied()
            .filter(move |&id| self.get(id).is_some_and(|r| r.name() == name))
    }

    /// Pre-order traversal of the whole document.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self, self.roots.clone())
    }

    /// Pre-order traversal of the subtree rooted at `id` (inclusive).
    pub fn walk_from(&self, id: RecordId) -> Walk<'_> {
        let start = if self.contains(id) { vec![id] } else { Vec::new() };
        Walk::new(self, start)
    }
}

impl Index<RecordId> for Document {
    type Output = Record;

    /// # Panics
    ///
    /// Panics if the record was removed or belongs to another document.
    fn index(&self, id: RecordId) -> &Record {
        match self.get(id) {
            Some(record) => record,
            None => panic!("record {id:?} does not exist"),
        }
    }
}

impl IndexMut<RecordId> for Document {
    fn index_mut(&mut self, id: RecordId) -> &mut Record {
        match self.get_mut(id) {
            Some(record) => record,
            None => panic!("record {id:?} does not exist"),
        }
    }
}

/// Structural equality: same version and the same names, properties and
/// nesting in the same order. Record handles are not compared.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        if self.version != other.version || self.roots.len() != other.roots.len() {
            return false;
        }
        let mut stack: Vec<(RecordId, RecordId)> =
            self.roots.iter().copied().zip(other.roots.iter().copied()).collect();
        while let Some((a, b)) = stack.pop() {
            let (Some(a), Some(b)) = (self.get(a), other.get(b)) else {
                return false;
            };
            if a.name() != b.name()
                || a.properties() != b.properties()
                || a.children.len() != b.children.len()
            {
                return false;
            }
            stack.extend(a.children.iter().copied().zip(b.children.iter().copied()));
        }
        true
    }
}

/// Depth-first, pre-order iterator yielding `(depth, id)`; roots have
/// depth 0. Uses an explicit stack.
pub struct Walk<'a> {
    document: &'a Document,
    stack: Vec<(usize, RecordId)>,
}

impl<'a> Walk<'a> {
    fn new(document: &'a Document, start: Vec<RecordId>) -> Self {
        let stack = start.into_iter().rev().map(|id| (0, id)).collect();
        Self { document, stack }
    }
}

impl Iterator for Walk<'_> {
    type Item = (usize, RecordId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        if let Some(record) = self.document.get(id) {
            self.stack
                .extend(record.children().iter().rev().map(|&c| (depth + 1, c)));
        }
        Some((depth, id))
    }
}
