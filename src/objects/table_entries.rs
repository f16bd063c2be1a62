//! Table entry prefix and the keyed entry collection of a control object.

use indexmap::IndexMap;

use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::objects::ObjectId;
use crate::types::Handle;

/// Fields shared by every table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntryData {
    pub name: String,
    /// Entry was referenced by an entity when the drawing was last edited
    pub flag_64: bool,
    /// Index of the xref the entry comes from, -1 when local
    pub xref_index: i16,
    pub xref_dependent: bool,
    pub xref_block: HandleReference,
}

impl Default for TableEntryData {
    fn default() -> Self {
        Self {
            name: String::new(),
            flag_64: false,
            xref_index: -1,
            xref_dependent: false,
            xref_block: HandleReference::null_of(DwgReferenceType::HardPointer),
        }
    }
}

impl TableEntryData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// TV name, B 64-flag, BS xref index + 1, B xref dependent.
    pub(crate) fn visit_prefix<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        io.text(&mut self.name)?;
        io.bit(&mut self.flag_64)?;
        let mut stored = self.xref_index.wrapping_add(1);
        io.bit_short(&mut stored)?;
        if io.is_reading() {
            self.xref_index = stored.wrapping_sub(1);
        }
        io.bit(&mut self.xref_dependent)
    }

    /// The xref block handle opening every entry's post data.
    pub(crate) fn visit_xref_block<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        io.handle(&mut self.xref_block)
    }
}

/// Entries of a control object keyed by name, compared case-insensitively,
/// in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableEntries {
    entries: IndexMap<String, ObjectId>,
}

impl TableEntries {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_uppercase()
    }

    /// Add an entry under `name`. A name already taken is malformed.
    pub fn add(&mut self, name: &str, id: ObjectId, control: Handle) -> Result<()> {
        let key = Self::key(name);
        if self.entries.contains_key(&key) {
            return Err(DwgError::malformed(
                control,
                format!("duplicate table entry '{}'", name),
            ));
        }
        self.entries.insert(key, id);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.entries.get(&Self::key(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&Self::key(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<ObjectId> {
        self.entries.shift_remove(&Self::key(name))
    }

    /// Move an entry to a new name, keeping its position.
    pub fn rename(&mut self, old: &str, new: &str, control: Handle) -> Result<()> {
        let new_key = Self::key(new);
        let old_key = Self::key(old);
        if new_key != old_key && self.entries.contains_key(&new_key) {
            return Err(DwgError::malformed(
                control,
                format!("duplicate table entry '{}'", new),
            ));
        }
        if let Some(index) = self.entries.get_index_of(&old_key) {
            if let Some((_, id)) = self.entries.shift_remove_index(index) {
                self.entries.shift_insert(index, new_key, id);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.entries.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ObjectId)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::reader::DwgStreamReader;
    use crate::io::dwg::writer::DwgStreamWriter;
    use crate::types::DwgVersion;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut entries = TableEntries::new();
        entries.add("Walls", ObjectId(3), Handle::new(2)).unwrap();
        assert_eq!(entries.get("WALLS"), Some(ObjectId(3)));
        assert!(entries.contains("walls"));
        assert!(entries.add("wAlLs", ObjectId(4), Handle::new(2)).is_err());
    }

    #[test]
    fn test_insertion_order() {
        let mut entries = TableEntries::new();
        for (i, name) in ["0", "DOORS", "AXES"].iter().enumerate() {
            entries.add(name, ObjectId(i), Handle::new(2)).unwrap();
        }
        entries.remove("doors");
        let ids: Vec<_> = entries.ids().collect();
        assert_eq!(ids, vec![ObjectId(0), ObjectId(2)]);
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut entries = TableEntries::new();
        entries.add("A", ObjectId(0), Handle::NULL).unwrap();
        entries.add("B", ObjectId(1), Handle::NULL).unwrap();
        entries.rename("a", "C", Handle::NULL).unwrap();
        let names: Vec<_> = entries.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["C", "B"]);
        assert!(entries.rename("C", "b", Handle::NULL).is_err());
    }

    #[test]
    fn test_prefix_stores_xref_index_plus_one() {
        let mut entry = TableEntryData::new("STANDARD");
        let mut writer = DwgStreamWriter::new(DwgVersion::AC1015);
        entry.visit_prefix(&mut writer).unwrap();
        let bytes = writer.finish();

        let mut reader = DwgStreamReader::new(&bytes, DwgVersion::AC1015);
        assert_eq!(reader.read_variable_text().unwrap(), "STANDARD");
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_bit_short().unwrap(), 0);

        let mut reader = DwgStreamReader::new(&bytes, DwgVersion::AC1015);
        let mut parsed = TableEntryData::default();
        parsed.visit_prefix(&mut reader).unwrap();
        assert_eq!(parsed.xref_index, -1);
        assert_eq!(parsed.name, "STANDARD");
    }
}
