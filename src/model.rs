//! Data model for sequence collections.
//!
//! This module contains:
//! - [`SequenceRecord`]: a named, possibly gapped sequence
//! - [`AlignmentCollection`]: an ordered list of records with a lazily built
//!   name index
//!
//! Collections own their records. Any mutable access to a record through the
//! collection (including a rename) drops the name index; it is rebuilt on the
//! next lookup by name.

use std::collections::{HashMap, HashSet};
use std::ops::{Index, RangeBounds};
use std::sync::OnceLock;

use log::debug;

/// Gap character used in aligned sequences.
pub const GAP: char = '-';

/// Name filter for phylogenetics software: whitespace, `,` and `:` become
/// `_`; `()[]<>;=` are removed.
pub const PHYLO_NAME_FILTER: &[(char, Option<char>)] = &[
    (' ', Some('_')),
    ('\t', Some('_')),
    ('\n', Some('_')),
    (',', Some('_')),
    (':', Some('_')),
    ('(', None),
    (')', None),
    ('[', None),
    (']', None),
    ('<', None),
    ('>', None),
    (';', None),
    ('=', None),
];

/// Replaces whitespace in names with `_`.
pub const WHITESPACE_NAME_FILTER: &[(char, Option<char>)] =
    &[(' ', Some('_')), ('\t', Some('_')), ('\n', Some('_'))];

/// Applies a character translation table to `name`.
pub fn translate_name(name: &str, table: &[(char, Option<char>)]) -> String {
    name.chars()
        .filter_map(|c| match table.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => *to,
            None => Some(c),
        })
        .collect()
}

/// A single sequence with its name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceRecord {
    name: String,
    residues: String,
}

impl SequenceRecord {
    /// Creates a new record.
    pub fn new(name: impl Into<String>, residues: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            residues: residues.into(),
        }
    }

    /// Record name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the record.
    ///
    /// For a record held by an [`AlignmentCollection`] use
    /// [`AlignmentCollection::rename`] or go through
    /// [`AlignmentCollection::get_mut`], which keeps the name index coherent.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Residues, gaps included.
    pub fn residues(&self) -> &str {
        &self.residues
    }

    /// Replaces the residues.
    pub fn set_residues(&mut self, residues: impl Into<String>) {
        self.residues = residues.into();
    }

    /// Total length, gaps included.
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// True when the record has no characters at all.
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Number of alphabetic characters.
    pub fn nongaps(&self) -> usize {
        self.residues.chars().filter(|c| c.is_alphabetic()).count()
    }

    /// Number of `-` characters.
    pub fn gaps(&self) -> usize {
        self.residues.chars().filter(|&c| c == GAP).count()
    }

    /// Removes every `-`.
    pub fn strip_gaps(&mut self) -> &mut Self {
        self.residues.retain(|c| c != GAP);
        self
    }

    /// Removes every whitespace character.
    pub fn strip_spaces(&mut self) -> &mut Self {
        self.residues.retain(|c| !c.is_whitespace());
        self
    }

    /// Keeps only the residues between `start` and `end`.
    pub fn trim_to(&mut self, start: Option<usize>, end: Option<usize>) -> &mut Self {
        let len = self.residues.len();
        let end = end.unwrap_or(len).min(len);
        let start = start.unwrap_or(0).min(end);
        self.residues = self.residues.get(start..end).unwrap_or_default().to_string();
        self
    }

    /// Upper-cases ASCII residues in place.
    pub fn to_uppercase(&mut self) -> &mut Self {
        self.residues.make_ascii_uppercase();
        self
    }

    /// Lower-cases ASCII residues in place.
    pub fn to_lowercase(&mut self) -> &mut Self {
        self.residues.make_ascii_lowercase();
        self
    }

    /// Keeps alphabetic characters and `allowed` symbols, upper-cased.
    pub fn clean(&mut self, allowed: &[char]) -> &mut Self {
        self.residues = self
            .residues
            .chars()
            .filter(|c| c.is_alphabetic() || allowed.contains(c))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        self
    }

    /// Rewrites the name through a translation table such as
    /// [`PHYLO_NAME_FILTER`].
    pub fn clean_name(&mut self, table: &[(char, Option<char>)]) -> &mut Self {
        self.name = translate_name(&self.name, table);
        self
    }
}

impl AsRef<str> for SequenceRecord {
    fn as_ref(&self) -> &str {
        &self.residues
    }
}

/// An ordered collection of sequence records.
///
/// Duplicate names are allowed; lookups by name return the first record
/// carrying that name.
#[derive(Debug, Default)]
pub struct AlignmentCollection {
    records: Vec<SequenceRecord>,
    /// Name to position of its first occurrence. Empty cell means stale.
    name_index: OnceLock<HashMap<String, usize>>,
}

impl AlignmentCollection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection from a vector of records.
    pub fn from_records(records: Vec<SequenceRecord>) -> Self {
        Self {
            records,
            name_index: OnceLock::new(),
        }
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the collection holds no record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in order.
    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    /// Iterates over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SequenceRecord> {
        self.records.iter()
    }

    /// Gets a record by position.
    pub fn get(&self, index: usize) -> Option<&SequenceRecord> {
        self.records.get(index)
    }

    /// Mutable access to one record. Invalidates the name index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut SequenceRecord> {
        self.invalidate();
        self.records.get_mut(index)
    }

    /// Mutable access to all records. Invalidates the name index.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SequenceRecord> {
        self.invalidate();
        self.records.iter_mut()
    }

    /// Renames the record at `index`, returning the previous name.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Option<String> {
        let record = self.get_mut(index)?;
        Some(std::mem::replace(&mut record.name, name.into()))
    }

    /// Record names in order.
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name()).collect()
    }

    /// First record with this name.
    pub fn by_name(&self, name: &str) -> Option<&SequenceRecord> {
        self.position(name).map(|i| &self.records[i])
    }

    /// Position of the first record with this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.lookup_table().get(name).copied()
    }

    /// Copies of the records named in `names`, in that order. Unknown names
    /// are skipped.
    pub fn get_named<S: AsRef<str>>(&self, names: &[S]) -> AlignmentCollection {
        names
            .iter()
            .filter_map(|n| self.by_name(n.as_ref()).cloned())
            .collect()
    }

    /// Copies of the records matching `predicate`.
    pub fn get_where<F>(&self, predicate: F) -> AlignmentCollection
    where
        F: Fn(&SequenceRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).cloned().collect()
    }

    /// Deep copy.
    pub fn copy(&self) -> AlignmentCollection {
        AlignmentCollection::from_records(self.records.clone())
    }

    // Structural mutation. Every method drops the name index.

    /// Appends a record.
    pub fn push(&mut self, record: SequenceRecord) {
        self.invalidate();
        self.records.push(record);
    }

    /// Inserts a record at `index`, shifting later ones.
    pub fn insert(&mut self, index: usize, record: SequenceRecord) {
        self.invalidate();
        self.records.insert(index, record);
    }

    /// Removes and returns the record at `index`.
    pub fn remove(&mut self, index: usize) -> SequenceRecord {
        self.invalidate();
        self.records.remove(index)
    }

    /// Removes and returns the last record.
    pub fn pop(&mut self) -> Option<SequenceRecord> {
        self.invalidate();
        self.records.pop()
    }

    /// Replaces the record at `index`, returning the old one.
    pub fn replace(&mut self, index: usize, record: SequenceRecord) -> SequenceRecord {
        self.invalidate();
        std::mem::replace(&mut self.records[index], record)
    }

    /// Replaces a range of records, returning the removed ones.
    pub fn splice<R, I>(&mut self, range: R, records: I) -> Vec<SequenceRecord>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = SequenceRecord>,
    {
        self.invalidate();
        self.records.splice(range, records).collect()
    }

    /// Removes a range of records, returning them.
    pub fn drain<R: RangeBounds<usize>>(&mut self, range: R) -> Vec<SequenceRecord> {
        self.invalidate();
        self.records.drain(range).collect()
    }

    /// Appends copies of `other`'s records.
    pub fn append_copies(&mut self, other: &AlignmentCollection) -> &mut Self {
        self.extend(other.records.iter().cloned());
        self
    }

    /// Repeats the current records so the collection holds `times` copies.
    /// `times == 0` empties it.
    pub fn repeat(&mut self, times: usize) -> &mut Self {
        self.invalidate();
        let total = self.records.len() * times;
        self.records = self.records.iter().cycle().take(total).cloned().collect();
        self
    }

    /// Removes every record matching `predicate` and returns them.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> AlignmentCollection
    where
        F: FnMut(&SequenceRecord) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.records).into_iter().partition(|r| predicate(r));
        self.records = kept;
        self.invalidate();
        if !removed.is_empty() {
            debug!("Removed {} of {} records", removed.len(), removed.len() + self.len());
        }
        AlignmentCollection::from_records(removed)
    }

    // Filtering. Offending records are found in one pass, then removed.

    /// Removes records without any residue.
    pub fn remove_empty(&mut self) -> &mut Self {
        self.remove_shorter(1)
    }

    /// Removes records with fewer than `size` non-gap residues.
    pub fn remove_shorter(&mut self, size: usize) -> &mut Self {
        self.remove_where(|r| r.nongaps() < size);
        self
    }

    /// Removes records with more than `size` non-gap residues.
    pub fn remove_longer(&mut self, size: usize) -> &mut Self {
        self.remove_where(|r| r.nongaps() > size);
        self
    }

    /// Removes records whose residues repeat an earlier record's, keeping
    /// the first occurrence.
    pub fn make_unique(&mut self) -> &mut Self {
        self.take_duplicates();
        self
    }

    /// Like [`make_unique`](Self::make_unique) but returns the removed
    /// records.
    pub fn take_duplicates(&mut self) -> AlignmentCollection {
        let duplicate: Vec<bool> = {
            let mut seen = HashSet::new();
            self.records
                .iter()
                .map(|r| !seen.insert(r.residues.as_str()))
                .collect()
        };
        let mut flags = duplicate.into_iter();
        self.remove_where(|_| flags.next().unwrap_or(false))
    }

    // Sequence manipulation, applied to every record.

    /// See [`SequenceRecord::clean`].
    pub fn clean(&mut self, allowed: &[char]) -> &mut Self {
        self.records.iter_mut().for_each(|r| {
            r.clean(allowed);
        });
        self
    }

    /// See [`SequenceRecord::strip_gaps`].
    pub fn strip_gaps(&mut self) -> &mut Self {
        self.records.iter_mut().for_each(|r| {
            r.strip_gaps();
        });
        self
    }

    /// See [`SequenceRecord::strip_spaces`].
    pub fn strip_spaces(&mut self) -> &mut Self {
        self.records.iter_mut().for_each(|r| {
            r.strip_spaces();
        });
        self
    }

    /// See [`SequenceRecord::trim_to`].
    pub fn trim_to(&mut self, start: Option<usize>, end: Option<usize>) -> &mut Self {
        self.records.iter_mut().for_each(|r| {
            r.trim_to(start, end);
        });
        self
    }

    /// See [`SequenceRecord::to_uppercase`].
    pub fn to_uppercase(&mut self) -> &mut Self {
        self.records.iter_mut().for_each(|r| {
            r.to_uppercase();
        });
        self
    }

    /// Rewrites every name through `table`.
    pub fn clean_names(&mut self, table: &[(char, Option<char>)]) -> &mut Self {
        self.iter_mut().for_each(|r| {
            r.clean_name(table);
        });
        self
    }

    /// Appends a counter to repeated names so all are unique.
    ///
    /// `pattern` takes `{name}` and `{n}` placeholders, or two positional
    /// `{}` standing for them in that order. The first record with a given
    /// name keeps it unchanged, later ones become `pattern` with
    /// `n = 2, 3, ...`. A pattern without a counter gets `_{n}` appended.
    pub fn make_names_unique(&mut self, pattern: &str) -> &mut Self {
        let pattern = counter_pattern(pattern);
        let mut used: HashSet<String> = self.records.iter().map(|r| r.name.clone()).collect();
        let mut seen: HashSet<String> = HashSet::new();
        for record in self.iter_mut() {
            if seen.insert(record.name.clone()) {
                continue;
            }
            let mut n = 2;
            let renamed = loop {
                let candidate = pattern
                    .replace("{name}", &record.name)
                    .replace("{n}", &n.to_string());
                if !used.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            used.insert(renamed.clone());
            seen.insert(renamed.clone());
            record.name = renamed;
        }
        self
    }

    // Derived properties.

    /// Sum of all record lengths.
    pub fn size(&self) -> usize {
        self.records.iter().map(|r| r.len()).sum()
    }

    /// Alphabetic characters over all records.
    pub fn nongaps(&self) -> usize {
        self.records.iter().map(|r| r.nongaps()).sum()
    }

    /// Gaps over all records.
    pub fn gaps(&self) -> usize {
        self.records.iter().map(|r| r.gaps()).sum()
    }

    /// True when there is at least one record and all lengths are equal.
    pub fn is_alignment(&self) -> bool {
        self.alignment_length().is_some()
    }

    /// The shared record length, if the collection is an alignment.
    pub fn alignment_length(&self) -> Option<usize> {
        let first = self.records.first()?.len();
        self.records.iter().all(|r| r.len() == first).then_some(first)
    }

    /// Non-gap length of every record, in order.
    pub fn lengths(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.nongaps()).collect()
    }

    fn lookup_table(&self) -> &HashMap<String, usize> {
        self.name_index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.records.len());
            for (i, record) in self.records.iter().enumerate() {
                index.entry(record.name.clone()).or_insert(i);
            }
            index
        })
    }

    fn invalidate(&mut self) {
        self.name_index.take();
    }

    #[cfg(test)]
    fn index_is_built(&self) -> bool {
        self.name_index.get().is_some()
    }
}

/// Normalises a renaming pattern so it always carries `{n}`.
fn counter_pattern(pattern: &str) -> String {
    let mut pattern = if pattern.contains("{name}") || pattern.contains("{n}") {
        pattern.to_string()
    } else {
        pattern.replacen("{}", "{name}", 1).replacen("{}", "{n}", 1)
    };
    if !pattern.contains("{n}") {
        pattern.push_str("_{n}");
    }
    pattern
}

impl Clone for AlignmentCollection {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl PartialEq for AlignmentCollection {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Index<usize> for AlignmentCollection {
    type Output = SequenceRecord;

    fn index(&self, index: usize) -> &SequenceRecord {
        &self.records[index]
    }
}

impl FromIterator<SequenceRecord> for AlignmentCollection {
    fn from_iter<I: IntoIterator<Item = SequenceRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

impl Extend<SequenceRecord> for AlignmentCollection {
    fn extend<I: IntoIterator<Item = SequenceRecord>>(&mut self, iter: I) {
        self.invalidate();
        self.records.extend(iter);
    }
}

impl IntoIterator for AlignmentCollection {
    type Item = SequenceRecord;
    type IntoIter = std::vec::IntoIter<SequenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a AlignmentCollection {
    type Item = &'a SequenceRecord;
    type IntoIter = std::slice::Iter<'a, SequenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
