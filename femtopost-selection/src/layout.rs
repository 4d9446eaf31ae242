//! Grouping of partition rows into tracks and V0 decay triplets.
//!
//! A V0 row is followed by its positive daughter at `+1` and its negative
//! daughter at `+2`. The layout records that grouping once per partition so
//! the scan never indexes past the end of a table.

use crate::error::Result;
use femtopost_core::{Error as CoreError, PartType, Partition};

/// How strictly the V0/daughter adjacency is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripletPolicy {
    /// Only the bounds are checked. A V0 too close to the end becomes a
    /// [`RowEntry::DanglingV0`], which ends the scan of its partition.
    #[default]
    Lenient,
    /// A dangling V0 or a daughter slot that is not a V0 child fails the
    /// partition.
    Strict,
}

/// Role of one row in the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEntry {
    /// Track candidate.
    Track,
    /// V0 row with its daughter rows.
    Triplet { v0: usize, pos: usize, neg: usize },
    /// V0 row whose daughters would lie outside the partition.
    DanglingV0,
    /// Row not dispatched on its own (V0 child or unknown type).
    Passive,
}

/// Per-row entries of one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    entries: Vec<RowEntry>,
}

impl RowLayout {
    /// Classifies every row of `partition`.
    ///
    /// # Errors
    /// Under [`TripletPolicy::Strict`], returns [`CoreError::TripletLayout`]
    /// naming the partition and row of the first malformed triplet.
    pub fn build(partition: &Partition, policy: TripletPolicy) -> Result<Self> {
        let rows = partition.len();
        let mut entries = Vec::with_capacity(rows);
        for row in 0..rows {
            let entry = match partition.part_type(row) {
                PartType::Track => RowEntry::Track,
                PartType::V0 if row + 2 < rows => {
                    if policy == TripletPolicy::Strict {
                        check_daughter(partition, row, row + 1)?;
                        check_daughter(partition, row, row + 2)?;
                    }
                    RowEntry::Triplet {
                        v0: row,
                        pos: row + 1,
                        neg: row + 2,
                    }
                }
                PartType::V0 => {
                    if policy == TripletPolicy::Strict {
                        return Err(layout_error(
                            partition,
                            row,
                            format!("V0 needs daughter rows {} and {}, partition has {rows} rows", row + 1, row + 2),
                        ));
                    }
                    RowEntry::DanglingV0
                }
                PartType::V0Child | PartType::Other(_) => RowEntry::Passive,
            };
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry of `row`.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn entry(&self, row: usize) -> RowEntry {
        self.entries[row]
    }

    pub fn iter(&self) -> impl Iterator<Item = RowEntry> + '_ {
        self.entries.iter().copied()
    }

    /// Number of complete triplets.
    #[must_use]
    pub fn triplets(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, RowEntry::Triplet { .. }))
            .count()
    }
}

fn check_daughter(partition: &Partition, v0: usize, row: usize) -> Result<()> {
    match partition.part_type(row) {
        PartType::V0Child => Ok(()),
        other => Err(layout_error(
            partition,
            row,
            format!("daughter slot of V0 at row {v0} holds {other:?}"),
        )),
    }
}

fn layout_error(partition: &Partition, row: usize, reason: String) -> crate::Error {
    CoreError::TripletLayout {
        partition: partition.name().to_string(),
        row,
        reason,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, RowSpec};

    fn partition(types: &[u8]) -> Partition {
        Fixture::new()
            .collision(0.0, 1.0)
            .rows(types.iter().map(|&part_type| RowSpec {
                part_type,
                ..RowSpec::track()
            }))
            .build()
    }

    #[test]
    fn test_lenient_layout() {
        let layout = RowLayout::build(&partition(&[0, 1, 2, 2, 0, 1, 2]), TripletPolicy::Lenient).unwrap();
        assert_eq!(
            layout.iter().collect::<Vec<_>>(),
            vec![
                RowEntry::Track,
                RowEntry::Triplet { v0: 1, pos: 2, neg: 3 },
                RowEntry::Passive,
                RowEntry::Passive,
                RowEntry::Track,
                RowEntry::DanglingV0,
                RowEntry::Passive,
            ]
        );
        assert_eq!(layout.triplets(), 1);
    }

    #[test]
    fn test_lenient_ignores_daughter_types() {
        let layout = RowLayout::build(&partition(&[1, 0, 9]), TripletPolicy::Lenient).unwrap();
        assert_eq!(layout.entry(0), RowEntry::Triplet { v0: 0, pos: 1, neg: 2 });
        assert_eq!(layout.entry(1), RowEntry::Track);
        assert_eq!(layout.entry(2), RowEntry::Passive);
    }

    #[test]
    fn test_strict_rejects_dangling_v0() {
        let err = RowLayout::build(&partition(&[0, 0, 0, 1, 2]), TripletPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Core(CoreError::TripletLayout { row: 3, .. })
        ));
    }

    #[test]
    fn test_strict_rejects_wrong_daughter_type() {
        let err = RowLayout::build(&partition(&[1, 2, 0]), TripletPolicy::Strict).unwrap_err();
        assert!(err.to_string().contains("DF_1, row 2"));
        assert!(RowLayout::build(&partition(&[1, 2, 2, 0]), TripletPolicy::Strict).is_ok());
    }
}
