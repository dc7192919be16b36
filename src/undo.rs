//! Undo records (spec.md section 6, "the core exposes... undo-record
//! types") and the stack the core pushes them onto.
//!
//! Stack framing (redo, grouping into one user-visible action) belongs to
//! the caller (spec.md section 1, non-goals); `UndoLog` here is just the
//! `Vec` the public operations push onto and the tests replay against, in
//! the spirit of the teacher's small owned replay structures
//! (`circuit/script.rs`'s `Test`).

use crate::grid::{Endpoints, Grid, Offset, OrderedLine};
use crate::ids::SegmentKey;
use crate::part::Part;

/// One inverse primitive, addressed by stable key rather than raw index
/// (spec.md section 6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UndoRecord {
	SegmentCreateTemporary { key: SegmentKey, line: OrderedLine, endpoints: Endpoints },
	SegmentDeleteTemporary { key: SegmentKey },
	SegmentMoveTemporary { key: SegmentKey, delta: (Grid, Grid) },
	SegmentCollidingToTemporary { key: SegmentKey, part: Part },
	SegmentTemporaryToColliding { key: SegmentKey, part: Part },
	SegmentCollidingToInsert { key: SegmentKey, part: Part },
	SegmentInsertToColliding { key: SegmentKey, part: Part },
	SegmentSetEndpoints { key: SegmentKey, endpoints: Endpoints },
	SegmentMerge { keep_key: SegmentKey, delete_key: SegmentKey },
	SegmentSplit { source_key: SegmentKey, new_key: SegmentKey, split_offset: Offset },
}

/// The stack public operations push inverse records onto.
#[derive(Clone, Debug, Default)]
pub struct UndoLog {
	records: Vec<UndoRecord>,
}

impl UndoLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, record: UndoRecord) {
		self.records.push(record);
	}

	pub fn pop(&mut self) -> Option<UndoRecord> {
		self.records.pop()
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &UndoRecord> {
		self.records.iter()
	}
}
