//! Segment and wire addressing vocabulary (spec.md section 3).

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::part::Part;

/// `wire_id_t`. `0` is the temporary aggregate, `1` is the colliding
/// aggregate, `>= 2` are inserted wires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireId(u32);

impl WireId {
	pub const TEMPORARY: WireId = WireId(0);
	pub const COLLIDING: WireId = WireId(1);

	pub(crate) const fn from_raw(raw: u32) -> Self {
		Self(raw)
	}

	pub fn raw(self) -> u32 {
		self.0
	}

	pub fn is_inserted(self) -> bool {
		self.0 >= 2
	}

	pub fn is_temporary(self) -> bool {
		self == Self::TEMPORARY
	}

	pub fn is_colliding(self) -> bool {
		self == Self::COLLIDING
	}
}

impl fmt::Display for WireId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			WireId::TEMPORARY => write!(f, "wire(temporary)"),
			WireId::COLLIDING => write!(f, "wire(colliding)"),
			other => write!(f, "wire({})", other.0),
		}
	}
}

/// Dense index into a wire's segment list. Invalidated by swap-delete and
/// merge, except that the swapped-in index is the former last index.
pub type SegmentIndex = usize;

/// `segment_t`: addresses one segment by wire and dense index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Segment {
	pub wire_id: WireId,
	pub index: SegmentIndex,
}

impl Segment {
	pub fn new(wire_id: WireId, index: SegmentIndex) -> Self {
		Self { wire_id, index }
	}
}

impl fmt::Display for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}[{}]", self.wire_id, self.index)
	}
}

/// `segment_key_t`: a stable opaque id tracked across swap-delete, merge
/// and split. Used as the undo-stack address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentKey(u64);

impl SegmentKey {
	pub(crate) const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}
}

impl fmt::Display for SegmentKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "key#{}", self.0)
	}
}

/// `segment_part_t`: a segment together with a sub-range of its line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPart {
	pub segment: Segment,
	pub part: Part,
}

impl SegmentPart {
	pub fn new(segment: Segment, part: Part) -> Self {
		Self { segment, part }
	}
}
