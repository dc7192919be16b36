//! Error taxonomy (spec.md section 7).
//!
//! Classes 1-2 (argument violations, defensively-detected invariant
//! violations) surface as [`EditError`] and are fatal: the caller has a
//! bug and must not re-enter with the same state. Classes 3-4
//! (representability failure on move, collision on insertion) are *not*
//! errors — they are part of the contract and are silent at the API
//! boundary (spec.md section 7, section 4.8).

use core::fmt;

use crate::ids::Segment;

/// A class 1/2 failure: the caller violated a precondition, or the core
/// detected a broken invariant defensively. Both halt the current edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditError {
	/// A primitive required a temporary/colliding wire, got an inserted
	/// one, or vice versa.
	WrongWireKind { segment: Segment, expected_inserted: bool },
	/// The invariant checker (section 4.9) rejected a tree.
	BrokenInvariant(crate::ids::WireId, &'static str),
}

impl fmt::Display for EditError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EditError::WrongWireKind { segment, expected_inserted } => {
				write!(f, "{segment} is {}, expected {}", if segment.wire_id.is_inserted() { "inserted" } else { "uninserted" }, if *expected_inserted { "inserted" } else { "uninserted" })
			}
			EditError::BrokenInvariant(wire, why) => write!(f, "{wire} violates a tree invariant: {why}"),
		}
	}
}

impl std::error::Error for EditError {}

pub type EditResult<T> = Result<T, EditError>;
