//! Part algebra: sub-ranges of a line addressed by `[begin, end)` offsets
//! (spec.md section 4.1).
//!
//! Every length-bearing wire operation (move, remove, valid-part edits)
//! dispatches on the same three-way classification computed here: the
//! selected part either equals the full part, touches one side of it, or
//! splits it in two. `classify` is the single place that decision is made;
//! everything else matches on its result.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::grid::{Offset, OrderedLine};

/// `part_t`: a closed-open sub-range `[begin, end)` of a line, in offset
/// units from the line's `p0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Part {
	pub begin: Offset,
	pub end: Offset,
}

/// Failure constructing a `Part`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyPartError;

impl fmt::Display for EmptyPartError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "part must have begin < end")
	}
}

impl std::error::Error for EmptyPartError {}

impl Part {
	pub fn new(begin: Offset, end: Offset) -> Result<Self, EmptyPartError> {
		if begin < end {
			Ok(Self { begin, end })
		} else {
			Err(EmptyPartError)
		}
	}

	pub fn len(&self) -> Offset {
		self.end - self.begin
	}
}

/// The full part of a line, i.e. `[0, line.length())`.
pub fn to_part(line: &OrderedLine) -> Part {
	Part { begin: 0, end: line.length() }
}

pub fn a_equal_b(a: Part, b: Part) -> bool {
	a == b
}

pub fn a_inside_b(a: Part, b: Part) -> bool {
	b.begin <= a.begin && a.end <= b.end
}

pub fn a_inside_b_touching_one_side(a: Part, b: Part) -> bool {
	a_inside_b(a, b) && ((a.begin == b.begin) != (a.end == b.end))
}

pub fn a_inside_b_not_touching(a: Part, b: Part) -> bool {
	a_inside_b(a, b) && a.begin > b.begin && a.end < b.end
}

/// Whether two parts of the same line overlap at all.
pub fn overlaps(a: Part, b: Part) -> bool {
	a.begin < b.end && b.begin < a.end
}

/// Whether `a` overlaps any part of a sorted, disjoint set.
pub fn a_overlaps_any_of_b(a: Part, parts: &[Part]) -> bool {
	parts.iter().any(|&b| overlaps(a, b))
}

/// The remaining part after removing `removed` from one side of `full`.
///
/// Requires `removed` to be inside `full` and touching exactly one side;
/// this is an argument-violation (class 1, spec.md section 7) otherwise.
pub fn difference_touching_one_side(full: Part, removed: Part) -> Part {
	assert!(a_inside_b_touching_one_side(removed, full), "parts are not touching on exactly one side");
	if removed.begin == full.begin {
		Part { begin: removed.end, end: full.end }
	} else {
		Part { begin: full.begin, end: removed.begin }
	}
}

/// Splits `full` into the two parts left over after removing the strictly
/// interior `removed`.
///
/// Requires `removed` to be strictly inside `full` (touching neither
/// side); an argument violation otherwise.
pub fn difference_not_touching(full: Part, removed: Part) -> (Part, Part) {
	assert!(a_inside_b_not_touching(removed, full), "part does not split the full range");
	(Part { begin: full.begin, end: removed.begin }, Part { begin: removed.end, end: full.end })
}

/// The three-way dispatch every move/remove/valid-part primitive uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartLocation {
	/// `selected` is the entire `full` range.
	Full,
	/// `selected` touches exactly one side of `full`; `kept` is what is
	/// left of `full` once `selected` is removed.
	TouchingOneSide { kept: Part },
	/// `selected` is strictly interior to `full`; `left`/`right` are what
	/// remains on either side.
	Splitting { left: Part, right: Part },
}

/// Classifies `selected` against `full`. `selected` must be inside `full`.
pub fn classify(full: Part, selected: Part) -> PartLocation {
	assert!(a_inside_b(selected, full), "selected part is not inside the full part");
	if a_equal_b(full, selected) {
		PartLocation::Full
	} else if a_inside_b_touching_one_side(selected, full) {
		PartLocation::TouchingOneSide { kept: difference_touching_one_side(full, selected) }
	} else {
		let (left, right) = difference_not_touching(full, selected);
		PartLocation::Splitting { left, right }
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn p(begin: Offset, end: Offset) -> Part {
		Part::new(begin, end).unwrap()
	}

	#[test]
	fn classify_full() {
		assert_eq!(classify(p(0, 10), p(0, 10)), PartLocation::Full);
	}

	#[test]
	fn classify_touching_left() {
		assert_eq!(
			classify(p(0, 10), p(0, 4)),
			PartLocation::TouchingOneSide { kept: p(4, 10) }
		);
	}

	#[test]
	fn classify_touching_right() {
		assert_eq!(
			classify(p(0, 10), p(6, 10)),
			PartLocation::TouchingOneSide { kept: p(0, 6) }
		);
	}

	#[test]
	fn classify_splitting() {
		assert_eq!(
			classify(p(0, 10), p(3, 7)),
			PartLocation::Splitting { left: p(0, 3), right: p(7, 10) }
		);
	}

	#[test]
	fn overlap_tests() {
		assert!(overlaps(p(0, 5), p(4, 8)));
		assert!(!overlaps(p(0, 5), p(5, 8)));
		assert!(a_overlaps_any_of_b(p(4, 6), &[p(0, 2), p(5, 9)]));
		assert!(!a_overlaps_any_of_b(p(2, 4), &[p(0, 2), p(5, 9)]));
	}
}
