//! The invariant checker (spec.md section 4.9).
//!
//! `is_contiguous_tree_with_correct_endpoints` is the single source of
//! truth for "this inserted wire is well-formed": connected, loop-free,
//! normalized (no overlap, no unmerged collinear pair, no unsplit
//! through-point), and every endpoint type tag matches the graph it sits
//! in.

use std::collections::HashMap;

use crate::grid::{Point, SegmentPointType};
use crate::ids::WireId;
use crate::segment_tree::SegmentTree;

/// Why a tree failed the check. Carries enough detail for a caller to
/// report a useful diagnostic without re-walking the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
	OverlappingSegments,
	UnsplitThroughPoint(Point),
	Disconnected,
	Cyclic,
	LeafNotConnecting(Point),
	TooManyInputs,
	CornerMismatch(Point),
	CrossMismatch(Point),
	NewUnknown(Point),
}

/// `is_contiguous_tree_with_correct_endpoints`.
pub fn check(tree: &SegmentTree) -> Result<(), Violation> {
	if tree.is_empty() {
		return Ok(());
	}

	let lines: Vec<_> = tree.iter().map(|(_, info)| info).collect();

	// No two distinct segments may be collinear and overlapping (this
	// catches both plain overlap and an unmerged touching pair, which
	// would coalesce under `part::coalesce`-style normalization).
	for i in 0..lines.len() {
		for j in (i + 1)..lines.len() {
			if lines[i].line.is_collinear(&lines[j].line) {
				let a = lines[i].line;
				let b = lines[j].line;
				if a.p0() <= b.p1() && b.p0() <= a.p1() {
					return Err(Violation::OverlappingSegments);
				}
			}
		}
	}

	// No segment may have another segment's endpoint strictly in its
	// interior (that point should have split it).
	for (i, a) in lines.iter().enumerate() {
		for (j, b) in lines.iter().enumerate() {
			if i == j {
				continue;
			}
			for p in [b.line.p0(), b.line.p1()] {
				if a.line.contains_point(p) && p != a.line.p0() && p != a.line.p1() {
					return Err(Violation::UnsplitThroughPoint(p));
				}
			}
		}
	}

	// Build the incidence graph: point -> [(segment index, endpoint type)].
	let mut incidence: HashMap<Point, Vec<SegmentPointType>> = HashMap::new();
	for info in &lines {
		incidence.entry(info.line.p0()).or_default().push(info.endpoints.p0_type);
		incidence.entry(info.line.p1()).or_default().push(info.endpoints.p1_type);
	}

	for (&point, types) in &incidence {
		if types.iter().any(|t| *t == SegmentPointType::NewUnknown) {
			return Err(Violation::NewUnknown(point));
		}
	}

	// Connectivity + acyclicity: a tree on N vertices has exactly N-1
	// edges and is connected. The traversal below settles which one
	// failed when the counts disagree.
	let vertex_count = incidence.len();
	let edge_count = lines.len();

	let mut adjacency: HashMap<Point, Vec<Point>> = HashMap::new();
	for info in &lines {
		adjacency.entry(info.line.p0()).or_default().push(info.line.p1());
		adjacency.entry(info.line.p1()).or_default().push(info.line.p0());
	}
	let start = *adjacency.keys().next().expect("non-empty tree has at least one vertex");
	let mut visited = std::collections::HashSet::new();
	let mut stack = vec![start];
	visited.insert(start);
	while let Some(p) = stack.pop() {
		for &next in adjacency.get(&p).into_iter().flatten() {
			if visited.insert(next) {
				stack.push(next);
			}
		}
	}
	if visited.len() != vertex_count {
		return Err(Violation::Disconnected);
	}
	if edge_count + 1 != vertex_count {
		return Err(Violation::Cyclic);
	}

	let mut total_inputs = 0u32;
	for (&point, types) in &incidence {
		match types.len() {
			1 => {
				if !types[0].is_connecting() {
					return Err(Violation::LeafNotConnecting(point));
				}
				if types[0] == SegmentPointType::Input {
					total_inputs += 1;
				}
			}
			2 => {
				let corners = types.iter().filter(|t| **t == SegmentPointType::CornerPoint).count();
				let shadows = types.iter().filter(|t| **t == SegmentPointType::ShadowPoint).count();
				if corners != 1 || shadows != 1 {
					return Err(Violation::CornerMismatch(point));
				}
			}
			n if n >= 3 => {
				let crosses = types.iter().filter(|t| **t == SegmentPointType::CrossPoint).count();
				let shadows = types.iter().filter(|t| **t == SegmentPointType::ShadowPoint).count();
				if crosses != 1 || shadows != n - 1 {
					return Err(Violation::CrossMismatch(point));
				}
			}
			_ => unreachable!("degree is always >= 1 for an incident point"),
		}
	}
	if total_inputs > 1 {
		return Err(Violation::TooManyInputs);
	}

	Ok(())
}

/// Convenience wrapper turning a violation into an [`crate::error::EditError`]
/// addressed to a specific wire, for callers that assert this at the end
/// of a public operation (spec.md section 4.7 step 7).
pub fn assert_contiguous(wire: WireId, tree: &SegmentTree) -> crate::error::EditResult<()> {
	check(tree).map_err(|violation| crate::error::EditError::BrokenInvariant(wire, violation.static_str()))
}

impl Violation {
	fn static_str(&self) -> &'static str {
		match self {
			Violation::OverlappingSegments => "overlapping or unmerged collinear segments",
			Violation::UnsplitThroughPoint(_) => "an unsplit through-point",
			Violation::Disconnected => "disconnected graph",
			Violation::Cyclic => "a cycle",
			Violation::LeafNotConnecting(_) => "a leaf with a non-connecting endpoint type",
			Violation::TooManyInputs => "more than one input endpoint",
			Violation::CornerMismatch(_) => "a degree-2 point not tagged corner/shadow",
			Violation::CrossMismatch(_) => "a degree>=3 point not tagged cross/shadow",
			Violation::NewUnknown(_) => "a new_unknown endpoint",
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::grid::{Endpoints, OrderedLine, SegmentInfo};

	fn line(x0: i32, y0: i32, x1: i32, y1: i32) -> OrderedLine {
		OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1)).unwrap()
	}

	#[test]
	fn single_segment_two_outputs_is_valid() {
		let mut tree = SegmentTree::new();
		tree.add_segment(SegmentInfo::new(
			line(0, 0, 10, 0),
			Endpoints { p0_type: SegmentPointType::Output, p1_type: SegmentPointType::Output },
		));
		assert_eq!(check(&tree), Ok(()));
	}

	#[test]
	fn corner_tree_is_valid() {
		let mut tree = SegmentTree::new();
		tree.add_segment(SegmentInfo::new(
			line(0, 0, 5, 0),
			Endpoints { p0_type: SegmentPointType::Output, p1_type: SegmentPointType::CornerPoint },
		));
		tree.add_segment(SegmentInfo::new(
			line(5, 0, 5, 5),
			Endpoints { p0_type: SegmentPointType::ShadowPoint, p1_type: SegmentPointType::Output },
		));
		assert_eq!(check(&tree), Ok(()));
	}

	#[test]
	fn cross_point_tree_is_valid() {
		let mut tree = SegmentTree::new();
		tree.add_segment(SegmentInfo::new(
			line(0, 0, 5, 0),
			Endpoints { p0_type: SegmentPointType::Output, p1_type: SegmentPointType::CrossPoint },
		));
		tree.add_segment(SegmentInfo::new(
			line(5, 0, 10, 0),
			Endpoints { p0_type: SegmentPointType::ShadowPoint, p1_type: SegmentPointType::Output },
		));
		tree.add_segment(SegmentInfo::new(
			line(5, -5, 5, 0),
			Endpoints { p0_type: SegmentPointType::Output, p1_type: SegmentPointType::ShadowPoint },
		));
		tree.add_segment(SegmentInfo::new(
			line(5, 0, 5, 5),
			Endpoints { p0_type: SegmentPointType::ShadowPoint, p1_type: SegmentPointType::Output },
		));
		assert_eq!(check(&tree), Ok(()));
	}

	#[test]
	fn overlapping_segments_rejected() {
		let mut tree = SegmentTree::new();
		tree.add_segment(SegmentInfo::new(line(0, 0, 10, 0), Endpoints::SHADOW));
		tree.add_segment(SegmentInfo::new(line(5, 0, 15, 0), Endpoints::SHADOW));
		assert_eq!(check(&tree), Err(Violation::OverlappingSegments));
	}

	#[test]
	fn two_inputs_rejected() {
		let mut tree = SegmentTree::new();
		tree.add_segment(SegmentInfo::new(
			line(0, 0, 5, 0),
			Endpoints { p0_type: SegmentPointType::Input, p1_type: SegmentPointType::CornerPoint },
		));
		tree.add_segment(SegmentInfo::new(
			line(5, 0, 5, 5),
			Endpoints { p0_type: SegmentPointType::ShadowPoint, p1_type: SegmentPointType::Input },
		));
		assert_eq!(check(&tree), Err(Violation::TooManyInputs));
	}
}
