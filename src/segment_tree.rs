//! Flat per-wire segment storage (spec.md section 3 "SegmentTree" and
//! section 4.2 "Segment Tree").
//!
//! Segments live in a dense `Vec`; deletion is swap-remove so indices stay
//! dense without a free list. Callers are responsible for reacting to the
//! index shuffle a swap-delete causes (every deleting method returns the
//! former last index when one moved, exactly as `arena.rs`'s `Arena::remove`
//! exposes the freed slot instead of silently patching references for you).

use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

use crate::grid::{Endpoints, OrderedLine, Point, SegmentInfo, SegmentPointType, Which};
use crate::ids::SegmentIndex;
use crate::part::{self, Part};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SegmentRecord {
	info: SegmentInfo,
	/// Disjoint, sorted sub-ranges of `info.line` currently in insert mode.
	/// Only meaningful for inserted wires.
	valid_parts: Vec<Part>,
}

/// The set of segments belonging to one wire (temporary, colliding, or one
/// inserted tree).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SegmentTree {
	segments: Vec<SegmentRecord>,
	input_count: u8,
	output_count: u32,
	input_position: Option<Point>,
}

/// Result of an operation that may shuffle indices via swap-delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reindex {
	/// The index that used to hold the last segment and now holds whatever
	/// replaced the deleted one (`None` if the deleted segment was already
	/// last, so nothing moved).
	pub moved_from: Option<SegmentIndex>,
}

impl SegmentTree {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn line(&self, index: SegmentIndex) -> OrderedLine {
		self.segments[index].info.line
	}

	pub fn info(&self, index: SegmentIndex) -> SegmentInfo {
		self.segments[index].info
	}

	pub fn endpoints(&self, index: SegmentIndex) -> Endpoints {
		self.segments[index].info.endpoints
	}

	pub fn valid_parts(&self, index: SegmentIndex) -> &[Part] {
		&self.segments[index].valid_parts
	}

	pub fn input_count(&self) -> u8 {
		self.input_count
	}

	pub fn output_count(&self) -> u32 {
		self.output_count
	}

	pub fn input_position(&self) -> Option<Point> {
		self.input_position
	}

	pub fn iter(&self) -> impl Iterator<Item = (SegmentIndex, SegmentInfo)> + '_ {
		self.segments.iter().enumerate().map(|(i, r)| (i, r.info))
	}

	fn recompute_counters(&mut self) {
		let mut input_count = 0u8;
		let mut output_count = 0u32;
		let mut input_position = None;
		for record in &self.segments {
			let ep = record.info.endpoints;
			for (ty, point) in [(ep.p0_type, record.info.line.p0()), (ep.p1_type, record.info.line.p1())] {
				match ty {
					SegmentPointType::Input => {
						input_count += 1;
						input_position = Some(point);
					}
					SegmentPointType::Output => output_count += 1,
					_ => {}
				}
			}
		}
		self.input_count = input_count;
		self.output_count = output_count;
		self.input_position = input_position;
	}

	/// `add_segment`: appends a new segment with no valid parts.
	pub fn add_segment(&mut self, info: SegmentInfo) -> SegmentIndex {
		self.segments.push(SegmentRecord { info, valid_parts: Vec::new() });
		self.recompute_counters();
		self.segments.len() - 1
	}

	/// `swap_and_delete_segment`: swaps the last segment into `index`,
	/// shrinking the tree by one. Emits no message; the caller is
	/// responsible for the `segment_id_updated`/`segment_part_deleted`
	/// pair the spec describes.
	pub fn swap_and_delete_segment(&mut self, index: SegmentIndex) -> Reindex {
		let last = self.segments.len() - 1;
		self.segments.swap_remove(index);
		self.recompute_counters();
		Reindex { moved_from: (index != last).then_some(last) }
	}

	/// `copy_segment`: the `SegmentInfo` that would be appended to a
	/// destination tree for this segment (optionally sliced to `part`);
	/// endpoints newly exposed by slicing are forced to `shadow_point`.
	pub fn copy_segment(&self, index: SegmentIndex, part: Option<Part>) -> SegmentInfo {
		let record = &self.segments[index];
		match part {
			None => record.info,
			Some(part) => slice_segment_info(record.info, part),
		}
	}

	/// `shrink_segment`: narrows `index` to `kept_part`. Endpoints outside
	/// `kept_part` become `shadow_point` unless the corresponding side of
	/// the original full line was already fully retained.
	pub fn shrink_segment(&mut self, index: SegmentIndex, kept_part: Part) {
		let record = &mut self.segments[index];
		let full = part::to_part(&record.info.line);
		record.info = slice_segment_info(record.info, kept_part);
		// Re-base valid parts into the new line's local coordinates.
		record.valid_parts = record
			.valid_parts
			.iter()
			.filter_map(|&vp| {
				if !part::overlaps(vp, kept_part) {
					return None;
				}
				let begin = vp.begin.max(kept_part.begin) - kept_part.begin;
				let end = vp.end.min(kept_part.end) - kept_part.begin;
				Part::new(begin, end).ok()
			})
			.collect();
		let _ = full;
		self.recompute_counters();
	}

	/// `swap_and_merge_segment`: `keep` and `remove` must be collinear and
	/// touch end-to-end. The merged segment (occupying their union) lands
	/// at `keep`'s index; endpoint types come from the two non-shared
	/// ends; valid parts union. `remove` is then swap-deleted.
	pub fn swap_and_merge_segment(&mut self, keep: SegmentIndex, remove: SegmentIndex) -> Reindex {
		assert_ne!(keep, remove, "cannot merge a segment with itself");
		let a = self.segments[keep].info;
		let b = self.segments[remove].info;
		assert!(a.line.is_collinear(&b.line), "segments are not collinear");

		let (union_line, a_at_union_p0, endpoints) = merge_lines(a, b);
		let a_len = a.line.length();

		let translate = |vp: Part, offset: Offset| Part::new(vp.begin + offset, vp.end + offset).unwrap();
		let mut merged_valid: Vec<Part> = Vec::new();
		if a_at_union_p0 {
			merged_valid.extend(self.segments[keep].valid_parts.iter().copied());
			merged_valid.extend(self.segments[remove].valid_parts.iter().map(|&vp| translate(vp, a_len)));
		} else {
			let b_len = b.line.length();
			merged_valid.extend(self.segments[remove].valid_parts.iter().copied());
			merged_valid.extend(self.segments[keep].valid_parts.iter().map(|&vp| translate(vp, b_len)));
		}
		merged_valid.sort();

		self.segments[keep].info = SegmentInfo::new(union_line, endpoints);
		self.segments[keep].valid_parts = coalesce(merged_valid);

		let reindex = self.swap_and_delete_segment(remove);
		// If the swap pulled `keep`'s own slot (i.e. `keep == last` after
		// removal target shuffled) nothing else to do: `keep` untouched
		// unless `keep == last`, which swap_and_delete_segment already
		// leaves correctly addressed since we removed `remove`, not `keep`.
		self.recompute_counters();
		reindex
	}

	/// `mark_valid`: unions `part` into the valid-parts set.
	pub fn mark_valid(&mut self, index: SegmentIndex, part: Part) {
		let record = &mut self.segments[index];
		record.valid_parts.push(part);
		record.valid_parts.sort();
		record.valid_parts = coalesce(core::mem::take(&mut record.valid_parts));
	}

	/// `unmark_valid`: removes `part` from the valid-parts set, splitting
	/// any valid part it partially overlaps.
	pub fn unmark_valid(&mut self, index: SegmentIndex, part: Part) {
		let record = &mut self.segments[index];
		let mut result = Vec::with_capacity(record.valid_parts.len() + 1);
		for &existing in &record.valid_parts {
			if !crate::part::overlaps(existing, part) {
				result.push(existing);
				continue;
			}
			match crate::part::classify(existing, intersect(existing, part)) {
				crate::part::PartLocation::Full => {}
				crate::part::PartLocation::TouchingOneSide { kept } => result.push(kept),
				crate::part::PartLocation::Splitting { left, right } => {
					result.push(left);
					result.push(right);
				}
			}
		}
		result.sort();
		record.valid_parts = result;
	}

	/// `update_segment`: replaces endpoint types (and, in principle, the
	/// line) of `index`, recomputing cached counters.
	pub fn update_segment(&mut self, index: SegmentIndex, new_info: SegmentInfo) {
		self.segments[index].info = new_info;
		self.recompute_counters();
	}

	pub fn set_endpoint(&mut self, index: SegmentIndex, which: Which, ty: SegmentPointType) {
		self.segments[index].info.endpoints.set(which, ty);
		self.recompute_counters();
	}

	/// `add_tree`: appends another wire's segments (and valid parts) at
	/// the tail of this tree.
	pub fn add_tree(&mut self, other: &SegmentTree) {
		self.segments.extend(other.segments.iter().cloned());
		self.recompute_counters();
	}
}

use crate::grid::Offset;

fn intersect(a: Part, b: Part) -> Part {
	Part::new(a.begin.max(b.begin), a.end.min(b.end)).expect("parts must overlap")
}

/// Merges adjacent/overlapping sorted parts into their union.
fn coalesce(parts: Vec<Part>) -> Vec<Part> {
	let mut out: Vec<Part> = Vec::with_capacity(parts.len());
	for part in parts {
		match out.last_mut() {
			Some(last) if part.begin <= last.end => {
				last.end = last.end.max(part.end);
			}
			_ => out.push(part),
		}
	}
	out
}

/// Slices `info` to `part`, forcing endpoints newly exposed by the cut to
/// `shadow_point`.
fn slice_segment_info(info: SegmentInfo, part: Part) -> SegmentInfo {
	let full = crate::part::to_part(&info.line);
	let p0 = info.line.point_at(part.begin);
	let p1 = info.line.point_at(part.end);
	let line = OrderedLine::new(p0, p1).expect("sliced part is non-degenerate and orthogonal");
	let p0_type = if part.begin == full.begin { info.endpoints.p0_type } else { SegmentPointType::ShadowPoint };
	let p1_type = if part.end == full.end { info.endpoints.p1_type } else { SegmentPointType::ShadowPoint };
	SegmentInfo::new(line, Endpoints { p0_type, p1_type })
}

/// Merges two collinear, end-touching segments into their union line and
/// decides which original segment ends up at the union's `p0` side.
/// Returns `(union_line, a_is_at_union_p0, endpoints)` where `endpoints`
/// are the two non-shared-end types.
fn merge_lines(a: SegmentInfo, b: SegmentInfo) -> (OrderedLine, bool, Endpoints) {
	let (lo, hi) = match a.line.p0().cmp(&b.line.p0()) {
		Ordering::Less | Ordering::Equal => (a, b),
		Ordering::Greater => (b, a),
	};
	assert_eq!(lo.line.p1(), hi.line.p0(), "segments do not touch end-to-end");
	let union = OrderedLine::new(lo.line.p0(), hi.line.p1()).expect("union of two touching orthogonal segments");
	let endpoints = Endpoints { p0_type: lo.endpoints.p0_type, p1_type: hi.endpoints.p1_type };
	let a_is_lo = lo.line.p0() == a.line.p0() && lo.line.p1() == a.line.p1();
	(union, a_is_lo, endpoints)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::grid::Point;

	fn seg(x0: i32, y0: i32, x1: i32, y1: i32, p0: SegmentPointType, p1: SegmentPointType) -> SegmentInfo {
		let line = OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1)).unwrap();
		SegmentInfo::new(line, Endpoints { p0_type: p0, p1_type: p1 })
	}

	#[test]
	fn add_and_counters() {
		let mut tree = SegmentTree::new();
		tree.add_segment(seg(0, 0, 10, 0, SegmentPointType::Output, SegmentPointType::Output));
		assert_eq!(tree.input_count(), 0);
		assert_eq!(tree.output_count(), 2);
	}

	#[test]
	fn swap_delete_reports_move() {
		let mut tree = SegmentTree::new();
		tree.add_segment(seg(0, 0, 1, 0, SegmentPointType::ShadowPoint, SegmentPointType::ShadowPoint));
		tree.add_segment(seg(1, 0, 2, 0, SegmentPointType::ShadowPoint, SegmentPointType::ShadowPoint));
		tree.add_segment(seg(2, 0, 3, 0, SegmentPointType::ShadowPoint, SegmentPointType::ShadowPoint));
		let reindex = tree.swap_and_delete_segment(0);
		assert_eq!(reindex.moved_from, Some(2));
		assert_eq!(tree.len(), 2);
		// last segment now occupies slot 0
		assert_eq!(tree.line(0), OrderedLine::new(Point::new(2, 0), Point::new(3, 0)).unwrap());
	}

	#[test]
	fn shrink_forces_shadow_on_cut_side() {
		let mut tree = SegmentTree::new();
		tree.add_segment(seg(0, 0, 10, 0, SegmentPointType::Output, SegmentPointType::Output));
		tree.shrink_segment(0, Part::new(0, 6).unwrap());
		let info = tree.info(0);
		assert_eq!(info.line.p1(), Point::new(6, 0));
		assert_eq!(info.endpoints.p0_type, SegmentPointType::Output);
		assert_eq!(info.endpoints.p1_type, SegmentPointType::ShadowPoint);
	}

	#[test]
	fn mark_and_unmark_valid() {
		let mut tree = SegmentTree::new();
		tree.add_segment(seg(0, 0, 10, 0, SegmentPointType::Output, SegmentPointType::Output));
		tree.mark_valid(0, Part::new(0, 10).unwrap());
		assert_eq!(tree.valid_parts(0), &[Part::new(0, 10).unwrap()]);
		tree.unmark_valid(0, Part::new(3, 7).unwrap());
		assert_eq!(tree.valid_parts(0), &[Part::new(0, 3).unwrap(), Part::new(7, 10).unwrap()]);
	}

	#[test]
	fn merge_touching_segments() {
		let mut tree = SegmentTree::new();
		tree.add_segment(seg(0, 0, 5, 0, SegmentPointType::Output, SegmentPointType::ShadowPoint));
		tree.add_segment(seg(5, 0, 10, 0, SegmentPointType::ShadowPoint, SegmentPointType::Output));
		let reindex = tree.swap_and_merge_segment(0, 1);
		assert_eq!(reindex.moved_from, None);
		assert_eq!(tree.len(), 1);
		let info = tree.info(0);
		assert_eq!(info.line.p0(), Point::new(0, 0));
		assert_eq!(info.line.p1(), Point::new(10, 0));
		assert_eq!(info.endpoints.p0_type, SegmentPointType::Output);
		assert_eq!(info.endpoints.p1_type, SegmentPointType::Output);
	}
}
