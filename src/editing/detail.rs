//! Low-level edit-wire primitives (spec.md sections 4.3-4.7).
//!
//! These operate directly on a [`CircuitData`]'s wire table and emit the
//! messages that keep its indices coherent. [`crate::editing::handlers`]
//! composes these into the public contract; nothing here pushes undo
//! records except [`insert_uninserted_segment`], which the source material
//! calls out by name (spec.md section 4.7 step 3).

use std::collections::HashMap;

use crate::circuit_data::CircuitData;
use crate::grid::{Direction, OrderedLine, Point, SegmentPointType, Which};
use crate::ids::{Segment, SegmentIndex, SegmentKey, SegmentPart, WireId};
use crate::index::{CollisionIndex, KeyIndex, LogicItemOutputIndex, SpatialIndex};
use crate::message::{Message, SegmentGeometry};
use crate::part::{self, Part, PartLocation};
use crate::segment_tree::SegmentTree;
use crate::undo::UndoRecord;

/// `move_segment_between_trees` (spec.md section 4.3). Dispatches on how
/// `sp.part` sits inside its segment's full line, then returns the full
/// part of wherever the moved geometry now lives.
pub fn move_segment_between_trees(circuit: &mut CircuitData, sp: SegmentPart, dest_wire: WireId) -> SegmentPart {
	let src = sp.segment;
	let full = part::to_part(&circuit.wires().get(src.wire_id).line(src.index));
	let dest_segment = match part::classify(full, sp.part) {
		PartLocation::Full => move_full(circuit, src, dest_wire),
		PartLocation::TouchingOneSide { kept } => move_touching(circuit, src, sp.part, dest_wire, kept),
		PartLocation::Splitting { left, right } => move_splitting(circuit, src, sp.part, dest_wire, left, right),
	};
	let dest_full = part::to_part(&circuit.wires().get(dest_segment.wire_id).line(dest_segment.index));
	SegmentPart::new(dest_segment, dest_full)
}

fn move_full(circuit: &mut CircuitData, src: Segment, dest_wire: WireId) -> Segment {
	if dest_wire == src.wire_id {
		return src;
	}

	let src_info = circuit.wires().get(src.wire_id).info(src.index);
	let dest_index = circuit.wires_mut().get_mut(dest_wire).add_segment(src_info);
	let dest_segment = Segment::new(dest_wire, dest_index);

	let src_was_inserted = src.wire_id.is_inserted();
	let dest_is_inserted = dest_wire.is_inserted();
	let reindex = circuit.wires_mut().get_mut(src.wire_id).swap_and_delete_segment(src.index);

	circuit.emit(Message::SegmentIdUpdated { old: src, new: dest_segment });
	if src_was_inserted != dest_is_inserted {
		let geometry = SegmentGeometry { segment: dest_segment, info: src_info };
		circuit.emit(if dest_is_inserted { Message::SegmentInserted(geometry) } else { Message::SegmentUninserted(geometry) });
	}
	if let Some(moved_from) = reindex.moved_from {
		circuit.emit(Message::SegmentIdUpdated { old: Segment::new(src.wire_id, moved_from), new: src });
	}
	dest_segment
}

fn move_touching(circuit: &mut CircuitData, src: Segment, selected: Part, dest_wire: WireId, kept: Part) -> Segment {
	let before = circuit.wires().get(src.wire_id).info(src.index);
	let copied = circuit.wires().get(src.wire_id).copy_segment(src.index, Some(selected));
	let dest_index = circuit.wires_mut().get_mut(dest_wire).add_segment(copied);
	let dest_segment = Segment::new(dest_wire, dest_index);
	circuit.keys_mut().assign_new_key(dest_segment);

	circuit.wires_mut().get_mut(src.wire_id).shrink_segment(src.index, kept);
	let after = circuit.wires().get(src.wire_id).info(src.index);

	let old_geom = SegmentGeometry { segment: src, info: before };
	let new_geom = SegmentGeometry { segment: dest_segment, info: copied };
	circuit.emit(Message::SegmentCreated(new_geom));
	circuit.emit(Message::SegmentGeometryUpdated { segment: src, old: before, new: after });
	circuit.emit(Message::SegmentPartMoved { old: old_geom, new: new_geom, create_destination: true, delete_source: false });
	if dest_wire.is_inserted() {
		circuit.emit(Message::SegmentInserted(new_geom));
	}
	dest_segment
}

fn move_splitting(circuit: &mut CircuitData, src: Segment, selected: Part, dest_wire: WireId, left: Part, right: Part) -> Segment {
	let before = circuit.wires().get(src.wire_id).info(src.index);

	// The right-hand leftover keeps living on the source wire under a
	// fresh key; the leftmost kept piece stays at `src`'s address and
	// keeps its original key.
	let right_info = circuit.wires().get(src.wire_id).copy_segment(src.index, Some(right));
	let right_index = circuit.wires_mut().get_mut(src.wire_id).add_segment(right_info);
	let right_segment = Segment::new(src.wire_id, right_index);
	circuit.keys_mut().assign_new_key(right_segment);

	let copied = circuit.wires().get(src.wire_id).copy_segment(src.index, Some(selected));
	let dest_index = circuit.wires_mut().get_mut(dest_wire).add_segment(copied);
	let dest_segment = Segment::new(dest_wire, dest_index);
	circuit.keys_mut().assign_new_key(dest_segment);

	circuit.wires_mut().get_mut(src.wire_id).shrink_segment(src.index, left);
	let after = circuit.wires().get(src.wire_id).info(src.index);

	let old_geom = SegmentGeometry { segment: src, info: before };
	let dest_geom = SegmentGeometry { segment: dest_segment, info: copied };
	let right_geom = SegmentGeometry { segment: right_segment, info: right_info };

	circuit.emit(Message::SegmentCreated(right_geom));
	circuit.emit(Message::SegmentCreated(dest_geom));
	circuit.emit(Message::SegmentGeometryUpdated { segment: src, old: before, new: after });
	circuit.emit(Message::SegmentPartMoved { old: old_geom, new: dest_geom, create_destination: true, delete_source: false });
	circuit.emit(Message::SegmentPartMoved { old: old_geom, new: right_geom, create_destination: true, delete_source: false });
	if dest_wire.is_inserted() {
		circuit.emit(Message::SegmentInserted(dest_geom));
	}
	dest_segment
}

/// `remove_segment_from_tree` (spec.md section 4.4). Requires an
/// uninserted source wire; removing from an inserted wire this way is a
/// broken-invariant condition the caller must never trigger.
pub fn remove_segment_from_tree(circuit: &mut CircuitData, sp: SegmentPart) {
	let src = sp.segment;
	assert!(!src.wire_id.is_inserted(), "remove_segment_from_tree requires an uninserted wire");
	let full = part::to_part(&circuit.wires().get(src.wire_id).line(src.index));
	match part::classify(full, sp.part) {
		PartLocation::Full => remove_full(circuit, src),
		PartLocation::TouchingOneSide { kept } => remove_touching(circuit, src, sp.part, kept),
		PartLocation::Splitting { left, right } => remove_splitting(circuit, src, sp.part, left, right),
	}
}

fn remove_full(circuit: &mut CircuitData, src: Segment) {
	let info = circuit.wires().get(src.wire_id).info(src.index);
	circuit.keys_mut().retire(src);
	let reindex = circuit.wires_mut().get_mut(src.wire_id).swap_and_delete_segment(src.index);
	circuit.emit(Message::SegmentPartDeleted(SegmentGeometry { segment: src, info }));
	if let Some(moved_from) = reindex.moved_from {
		circuit.emit(Message::SegmentIdUpdated { old: Segment::new(src.wire_id, moved_from), new: src });
	}
}

fn remove_touching(circuit: &mut CircuitData, src: Segment, removed: Part, kept: Part) {
	let before = circuit.wires().get(src.wire_id).info(src.index);
	let removed_info = circuit.wires().get(src.wire_id).copy_segment(src.index, Some(removed));
	circuit.wires_mut().get_mut(src.wire_id).shrink_segment(src.index, kept);
	let after = circuit.wires().get(src.wire_id).info(src.index);
	circuit.emit(Message::SegmentPartDeleted(SegmentGeometry { segment: src, info: removed_info }));
	circuit.emit(Message::SegmentGeometryUpdated { segment: src, old: before, new: after });
}

fn remove_splitting(circuit: &mut CircuitData, src: Segment, removed: Part, left: Part, right: Part) {
	let before = circuit.wires().get(src.wire_id).info(src.index);
	let removed_info = circuit.wires().get(src.wire_id).copy_segment(src.index, Some(removed));
	let right_info = circuit.wires().get(src.wire_id).copy_segment(src.index, Some(right));
	let right_index = circuit.wires_mut().get_mut(src.wire_id).add_segment(right_info);
	let right_segment = Segment::new(src.wire_id, right_index);
	circuit.keys_mut().assign_new_key(right_segment);

	circuit.wires_mut().get_mut(src.wire_id).shrink_segment(src.index, left);
	let after = circuit.wires().get(src.wire_id).info(src.index);

	circuit.emit(Message::SegmentCreated(SegmentGeometry { segment: right_segment, info: right_info }));
	circuit.emit(Message::SegmentPartDeleted(SegmentGeometry { segment: src, info: removed_info }));
	circuit.emit(Message::SegmentGeometryUpdated { segment: src, old: before, new: after });
}

fn which_at(line: OrderedLine, point: Point) -> Which {
	if line.p0() == point {
		Which::P0
	} else if line.p1() == point {
		Which::P1
	} else {
		panic!("point is not an endpoint of the line");
	}
}

fn direction_from_point(line: OrderedLine, point: Point, which: Which) -> Direction {
	let other = match which {
		Which::P0 => line.p1(),
		Which::P1 => line.p0(),
	};
	if other.x > point.x {
		Direction::Right
	} else if other.x < point.x {
		Direction::Left
	} else if other.y < point.y {
		Direction::Up
	} else {
		Direction::Down
	}
}

pub(crate) fn set_endpoint_and_emit(circuit: &mut CircuitData, segment: Segment, which: Which, ty: SegmentPointType) {
	let before = circuit.wires().get(segment.wire_id).endpoints(segment.index);
	if before.at(which) == ty {
		return;
	}
	circuit.wires_mut().get_mut(segment.wire_id).set_endpoint(segment.index, which, ty);
	let after = circuit.wires().get(segment.wire_id).endpoints(segment.index);
	circuit.emit(Message::SegmentEndpointsUpdated { segment, old: before, new: after });
}

/// Splits `segment` at `point`, which must lie strictly inside its line.
/// The earlier piece keeps `segment`'s address and key; the later piece is
/// appended under a fresh key.
pub(crate) fn split_segment_at(circuit: &mut CircuitData, segment: Segment, point: Point) -> (Segment, Segment) {
	let line = circuit.wires().get(segment.wire_id).line(segment.index);
	let offset = line.offset_of(point).expect("point must lie on the segment to split it");
	let full = part::to_part(&line);
	let left = Part::new(full.begin, offset).expect("split point is not the line's start");
	let right = Part::new(offset, full.end).expect("split point is not the line's end");

	let before = circuit.wires().get(segment.wire_id).info(segment.index);
	let right_info = circuit.wires().get(segment.wire_id).copy_segment(segment.index, Some(right));
	let right_index = circuit.wires_mut().get_mut(segment.wire_id).add_segment(right_info);
	let right_segment = Segment::new(segment.wire_id, right_index);
	circuit.keys_mut().assign_new_key(right_segment);

	circuit.wires_mut().get_mut(segment.wire_id).shrink_segment(segment.index, left);
	let after = circuit.wires().get(segment.wire_id).info(segment.index);

	circuit.emit(Message::SegmentCreated(SegmentGeometry { segment: right_segment, info: right_info }));
	circuit.emit(Message::SegmentGeometryUpdated { segment, old: before, new: after });
	if segment.wire_id.is_inserted() {
		circuit.emit(Message::SegmentInserted(SegmentGeometry { segment: right_segment, info: right_info }));
	}
	(segment, right_segment)
}

pub(crate) fn merge_touching_segments(circuit: &mut CircuitData, keep: Segment, remove: Segment) {
	assert_eq!(keep.wire_id, remove.wire_id, "cannot merge segments belonging to different wires");
	let wire = keep.wire_id;
	let before_keep = circuit.wires().get(wire).info(keep.index);
	let before_remove = circuit.wires().get(wire).info(remove.index);
	let reindex = circuit.wires_mut().get_mut(wire).swap_and_merge_segment(keep.index, remove.index);
	circuit.keys_mut().retire(remove);
	let merged = circuit.wires().get(wire).info(keep.index);

	circuit.emit(Message::SegmentPartDeleted(SegmentGeometry { segment: remove, info: before_remove }));
	circuit.emit(Message::SegmentGeometryUpdated { segment: keep, old: before_keep, new: merged });
	if let Some(moved_from) = reindex.moved_from {
		circuit.emit(Message::SegmentIdUpdated { old: Segment::new(wire, moved_from), new: remove });
	}
}

/// `fix_and_merge_segments` (spec.md section 4.5). Re-establishes a valid
/// corner/cross/endpoint tag at `point` after an edit disturbed the local
/// topology there.
pub fn fix_and_merge_segments(circuit: &mut CircuitData, point: Point) {
	let found = circuit.spatial().query_line_segments(point);
	let segments: Vec<Segment> = found.into_iter().flatten().filter(|s| s.wire_id.is_inserted()).collect();
	match segments.len() {
		0 => {}
		1 => {
			let segment = segments[0];
			let line = circuit.wires().get(segment.wire_id).line(segment.index);
			let which = which_at(line, point);
			set_endpoint_and_emit(circuit, segment, which, SegmentPointType::Output);
		}
		2 => fix_pair(circuit, segments[0], segments[1], point),
		3 | 4 => fix_junction(circuit, &segments, point),
		n => unreachable!("spatial index returns at most four segments, got {n}"),
	}
}

fn fix_pair(circuit: &mut CircuitData, a: Segment, b: Segment, point: Point) {
	let line_a = circuit.wires().get(a.wire_id).line(a.index);
	let line_b = circuit.wires().get(b.wire_id).line(b.index);
	let a_through = line_a.p0() != point && line_a.p1() != point;
	let b_through = line_b.p0() != point && line_b.p1() != point;

	if a_through {
		split_segment_at(circuit, a, point);
		return fix_and_merge_segments(circuit, point);
	}
	if b_through {
		split_segment_at(circuit, b, point);
		return fix_and_merge_segments(circuit, point);
	}

	if line_a.orientation() == line_b.orientation() && line_a.is_collinear(&line_b) {
		merge_touching_segments(circuit, a, b);
		return;
	}

	let which_a = which_at(line_a, point);
	let which_b = which_at(line_b, point);
	set_endpoint_and_emit(circuit, a, which_a, SegmentPointType::CornerPoint);
	set_endpoint_and_emit(circuit, b, which_b, SegmentPointType::ShadowPoint);
}

fn fix_junction(circuit: &mut CircuitData, segments: &[Segment], point: Point) {
	for &segment in segments {
		let line = circuit.wires().get(segment.wire_id).line(segment.index);
		if line.p0() != point && line.p1() != point {
			split_segment_at(circuit, segment, point);
			return fix_and_merge_segments(circuit, point);
		}
	}

	let wire = segments[0].wire_id;
	assert!(segments.iter().all(|s| s.wire_id == wire), "a corner/cross junction must belong to a single wire");

	let mut ordered: Vec<(Direction, Segment, Which)> = segments
		.iter()
		.map(|&segment| {
			let line = circuit.wires().get(segment.wire_id).line(segment.index);
			let which = which_at(line, point);
			(direction_from_point(line, point, which), segment, which)
		})
		.collect();
	ordered.sort_by_key(|(dir, ..)| Direction::ORDER.iter().position(|d| d == dir).expect("direction is always in ORDER"));

	let (_, cross_segment, cross_which) = ordered[0];
	set_endpoint_and_emit(circuit, cross_segment, cross_which, SegmentPointType::CrossPoint);
	for &(_, segment, which) in &ordered[1..] {
		set_endpoint_and_emit(circuit, segment, which, SegmentPointType::ShadowPoint);
	}
}

/// `insert_uninserted_segment` (spec.md section 4.7).
pub fn insert_uninserted_segment(circuit: &mut CircuitData, sp: SegmentPart) -> SegmentPart {
	let segment = sp.segment;
	let line = {
		let full_line = circuit.wires().get(segment.wire_id).line(segment.index);
		OrderedLine::new(full_line.point_at(sp.part.begin), full_line.point_at(sp.part.end)).expect("segment part is a non-degenerate sub-line")
	};

	let w0 = circuit.collision().get_first_wire(line.p0());
	let w1 = circuit.collision().get_first_wire(line.p1());
	let target = match (w0, w1) {
		(Some(a), Some(b)) if a == b => a,
		(Some(a), Some(b)) => {
			let (keep, remove) = if a.raw() < b.raw() { (a, b) } else { (b, a) };
			merge_and_delete_tree(circuit, keep, remove);
			keep
		}
		(Some(a), None) | (None, Some(a)) => a,
		(None, None) => circuit.wires_mut().add_wire(),
	};

	let key = circuit.keys().get(segment);
	let before_endpoints = circuit.wires().get(segment.wire_id).endpoints(segment.index);
	circuit.push_undo(UndoRecord::SegmentSetEndpoints { key, endpoints: before_endpoints });
	circuit.wires_mut().get_mut(segment.wire_id).set_endpoint(segment.index, Which::P0, SegmentPointType::ShadowPoint);
	circuit.wires_mut().get_mut(segment.wire_id).set_endpoint(segment.index, Which::P1, SegmentPointType::ShadowPoint);

	for (point, which) in [(line.p0(), Which::P0), (line.p1(), Which::P1)] {
		if circuit.logic_outputs().find(point).is_some() {
			circuit.wires_mut().get_mut(segment.wire_id).set_endpoint(segment.index, which, SegmentPointType::Input);
		}
	}

	let full = part::to_part(&circuit.wires().get(segment.wire_id).line(segment.index));
	let moved = move_segment_between_trees(circuit, SegmentPart::new(segment, full), target);

	fix_and_merge_segments(circuit, line.p0());
	fix_and_merge_segments(circuit, line.p1());

	crate::invariant::assert_contiguous(target, circuit.wires().get(target)).expect("segment insertion left target wire in a broken state");

	moved
}

/// `merge_and_delete_tree` (spec.md section 4.7 step 2): always merges the
/// higher id into the lower, emitting `segment_id_updated` for every
/// relocated segment, then removes the now-empty higher-id wire.
pub fn merge_and_delete_tree(circuit: &mut CircuitData, keep: WireId, remove: WireId) {
	assert!(keep.raw() < remove.raw(), "merge_and_delete_tree always merges into the lower id");

	let remove_tree = circuit.wires().get(remove).clone();
	let base = circuit.wires().get(keep).len();
	let remove_len = remove_tree.len();
	circuit.wires_mut().get_mut(keep).add_tree(&remove_tree);
	for i in 0..remove_len {
		circuit.emit(Message::SegmentIdUpdated { old: Segment::new(remove, i), new: Segment::new(keep, base + i) });
	}

	*circuit.wires_mut().get_mut(remove) = SegmentTree::new();
	if let Some(old_id) = circuit.wires_mut().swap_and_delete_empty_wire(remove) {
		let relocated_len = circuit.wires().get(remove).len();
		for i in 0..relocated_len {
			circuit.emit(Message::SegmentIdUpdated { old: Segment::new(old_id, i), new: Segment::new(remove, i) });
		}
	}
}

/// `split_broken_tree` (spec.md section 4.6 stage 4): after removing a
/// piece from an inserted wire, its remainder may have fallen apart into
/// more than one connected component. Every component past the first is
/// relocated onto a freshly allocated wire.
pub fn split_broken_tree(circuit: &mut CircuitData, wire: WireId, point: Point) {
	let _ = point;
	if !wire.is_inserted() {
		return;
	}
	let components = connected_components(circuit.wires().get(wire));
	if components.len() <= 1 {
		return;
	}

	for component in &components[1..] {
		let new_wire = circuit.wires_mut().add_wire();
		let keys: Vec<SegmentKey> = component.iter().map(|&index| circuit.keys().get(Segment::new(wire, index))).collect();
		for key in keys {
			// Re-resolve by key: earlier moves in this loop may have
			// shuffled `wire`'s indices via swap-delete.
			let segment = circuit.keys_mut().segment_for(key).expect("component segment must still carry its key");
			let full = part::to_part(&circuit.wires().get(segment.wire_id).line(segment.index));
			move_segment_between_trees(circuit, SegmentPart::new(segment, full), new_wire);
		}
	}
}

fn connected_components(tree: &SegmentTree) -> Vec<Vec<SegmentIndex>> {
	let mut incident: HashMap<Point, Vec<SegmentIndex>> = HashMap::new();
	for (index, info) in tree.iter() {
		incident.entry(info.line.p0()).or_default().push(index);
		incident.entry(info.line.p1()).or_default().push(index);
	}

	let mut visited = vec![false; tree.len()];
	let mut components = Vec::new();
	for start in 0..tree.len() {
		if visited[start] {
			continue;
		}
		let mut stack = vec![start];
		visited[start] = true;
		let mut component = Vec::new();
		while let Some(index) = stack.pop() {
			component.push(index);
			let info = tree.info(index);
			for point in [info.line.p0(), info.line.p1()] {
				for &neighbor in incident.get(&point).into_iter().flatten() {
					if !visited[neighbor] {
						visited[neighbor] = true;
						stack.push(neighbor);
					}
				}
			}
		}
		components.push(component);
	}
	components
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::grid::{Endpoints, SegmentInfo};
	use crate::ids::WireId;

	fn line(x0: i32, y0: i32, x1: i32, y1: i32) -> OrderedLine {
		OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1)).unwrap()
	}

	#[test]
	fn move_full_segment_to_inserted_wire_emits_inserted() {
		let mut circuit = CircuitData::new();
		let index = circuit.wires_mut().temporary_mut().add_segment(SegmentInfo::new(line(0, 0, 10, 0), Endpoints::SHADOW));
		let segment = Segment::new(WireId::TEMPORARY, index);
		circuit.keys_mut().assign_new_key(segment);
		circuit.emit(Message::SegmentCreated(SegmentGeometry { segment, info: circuit.wires().temporary().info(index) }));

		let target = circuit.wires_mut().add_wire();
		let full = part::to_part(&line(0, 0, 10, 0));
		let dest = move_segment_between_trees(&mut circuit, SegmentPart::new(segment, full), target);

		assert_eq!(dest.segment.wire_id, target);
		assert!(circuit.wires().temporary().is_empty());
		assert_eq!(circuit.wires().get(target).len(), 1);
	}

	#[test]
	fn fix_and_merge_makes_corner() {
		let mut circuit = CircuitData::new();
		let target = circuit.wires_mut().add_wire();
		let a = circuit.wires_mut().get_mut(target).add_segment(SegmentInfo::new(line(0, 0, 5, 0), Endpoints::SHADOW));
		let b = circuit.wires_mut().get_mut(target).add_segment(SegmentInfo::new(line(5, 0, 5, 5), Endpoints::SHADOW));
		let seg_a = Segment::new(target, a);
		let seg_b = Segment::new(target, b);
		circuit.keys_mut().assign_new_key(seg_a);
		circuit.keys_mut().assign_new_key(seg_b);
		circuit.emit(Message::SegmentCreated(SegmentGeometry { segment: seg_a, info: circuit.wires().get(target).info(a) }));
		circuit.emit(Message::SegmentCreated(SegmentGeometry { segment: seg_b, info: circuit.wires().get(target).info(b) }));

		fix_and_merge_segments(&mut circuit, Point::new(5, 0));

		let ep_a = circuit.wires().get(target).endpoints(a);
		let ep_b = circuit.wires().get(target).endpoints(b);
		assert_eq!(ep_a.p1_type, SegmentPointType::CornerPoint);
		assert_eq!(ep_b.p0_type, SegmentPointType::ShadowPoint);
	}
}
