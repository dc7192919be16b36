//! External interfaces the core consumes (spec.md section 6) plus
//! reference implementations the core keeps coherent via the message bus.
//!
//! Logic-item placement is genuinely external (spec.md section 1: "out of
//! scope"), so [`LogicItemInputIndex`]/[`LogicItemOutputIndex`] stay plain
//! caller-supplied trait objects with a null default. The spatial,
//! collision and key indices, by contrast, are pure functions of the wire
//! table the core itself mutates — so `logiwire` ships a correct (if
//! unoptimized, linear-scan) reference implementation of each rather than
//! leaving them unimplementable; see `DESIGN.md`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, OrderedLine, Point, SegmentInfo, SegmentPointType};
use crate::ids::{Segment, SegmentKey, WireId};
use crate::message::{Message, MessageReceiver};

/// An opaque handle to a logic item, owned by the collaborator that
/// places logic items — the core never interprets its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicItemId(pub u64);

/// A logic-item input or output found at a grid point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogicItemPort {
	pub logicitem: LogicItemId,
	pub orientation: Direction,
}

/// `LogicItemInputIndex.find`: external collaborator, out of scope.
pub trait LogicItemInputIndex {
	fn find(&self, point: Point) -> Option<LogicItemPort>;
}

/// `LogicItemOutputIndex.find`: external collaborator, out of scope.
pub trait LogicItemOutputIndex {
	fn find(&self, point: Point) -> Option<LogicItemPort>;
}

/// Always reports "nothing here". The default for both logic-item index
/// traits when no collaborator is wired in (e.g. in tests).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogicItemIndex;

impl LogicItemInputIndex for NullLogicItemIndex {
	fn find(&self, _point: Point) -> Option<LogicItemPort> {
		None
	}
}

impl LogicItemOutputIndex for NullLogicItemIndex {
	fn find(&self, _point: Point) -> Option<LogicItemPort> {
		None
	}
}

/// The answer to "what is at this point?" (spec.md section 6,
/// `CollisionIndex.query`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointQuery {
	pub is_wire_corner_point: bool,
	pub is_wire_connection: bool,
	pub is_wire_cross_point: bool,
}

/// `CollisionIndex`: answers what inserted wires occupy a point or line.
pub trait CollisionIndex: MessageReceiver {
	fn get_first_wire(&self, point: Point) -> Option<WireId>;
	fn is_colliding(&self, line: OrderedLine) -> bool;
	fn is_wires_crossing(&self, point: Point) -> bool;
	fn is_wire_cross_point(&self, point: Point) -> bool;
	fn query(&self, point: Point) -> PointQuery;
}

/// `SpatialIndex.query_line_segments`: up to four segments through a
/// point, padded with `None`.
pub trait SpatialIndex: MessageReceiver {
	fn query_line_segments(&self, point: Point) -> [Option<Segment>; 4];
}

/// `KeyIndex`: stable keys surviving swap-delete, merge and split.
pub trait KeyIndex: MessageReceiver {
	fn get(&self, segment: Segment) -> SegmentKey;
	fn set_key(&mut self, segment: Segment, key: SegmentKey);
	fn swap_key(&mut self, a: Segment, b: Segment);
}

/// Whether a point lies at one of a line's two ends, or strictly through
/// its interior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Incidence {
	Endpoint,
	Through,
}

fn incidence_at(line: &OrderedLine, point: Point) -> Option<Incidence> {
	if !line.contains_point(point) {
		return None;
	}
	if point == line.p0() || point == line.p1() {
		Some(Incidence::Endpoint)
	} else {
		Some(Incidence::Through)
	}
}

/// A plain linear-scan index over every live segment's current geometry.
/// Backs both [`GridSpatialIndex`] and [`GridCollisionIndex`]: the two
/// differ only in whether they consider every wire or inserted wires
/// only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct GeometryTable {
	segments: HashMap<Segment, SegmentInfo>,
}

impl GeometryTable {
	fn apply(&mut self, message: &Message) {
		match *message {
			Message::SegmentCreated(g) => {
				self.segments.insert(g.segment, g.info);
			}
			Message::SegmentIdUpdated { old, new } => {
				if let Some(info) = self.segments.remove(&old) {
					self.segments.insert(new, info);
				}
			}
			Message::SegmentGeometryUpdated { segment, new, .. } => {
				self.segments.insert(segment, new);
			}
			Message::SegmentPartDeleted(g) => {
				self.segments.remove(&g.segment);
			}
			Message::SegmentEndpointsUpdated { segment, new, .. } => {
				if let Some(info) = self.segments.get_mut(&segment) {
					info.endpoints = new;
				}
			}
			// Semantic-only notifications: the geometry bookkeeping for
			// these is carried by the Created/IdUpdated/GeometryUpdated/
			// PartDeleted messages emitted alongside them.
			Message::SegmentPartMoved { .. } | Message::SegmentInserted(_) | Message::SegmentUninserted(_) => {}
		}
	}

	fn query_point(&self, point: Point, filter: impl Fn(Segment) -> bool) -> Vec<(Segment, SegmentInfo, Incidence)> {
		let mut found = Vec::new();
		for (&segment, &info) in &self.segments {
			if !filter(segment) {
				continue;
			}
			if let Some(incidence) = incidence_at(&info.line, point) {
				found.push((segment, info, incidence));
			}
		}
		found
	}

	fn is_colliding(&self, line: OrderedLine, filter: impl Fn(Segment) -> bool) -> bool {
		self.segments.iter().any(|(&segment, info)| {
			filter(segment) && info.line.is_collinear(&line) && lines_overlap(info.line, line)
		})
	}

	/// Total input-tagged endpoints across every segment belonging to one
	/// of `wires`, not just the segments incident to a particular point —
	/// a wire's one input is almost never on the segment that happens to
	/// cross at the point being asked about.
	fn count_wire_inputs(&self, wires: &std::collections::HashSet<WireId>, filter: impl Fn(Segment) -> bool) -> usize {
		self.segments
			.iter()
			.filter(|(&segment, _)| filter(segment) && wires.contains(&segment.wire_id))
			.filter(|(_, info)| info.endpoints.p0_type == SegmentPointType::Input || info.endpoints.p1_type == SegmentPointType::Input)
			.count()
	}
}

/// Whether two collinear lines share any interior or boundary points.
fn lines_overlap(a: OrderedLine, b: OrderedLine) -> bool {
	if !a.is_collinear(&b) {
		return false;
	}
	a.p0() <= b.p1() && b.p0() <= a.p1()
}

/// Reference [`SpatialIndex`] tracking every segment of every wire.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GridSpatialIndex {
	table: GeometryTable,
}

impl MessageReceiver for GridSpatialIndex {
	fn handle(&mut self, message: &Message) {
		self.table.apply(message);
	}
}

impl SpatialIndex for GridSpatialIndex {
	fn query_line_segments(&self, point: Point) -> [Option<Segment>; 4] {
		let found = self.table.query_point(point, |_| true);
		let mut result = [None; 4];
		for (slot, (segment, _, _)) in result.iter_mut().zip(found.into_iter()) {
			*slot = Some(segment);
		}
		result
	}
}

/// Reference [`CollisionIndex`] considering inserted wires only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GridCollisionIndex {
	table: GeometryTable,
}

impl GridCollisionIndex {
	fn inserted(segment: Segment) -> bool {
		segment.wire_id.is_inserted()
	}
}

impl MessageReceiver for GridCollisionIndex {
	fn handle(&mut self, message: &Message) {
		self.table.apply(message);
	}
}

impl CollisionIndex for GridCollisionIndex {
	fn get_first_wire(&self, point: Point) -> Option<WireId> {
		self.table
			.query_point(point, Self::inserted)
			.into_iter()
			.map(|(segment, ..)| segment.wire_id)
			.min_by_key(|id| id.raw())
	}

	fn is_colliding(&self, line: OrderedLine) -> bool {
		self.table.is_colliding(line, Self::inserted)
	}

	fn is_wires_crossing(&self, point: Point) -> bool {
		let found = self.table.query_point(point, Self::inserted);
		let wires: std::collections::HashSet<_> = found.iter().map(|(s, ..)| s.wire_id).collect();
		let through_count = found.iter().filter(|(_, _, inc)| *inc == Incidence::Through).count();
		let total_inputs = self.table.count_wire_inputs(&wires, Self::inserted);
		wires.len() == 2 && through_count == 2 && total_inputs <= 1
	}

	fn is_wire_cross_point(&self, point: Point) -> bool {
		let found = self.table.query_point(point, Self::inserted);
		found.iter().any(|(_, info, _)| {
			let at_p0 = info.line.p0() == point;
			(at_p0 && info.endpoints.p0_type == SegmentPointType::CrossPoint)
				|| (!at_p0 && info.endpoints.p1_type == SegmentPointType::CrossPoint)
		})
	}

	fn query(&self, point: Point) -> PointQuery {
		let found = self.table.query_point(point, Self::inserted);
		let mut result = PointQuery::default();
		for (_, info, incidence) in &found {
			if *incidence == Incidence::Through {
				continue;
			}
			let at_p0 = info.line.p0() == point;
			let ty = if at_p0 { info.endpoints.p0_type } else { info.endpoints.p1_type };
			match ty {
				SegmentPointType::CornerPoint => result.is_wire_corner_point = true,
				SegmentPointType::CrossPoint => result.is_wire_cross_point = true,
				_ => {}
			}
			if ty.is_connecting() {
				result.is_wire_connection = true;
			}
		}
		result
	}
}

/// Reference [`KeyIndex`]: a bidirectional map between segments and
/// stable keys, following the same "relocate on id change" discipline the
/// spatial/collision indices use.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SegmentKeyIndex {
	segment_to_key: HashMap<Segment, SegmentKey>,
	key_to_segment: HashMap<SegmentKey, Segment>,
	next_key: u64,
}

impl SegmentKeyIndex {
	/// Mints a fresh key and associates it with `segment`.
	pub fn assign_new_key(&mut self, segment: Segment) -> SegmentKey {
		let key = SegmentKey::from_raw(self.next_key);
		self.next_key += 1;
		self.set_key(segment, key);
		key
	}

	/// Drops all bookkeeping for `segment`'s key (used when a segment is
	/// permanently deleted, not merely relocated).
	pub fn retire(&mut self, segment: Segment) {
		if let Some(key) = self.segment_to_key.remove(&segment) {
			self.key_to_segment.remove(&key);
		}
	}

	pub fn segment_for(&self, key: SegmentKey) -> Option<Segment> {
		self.key_to_segment.get(&key).copied()
	}
}

impl MessageReceiver for SegmentKeyIndex {
	fn handle(&mut self, message: &Message) {
		if let Message::SegmentIdUpdated { old, new } = *message {
			if let Some(key) = self.segment_to_key.remove(&old) {
				self.segment_to_key.insert(new, key);
				self.key_to_segment.insert(key, new);
			}
		}
	}
}

impl KeyIndex for SegmentKeyIndex {
	fn get(&self, segment: Segment) -> SegmentKey {
		self.segment_to_key.get(&segment).copied().expect("segment has no key")
	}

	fn set_key(&mut self, segment: Segment, key: SegmentKey) {
		self.segment_to_key.insert(segment, key);
		self.key_to_segment.insert(key, segment);
	}

	fn swap_key(&mut self, a: Segment, b: Segment) {
		let key_a = self.segment_to_key.get(&a).copied();
		let key_b = self.segment_to_key.get(&b).copied();
		match (key_a, key_b) {
			(Some(ka), Some(kb)) => {
				self.segment_to_key.insert(a, kb);
				self.segment_to_key.insert(b, ka);
				self.key_to_segment.insert(ka, b);
				self.key_to_segment.insert(kb, a);
			}
			(Some(ka), None) => {
				self.segment_to_key.remove(&a);
				self.set_key(b, ka);
			}
			(None, Some(kb)) => {
				self.segment_to_key.remove(&b);
				self.set_key(a, kb);
			}
			(None, None) => {}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::grid::{Endpoints, Point};

	fn info(x0: i32, y0: i32, x1: i32, y1: i32) -> SegmentInfo {
		SegmentInfo::new(OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1)).unwrap(), Endpoints::SHADOW)
	}

	#[test]
	fn spatial_index_tracks_created_segments() {
		let mut index = GridSpatialIndex::default();
		let segment = Segment::new(WireId::TEMPORARY, 0);
		index.handle(&Message::SegmentCreated(crate::message::SegmentGeometry { segment, info: info(0, 0, 10, 0) }));
		let found = index.query_line_segments(Point::new(0, 0));
		assert_eq!(found[0], Some(segment));
	}

	#[test]
	fn key_index_relocates_on_id_update() {
		let mut index = SegmentKeyIndex::default();
		let a = Segment::new(WireId::TEMPORARY, 0);
		let key = index.assign_new_key(a);
		let b = Segment::new(WireId::TEMPORARY, 3);
		index.handle(&Message::SegmentIdUpdated { old: a, new: b });
		assert_eq!(index.get(b), key);
		assert_eq!(index.segment_for(key), Some(b));
	}
}
