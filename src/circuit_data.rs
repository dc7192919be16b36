//! `CircuitData`: the single owner of the wire table and every index
//! (spec.md section 5 "Shared resources" / section 9 "Ownership").
//!
//! Every public edit-wire operation in [`crate::editing::handlers`] takes
//! an exclusive borrow of a `CircuitData`. Message emission is a direct
//! synchronous call graph: `emit` hands the message to the three owned
//! reference indices and every registered selection, in that order, and
//! none of them may re-enter `CircuitData` while handling it.

use crate::index::{
	CollisionIndex, GridCollisionIndex, GridSpatialIndex, KeyIndex, LogicItemInputIndex, LogicItemOutputIndex, NullLogicItemIndex, SegmentKeyIndex, SpatialIndex,
};
use crate::message::{Message, MessageReceiver};
use crate::undo::UndoLog;
use crate::wire::WireTable;

/// Owns the wire table, the three reference indices, the caller-supplied
/// logic-item indices, live selections, and the undo log.
pub struct CircuitData {
	wires: WireTable,
	spatial: GridSpatialIndex,
	collision: GridCollisionIndex,
	keys: SegmentKeyIndex,
	logic_inputs: Box<dyn LogicItemInputIndex>,
	logic_outputs: Box<dyn LogicItemOutputIndex>,
	selections: Vec<Box<dyn MessageReceiver>>,
	undo: UndoLog,
}

impl Default for CircuitData {
	fn default() -> Self {
		Self {
			wires: WireTable::new(),
			spatial: GridSpatialIndex::default(),
			collision: GridCollisionIndex::default(),
			keys: SegmentKeyIndex::default(),
			logic_inputs: Box::new(NullLogicItemIndex),
			logic_outputs: Box::new(NullLogicItemIndex),
			selections: Vec::new(),
			undo: UndoLog::new(),
		}
	}
}

impl CircuitData {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wires in a caller-supplied logic-item index, replacing the null
	/// default. Out of scope for the core itself (spec.md section 1); a
	/// host application owns logic-item placement.
	pub fn set_logic_input_index(&mut self, index: Box<dyn LogicItemInputIndex>) {
		self.logic_inputs = index;
	}

	pub fn set_logic_output_index(&mut self, index: Box<dyn LogicItemOutputIndex>) {
		self.logic_outputs = index;
	}

	pub fn register_selection(&mut self, selection: Box<dyn MessageReceiver>) {
		self.selections.push(selection);
	}

	pub fn wires(&self) -> &WireTable {
		&self.wires
	}

	pub(crate) fn wires_mut(&mut self) -> &mut WireTable {
		&mut self.wires
	}

	pub fn collision(&self) -> &dyn CollisionIndex {
		&self.collision
	}

	pub fn spatial(&self) -> &dyn SpatialIndex {
		&self.spatial
	}

	pub fn keys(&self) -> &dyn KeyIndex {
		&self.keys
	}

	pub(crate) fn keys_mut(&mut self) -> &mut SegmentKeyIndex {
		&mut self.keys
	}

	pub(crate) fn logic_inputs(&self) -> &dyn LogicItemInputIndex {
		self.logic_inputs.as_ref()
	}

	pub(crate) fn logic_outputs(&self) -> &dyn LogicItemOutputIndex {
		self.logic_outputs.as_ref()
	}

	pub fn undo_log(&self) -> &UndoLog {
		&self.undo
	}

	pub(crate) fn push_undo(&mut self, record: crate::undo::UndoRecord) {
		self.undo.push(record);
	}

	/// Delivers `message` to every owned index and selection, in a fixed
	/// order (spatial, collision, keys, then selections in registration
	/// order). No receiver may submit a further message while handling
	/// this one (spec.md section 5).
	pub(crate) fn emit(&mut self, message: Message) {
		self.spatial.handle(&message);
		self.collision.handle(&message);
		self.keys.handle(&message);
		for selection in &mut self.selections {
			selection.handle(&message);
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::grid::{Endpoints, OrderedLine, Point, SegmentInfo};
	use crate::ids::{Segment, WireId};
	use crate::message::SegmentGeometry;

	#[test]
	fn emit_reaches_spatial_and_key_indices() {
		let mut circuit = CircuitData::new();
		let segment = Segment::new(WireId::TEMPORARY, 0);
		let info = SegmentInfo::new(OrderedLine::new(Point::new(0, 0), Point::new(4, 0)).unwrap(), Endpoints::SHADOW);
		circuit.keys_mut().assign_new_key(segment);
		circuit.emit(Message::SegmentCreated(SegmentGeometry { segment, info }));
		assert_eq!(circuit.spatial().query_line_segments(Point::new(0, 0))[0], Some(segment));
	}
}
