//! Wire table: the ordered collection of wires indexed by `wire_id`
//! (spec.md section 3 "Wire table").
//!
//! Wire 0 is the temporary aggregate, wire 1 the colliding aggregate; both
//! always exist. Wires `>= 2` are inserted trees and are never left empty
//! by the edit-wire layer — an emptied inserted wire is deleted through
//! [`WireTable::swap_and_delete_wire`].

use serde::{Deserialize, Serialize};

use crate::ids::WireId;
use crate::segment_tree::SegmentTree;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireTable {
	/// `wires[0]` = temporary, `wires[1]` = colliding, `wires[>=2]` = inserted.
	wires: Vec<SegmentTree>,
}

impl Default for WireTable {
	fn default() -> Self {
		Self { wires: vec![SegmentTree::new(), SegmentTree::new()] }
	}
}

impl WireTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, id: WireId) -> &SegmentTree {
		&self.wires[id.raw() as usize]
	}

	pub fn get_mut(&mut self, id: WireId) -> &mut SegmentTree {
		&mut self.wires[id.raw() as usize]
	}

	pub fn temporary(&self) -> &SegmentTree {
		self.get(WireId::TEMPORARY)
	}

	pub fn temporary_mut(&mut self) -> &mut SegmentTree {
		self.get_mut(WireId::TEMPORARY)
	}

	pub fn colliding(&self) -> &SegmentTree {
		self.get(WireId::COLLIDING)
	}

	pub fn colliding_mut(&mut self) -> &mut SegmentTree {
		self.get_mut(WireId::COLLIDING)
	}

	/// `add_wire`: appends a new empty inserted wire, returning its id.
	pub fn add_wire(&mut self) -> WireId {
		self.wires.push(SegmentTree::new());
		WireId::from_raw((self.wires.len() - 1) as u32)
	}

	/// Number of wires in the table, including the two aggregates.
	pub fn len(&self) -> usize {
		self.wires.len()
	}

	/// Inserted wire ids currently in the table (`>= 2`).
	pub fn inserted_ids(&self) -> impl Iterator<Item = WireId> + '_ {
		(2..self.wires.len()).map(|i| WireId::from_raw(i as u32))
	}

	/// `swap_and_delete_empty_wire`: swaps the last wire into `id`'s slot
	/// and shrinks the table. Requires `id` to be inserted and its tree
	/// empty. Returns the id that used to address the wire now occupying
	/// `id`'s slot (`None` if `id` was already last), so the caller can
	/// notify every index/selection referencing the old id.
	pub fn swap_and_delete_empty_wire(&mut self, id: WireId) -> Option<WireId> {
		assert!(id.is_inserted(), "only inserted wires may be deleted");
		assert!(self.get(id).is_empty(), "wire must be empty before deletion");
		let last = WireId::from_raw((self.wires.len() - 1) as u32);
		self.wires.swap_remove(id.raw() as usize);
		(id != last).then_some(last)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn aggregates_always_present() {
		let table = WireTable::new();
		assert_eq!(table.len(), 2);
		assert!(table.temporary().is_empty());
		assert!(table.colliding().is_empty());
	}

	#[test]
	fn add_and_delete_wire_reindexes() {
		let mut table = WireTable::new();
		let w2 = table.add_wire();
		let w3 = table.add_wire();
		assert_eq!(w2.raw(), 2);
		assert_eq!(w3.raw(), 3);

		let moved = table.swap_and_delete_empty_wire(w2);
		assert_eq!(moved, Some(w3));
		assert_eq!(table.len(), 3);
	}
}
