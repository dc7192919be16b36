//! The message bus (spec.md section 6 / section 4 subsections).
//!
//! Submission is a direct synchronous call graph: [`crate::circuit_data::CircuitData`]
//! calls every subscriber in turn for each message a public operation emits.
//! Subscribers may not re-enter the core or submit further messages while
//! handling one (spec.md section 5).

use crate::grid::{Endpoints, SegmentInfo};
use crate::ids::Segment;

/// A segment's address plus its current line and endpoint types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentGeometry {
	pub segment: Segment,
	pub info: SegmentInfo,
}

/// A notification delivered to every index and live selection after a
/// wire-table mutation. Field shapes are an implementation choice (the
/// source material describes these by name and purpose, not wire
/// format); see `DESIGN.md`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
	/// A brand-new segment now exists (`add_segment` on the temporary
	/// wire).
	SegmentCreated(SegmentGeometry),
	/// A segment's address changed (its wire, its index, or both) while
	/// its geometry stayed the same; e.g. swap-delete filling a hole, or
	/// a full-segment move between trees.
	SegmentIdUpdated { old: Segment, new: Segment },
	/// A segment's line and/or endpoints changed in place at the same
	/// address (shrink, merge result, split remainder).
	SegmentGeometryUpdated { segment: Segment, old: SegmentInfo, new: SegmentInfo },
	/// Semantic notification that a `segment_part` moved from `old` to
	/// `new`, possibly creating the destination and/or deleting what's
	/// left of the source. The underlying index bookkeeping is carried by
	/// the `SegmentCreated`/`SegmentIdUpdated`/`SegmentGeometryUpdated`/
	/// `SegmentPartDeleted` messages emitted alongside this one; this
	/// message exists for selections and undo plumbing that care about
	/// the higher-level meaning, matching the spec's multiple-messages-
	/// per-primitive pattern (section 4.3).
	SegmentPartMoved { old: SegmentGeometry, new: SegmentGeometry, create_destination: bool, delete_source: bool },
	/// A `segment_part` was removed outright (no destination).
	SegmentPartDeleted(SegmentGeometry),
	/// A segment crossed from an uninserted wire into an inserted one.
	SegmentInserted(SegmentGeometry),
	/// A segment crossed from an inserted wire into an uninserted one.
	SegmentUninserted(SegmentGeometry),
	/// A segment's endpoint types changed in place.
	SegmentEndpointsUpdated { segment: Segment, old: Endpoints, new: Endpoints },
}

/// Anything that needs to stay coherent with the wire table: the three
/// concrete indices the core owns, and any live selection.
pub trait MessageReceiver {
	fn handle(&mut self, message: &Message);
}
