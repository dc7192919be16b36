//! `logiwire`: the editable-wire subsystem of a grid-based digital logic
//! circuit editor.
//!
//! A [`circuit_data::CircuitData`] owns a wire table and keeps a handful
//! of reference indices (spatial, collision, stable keys) coherent with it
//! over a message bus. Every public edit lives in [`editing::handlers`];
//! [`editing::detail`] holds the geometric primitives those build on.
//! [`invariant::check`] is the single source of truth for "this inserted
//! wire is well-formed".

pub mod circuit_data;
pub mod diagnostics;
pub mod editing;
pub mod error;
pub mod grid;
pub mod ids;
pub mod index;
pub mod invariant;
pub mod message;
pub mod part;
pub mod segment_tree;
pub mod undo;
pub mod wire;

pub use circuit_data::CircuitData;
pub use editing::handlers::InsertionMode;
pub use error::{EditError, EditResult};
