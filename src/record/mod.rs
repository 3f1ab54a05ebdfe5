//! Record shredding: turning a tree-shaped input record into per-leaf
//! `(repetitionLevel, definitionLevel, value)` triples (spec.md §3).

pub mod shredder;
pub mod value;

pub use shredder::{shred_record, Field, GroupValue, LeafTriples};
pub use value::Value;
