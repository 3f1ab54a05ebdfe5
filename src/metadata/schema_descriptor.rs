use crate::error::Result;
use crate::schema::message::parse_message;
use crate::schema::types::{ParquetType, Repetition};

use super::column_descriptor::ColumnDescriptor;

/// Flattens a schema tree into its ordered leaves, computing each leaf's
/// `maxRep`/`maxDef` levels by walking root-to-leaf and counting
/// non-`REQUIRED` and `REPEATED` ancestors respectively (spec.md §3).
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    schema: ParquetType,
    leaves: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    /// Builds a descriptor from an already-constructed root [`ParquetType`].
    ///
    /// # Panics
    /// Panics if `root` is not a root group (i.e. `root.is_root()` is false).
    pub fn new(root: ParquetType) -> Self {
        assert!(root.is_root(), "SchemaDescriptor requires a root message type");
        let mut leaves = vec![];
        for field in root.fields() {
            let mut path = vec![];
            build_tree(field, 0, 0, &mut leaves, &mut path);
        }
        Self {
            schema: root,
            leaves,
        }
    }

    /// Parses the textual grammar in [`crate::schema::message`] and builds a
    /// descriptor from it.
    pub fn try_from_message(schema: &str) -> Result<Self> {
        Ok(Self::new(parse_message(schema)?))
    }

    pub fn column(&self, i: usize) -> &ColumnDescriptor {
        &self.leaves[i]
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.leaves
    }

    pub fn num_columns(&self) -> usize {
        self.leaves.len()
    }

    pub fn root_schema(&self) -> &ParquetType {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }
}

fn build_tree(
    node: &ParquetType,
    mut max_rep_level: i16,
    mut max_def_level: i16,
    leaves: &mut Vec<ColumnDescriptor>,
    path_so_far: &mut Vec<String>,
) {
    path_so_far.push(node.name().to_string());
    match node.repetition() {
        Some(Repetition::Optional) => max_def_level += 1,
        Some(Repetition::Repeated) => {
            max_def_level += 1;
            max_rep_level += 1;
        }
        _ => {}
    }

    match node {
        ParquetType::PrimitiveType { .. } => {
            leaves.push(ColumnDescriptor::new(
                node.clone(),
                max_def_level,
                max_rep_level,
                path_so_far.clone(),
            ));
        }
        ParquetType::GroupType { fields, .. } => {
            for field in fields {
                build_tree(field, max_rep_level, max_def_level, leaves, path_so_far);
                path_so_far.pop();
            }
        }
    }
    // `node`'s own push is popped by the caller's loop iteration (or, for a
    // root-level field, is harmless since each root field gets a fresh path).
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_levels() {
        let schema = SchemaDescriptor::try_from_message("message m { required int32 x; optional int32 y; }").unwrap();
        assert_eq!(schema.num_columns(), 2);
        assert_eq!(schema.column(0).max_def_level(), 0);
        assert_eq!(schema.column(0).max_rep_level(), 0);
        assert_eq!(schema.column(1).max_def_level(), 1);
        assert_eq!(schema.column(1).max_rep_level(), 0);
    }

    #[test]
    fn nested_levels_match_spec_scenario() {
        // message M { optional group a { repeated group b { required int32 c; }}}
        let schema = SchemaDescriptor::try_from_message(
            "message m { optional group a { repeated group b { required int32 c; } } }",
        )
        .unwrap();
        assert_eq!(schema.num_columns(), 1);
        let c = schema.column(0);
        assert_eq!(c.max_def_level(), 2);
        assert_eq!(c.max_rep_level(), 1);
        assert_eq!(c.path_in_schema(), &["a".to_string(), "b".to_string(), "c".to_string()]);
    }
}
