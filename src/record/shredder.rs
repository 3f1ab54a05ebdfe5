//! Dremel-style record shredding (spec.md §3): walks a record tree
//! alongside the schema tree and produces, for every leaf column, the
//! sequence of `(repetitionLevel, definitionLevel, value | null)` triples
//! that one input record contributes.
//!
//! The leaf order of the returned triples matches
//! [`crate::metadata::SchemaDescriptor::columns`]: both walk the same
//! schema tree depth-first, visiting each group's fields in declared order.

use crate::error::{ParquetError, Result};
use crate::record::value::Value;
use crate::schema::{ParquetType, Repetition};

/// One input record's value for a schema field: either a leaf value, an
/// absent/null field, a nested group, or a repeated field's list of items.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    Null,
    Value(Value),
    Group(GroupValue),
    /// The realized items of a `REPEATED` field; an empty vec means the
    /// field occurs zero times in this record.
    List(Vec<Field>),
}

/// A record (or nested group)'s named fields, in any order; shredding
/// looks each schema field up by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupValue {
    fields: Vec<(String, Field)>,
}

impl GroupValue {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }
}

/// One leaf column's triples contributed by a single shredded record.
pub type LeafTriples = Vec<(i16, i16, Option<Value>)>;

/// Shreds one record against `root` (the schema's message/root node),
/// returning one [`LeafTriples`] per leaf, in schema-DFS order.
///
/// A `REQUIRED` field that is missing always raises
/// [`ParquetError::InvalidRecord`], regardless of `validating` (spec.md §7,
/// §9 Open Question: this structural check is always enforced). `validating`
/// only gates the extra, redundant check that a leaf value's physical type
/// matches its schema type.
pub fn shred_record(root: &ParquetType, record: &GroupValue, validating: bool) -> Result<Vec<LeafTriples>> {
    let mut out = Vec::new();
    for field in root.fields() {
        shred_present(field, record.get(field.name()), 0, 0, validating, &mut out)?;
    }
    Ok(out)
}

fn collect_leaves_absent(node: &ParquetType, rep: i16, def: i16, out: &mut Vec<LeafTriples>) {
    match node {
        ParquetType::PrimitiveType { .. } => out.push(vec![(rep, def, None)]),
        ParquetType::GroupType { fields, .. } => {
            for field in fields {
                collect_leaves_absent(field, rep, def, out);
            }
        }
    }
}

fn shred_present(
    node: &ParquetType,
    field: Option<&Field>,
    rep_for_first: i16,
    def_before: i16,
    validating: bool,
    out: &mut Vec<LeafTriples>,
) -> Result<()> {
    match node.repetition() {
        Some(Repetition::Required) => shred_required(node, field, rep_for_first, def_before, validating, out),
        Some(Repetition::Optional) => {
            shred_optional(node, field, rep_for_first, def_before, validating, out)
        }
        Some(Repetition::Repeated) => {
            shred_repeated(node, field, rep_for_first, def_before, validating, out)
        }
        None => Err(ParquetError::InvalidRecord(
            "cannot shred the root message as a field".to_string(),
        )),
    }
}

fn shred_required(
    node: &ParquetType,
    field: Option<&Field>,
    rep: i16,
    def: i16,
    validating: bool,
    out: &mut Vec<LeafTriples>,
) -> Result<()> {
    match field {
        // A missing REQUIRED field always raises InvalidRecord, even when
        // validating is false: `validating` only gates the extra level and
        // type assertions, not this structural check (spec.md §7, §9).
        None | Some(Field::Null) => Err(ParquetError::InvalidRecord(format!(
            "required field '{}' is missing",
            node.name()
        ))),
        Some(Field::Value(v)) => shred_leaf_value(node, v, rep, def, validating, out),
        Some(Field::Group(group)) => shred_children(node, group, rep, def, validating, out),
        Some(Field::List(_)) => Err(ParquetError::InvalidRecord(format!(
            "field '{}' is REQUIRED, not REPEATED",
            node.name()
        ))),
    }
}

fn shred_optional(
    node: &ParquetType,
    field: Option<&Field>,
    rep: i16,
    def_before: i16,
    validating: bool,
    out: &mut Vec<LeafTriples>,
) -> Result<()> {
    match field {
        None | Some(Field::Null) => {
            collect_leaves_absent(node, rep, def_before, out);
            Ok(())
        }
        Some(Field::Value(v)) => shred_leaf_value(node, v, rep, def_before + 1, validating, out),
        Some(Field::Group(group)) => shred_children(node, group, rep, def_before + 1, validating, out),
        Some(Field::List(_)) => Err(ParquetError::InvalidRecord(format!(
            "field '{}' is OPTIONAL, not REPEATED",
            node.name()
        ))),
    }
}

fn shred_repeated(
    node: &ParquetType,
    field: Option<&Field>,
    rep_for_first: i16,
    def_before: i16,
    validating: bool,
    out: &mut Vec<LeafTriples>,
) -> Result<()> {
    let items: &[Field] = match field {
        None | Some(Field::Null) => &[],
        Some(Field::List(items)) => items,
        Some(_) => {
            return Err(ParquetError::InvalidRecord(format!(
                "field '{}' is REPEATED and must be given as a list",
                node.name()
            )))
        }
    };

    if items.is_empty() {
        collect_leaves_absent(node, rep_for_first, def_before, out);
        return Ok(());
    }

    let rep_for_repeat = def_before_to_rep_after_repeat(node, rep_for_first);
    for (i, item) in items.iter().enumerate() {
        let rep = if i == 0 { rep_for_first } else { rep_for_repeat };
        let def = def_before + 1;
        match item {
            Field::Null => collect_leaves_absent(node, rep, def, out),
            Field::Value(v) => shred_leaf_value(node, v, rep, def, validating, out)?,
            Field::Group(group) => shred_children(node, group, rep, def, validating, out)?,
            Field::List(_) => {
                return Err(ParquetError::InvalidRecord(format!(
                    "field '{}' cannot nest a list directly inside a list",
                    node.name()
                )))
            }
        }
    }
    Ok(())
}

/// A `REPEATED` node's own rep level, used for every occurrence after the
/// first: one more than whatever rep level was in force on entry, since
/// repetition levels only ever increase while descending and this is the
/// first (and only) repeated ancestor introduced at this node.
fn def_before_to_rep_after_repeat(_node: &ParquetType, rep_for_first: i16) -> i16 {
    rep_for_first + 1
}

fn shred_leaf_value(
    node: &ParquetType,
    value: &Value,
    rep: i16,
    def: i16,
    validating: bool,
    out: &mut Vec<LeafTriples>,
) -> Result<()> {
    if validating {
        value.check_type(node.physical_type())?;
    }
    out.push(vec![(rep, def, Some(value.clone()))]);
    Ok(())
}

fn shred_children(
    node: &ParquetType,
    group: &GroupValue,
    rep: i16,
    def: i16,
    validating: bool,
    out: &mut Vec<LeafTriples>,
) -> Result<()> {
    for field in node.fields() {
        shred_present(field, group.get(field.name()), rep, def, validating, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SchemaDescriptor;

    fn spec_schema() -> SchemaDescriptor {
        SchemaDescriptor::try_from_message(
            "message m { optional group a { repeated group b { required int32 c; } } }",
        )
        .unwrap()
    }

    #[test]
    fn absent_optional_group_emits_single_null() {
        let descriptor = spec_schema();
        let record = GroupValue::new(); // field "a" entirely absent
        let triples = shred_record(descriptor.root_schema(), &record, true).unwrap();
        assert_eq!(triples.len(), 1); // one leaf: a.b.c
        assert_eq!(triples[0], vec![(0, 0, None)]);
    }

    #[test]
    fn present_group_with_empty_list_emits_def_one() {
        let descriptor = spec_schema();
        let record = GroupValue::new().with("a", Field::Group(GroupValue::new().with("b", Field::List(vec![]))));
        let triples = shred_record(descriptor.root_schema(), &record, true).unwrap();
        assert_eq!(triples[0], vec![(0, 1, None)]);
    }

    #[test]
    fn present_group_with_two_list_items() {
        let descriptor = spec_schema();
        let record = GroupValue::new().with(
            "a",
            Field::Group(GroupValue::new().with(
                "b",
                Field::List(vec![
                    Field::Group(GroupValue::new().with("c", Field::Value(Value::Int32(1)))),
                    Field::Group(GroupValue::new().with("c", Field::Value(Value::Int32(2)))),
                ]),
            )),
        );
        let triples = shred_record(descriptor.root_schema(), &record, true).unwrap();
        assert_eq!(
            triples[0],
            vec![(0, 2, Some(Value::Int32(1))), (1, 2, Some(Value::Int32(2)))]
        );
    }

    #[test]
    fn missing_required_field_is_invalid_record() {
        let descriptor = spec_schema();
        // b occurs once, but that occurrence never sets the required c.
        let record = GroupValue::new().with(
            "a",
            Field::Group(GroupValue::new().with("b", Field::List(vec![Field::Group(GroupValue::new())]))),
        );
        let err = shred_record(descriptor.root_schema(), &record, true).unwrap_err();
        assert!(matches!(err, ParquetError::InvalidRecord(_)));
    }

    #[test]
    fn missing_required_field_is_invalid_record_even_when_not_validating() {
        let descriptor = spec_schema();
        let record = GroupValue::new().with(
            "a",
            Field::Group(GroupValue::new().with("b", Field::List(vec![Field::Group(GroupValue::new())]))),
        );
        let err = shred_record(descriptor.root_schema(), &record, false).unwrap_err();
        assert!(matches!(err, ParquetError::InvalidRecord(_)));
    }
}
