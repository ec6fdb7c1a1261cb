//! Deferred values supplied per record.
//!
//! A deferred fragment reserves a slot at a known index of the argument list.
//! After the walk, the record is asked for the values of all requested
//! columns; it pushes `(column, value)` pairs in any order. The pairs are
//! matched to slots by column name, and by occurrence when the same column is
//! requested more than once. Each value is then swapped into its slot.
//!
//! Splicing is all-or-nothing: if any column cannot be matched the argument
//! list is restored and an error is returned.

use super::DeferredSlot;
use crate::dml::StatementKind;
use crate::error::{DbrError, DbrResult};
use crate::value::Value;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Supplies values for deferred placeholders.
///
/// Implementations push exactly one value per requested column, using
/// [`DbrError::unresolved_column`] for columns they cannot resolve.
pub trait Assembler: Send + Sync {
    fn assemble_args(
        &self,
        kind: StatementKind,
        requested: &[&str],
        out: &mut AssembledArgs<'_>,
    ) -> DbrResult<()>;
}

/// Sink an [`Assembler`] pushes its values into.
pub struct AssembledArgs<'a> {
    args: &'a mut Vec<Value>,
    base: usize,
    columns: Vec<String>,
}

impl AssembledArgs<'_> {
    /// Arguments collected so far, deferred slots holding NULL.
    pub fn current(&self) -> &[Value] {
        &self.args[..self.base]
    }

    /// Supply the value of `column`.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(column.into());
        self.args.push(value.into());
    }

    /// Number of values pushed.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Fill `slots` in `args` with values from `record`.
pub(crate) fn splice(
    kind: StatementKind,
    args: &mut Vec<Value>,
    slots: &[DeferredSlot],
    record: &dyn Assembler,
) -> DbrResult<()> {
    let base = args.len();
    let requested: Vec<&str> = slots.iter().map(|s| s.column.as_str()).collect();
    let mut out = AssembledArgs {
        args: &mut *args,
        base,
        columns: Vec::with_capacity(slots.len()),
    };
    let assembled = record.assemble_args(kind, &requested, &mut out);
    let supplied = out.columns;
    if let Err(err) = assembled {
        args.truncate(base);
        return Err(err);
    }

    match match_slots(kind, slots, &requested, &supplied) {
        Ok(positions) => {
            for (slot, j) in slots.iter().zip(positions) {
                args.swap(slot.index, base + j);
            }
            args.truncate(base);
            Ok(())
        }
        Err(err) => {
            args.truncate(base);
            Err(err)
        }
    }
}

/// For each slot, the position of its value among the supplied pairs.
fn match_slots(
    kind: StatementKind,
    slots: &[DeferredSlot],
    requested: &[&str],
    supplied: &[String],
) -> DbrResult<Vec<usize>> {
    let mut used = vec![false; supplied.len()];
    let mut positions = Vec::with_capacity(slots.len());
    for slot in slots {
        let found = supplied
            .iter()
            .enumerate()
            .position(|(j, column)| !used[j] && *column == slot.column);
        match found {
            Some(j) => {
                used[j] = true;
                positions.push(j);
            }
            None => return Err(DbrError::unresolved_column(kind, slot.column.clone())),
        }
    }

    if let Some(j) = used.iter().position(|u| !u) {
        let column = &supplied[j];
        if !requested.contains(&column.as_str()) {
            return Err(DbrError::UnexpectedColumn {
                kind,
                column: column.clone(),
            });
        }
        return Err(DbrError::ArgumentCountMismatch {
            placeholders: slots.len(),
            args: supplied.len(),
        });
    }
    Ok(positions)
}

fn push_from_map<'v>(
    kind: StatementKind,
    requested: &[&str],
    out: &mut AssembledArgs<'_>,
    lookup: impl Fn(&str) -> Option<&'v Value>,
) -> DbrResult<()> {
    for column in requested {
        let value = lookup(column).ok_or_else(|| DbrError::unresolved_column(kind, *column))?;
        out.push(*column, value.clone());
    }
    Ok(())
}

impl Assembler for HashMap<String, Value> {
    fn assemble_args(
        &self,
        kind: StatementKind,
        requested: &[&str],
        out: &mut AssembledArgs<'_>,
    ) -> DbrResult<()> {
        push_from_map(kind, requested, out, |c| self.get(c))
    }
}

impl Assembler for BTreeMap<String, Value> {
    fn assemble_args(
        &self,
        kind: StatementKind,
        requested: &[&str],
        out: &mut AssembledArgs<'_>,
    ) -> DbrResult<()> {
        push_from_map(kind, requested, out, |c| self.get(c))
    }
}

/// A record built from any serializable struct.
///
/// Fields become columns. JSON scalars map to the matching [`Value`]; nested
/// arrays and objects are bound as JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonRecord {
    fields: BTreeMap<String, Value>,
}

impl JsonRecord {
    /// Serialize `value`, which must serialize to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> DbrResult<Self> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => Ok(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, json_to_value(v)))
                    .collect(),
            }),
            other => Err(DbrError::configuration(format!(
                "record must serialize to a JSON object, got {other}"
            ))),
        }
    }

    /// Value of a field, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::Uint(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::Float)
            }
        }
        serde_json::Value::String(s) => Value::Text(s),
        other => Value::Json(other),
    }
}

impl Assembler for JsonRecord {
    fn assemble_args(
        &self,
        kind: StatementKind,
        requested: &[&str],
        out: &mut AssembledArgs<'_>,
    ) -> DbrResult<()> {
        push_from_map(kind, requested, out, |c| self.fields.get(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(index: usize, column: &str) -> DeferredSlot {
        DeferredSlot {
            index,
            column: column.to_string(),
        }
    }

    /// Pushes its columns in reverse order of the request.
    struct Reversed(HashMap<String, Value>);

    impl Assembler for Reversed {
        fn assemble_args(
            &self,
            kind: StatementKind,
            requested: &[&str],
            out: &mut AssembledArgs<'_>,
        ) -> DbrResult<()> {
            for column in requested.iter().rev() {
                let value = self
                    .0
                    .get(*column)
                    .ok_or_else(|| DbrError::unresolved_column(kind, *column))?;
                out.push(*column, value.clone());
            }
            Ok(())
        }
    }

    #[test]
    fn values_land_in_their_slots_regardless_of_order() {
        let mut args = vec![Value::Int(1), Value::Null, Value::Int(2), Value::Null];
        let slots = [slot(1, "a"), slot(3, "b")];
        let record = Reversed(HashMap::from([
            ("a".to_string(), Value::from("A")),
            ("b".to_string(), Value::from("B")),
        ]));
        splice(StatementKind::Update, &mut args, &slots, &record).unwrap();
        assert_eq!(
            args,
            vec![Value::Int(1), Value::from("A"), Value::Int(2), Value::from("B")]
        );
    }

    #[test]
    fn repeated_column_matches_by_occurrence() {
        let mut args = vec![Value::Null, Value::Null];
        let slots = [slot(0, "a"), slot(1, "a")];
        let record = HashMap::from([("a".to_string(), Value::Int(7))]);
        splice(StatementKind::Select, &mut args, &slots, &record).unwrap();
        assert_eq!(args, vec![Value::Int(7), Value::Int(7)]);
    }

    #[test]
    fn missing_column_restores_args() {
        let mut args = vec![Value::Int(1), Value::Null];
        let slots = [slot(1, "email")];
        let record: HashMap<String, Value> = HashMap::new();
        let err = splice(StatementKind::Update, &mut args, &slots, &record).unwrap_err();
        assert_eq!(err.to_string(), "UPDATE: column 'email' not found");
        assert_eq!(args, vec![Value::Int(1), Value::Null]);
    }

    struct Extra;

    impl Assembler for Extra {
        fn assemble_args(
            &self,
            _kind: StatementKind,
            requested: &[&str],
            out: &mut AssembledArgs<'_>,
        ) -> DbrResult<()> {
            for column in requested {
                out.push(*column, 1);
            }
            out.push("surprise", 2);
            Ok(())
        }
    }

    #[test]
    fn unrequested_column_is_rejected() {
        let mut args = vec![Value::Null];
        let err = splice(StatementKind::Insert, &mut args, &[slot(0, "a")], &Extra).unwrap_err();
        assert!(matches!(err, DbrError::UnexpectedColumn { ref column, .. } if column == "surprise"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn json_record_from_struct() {
        #[derive(Serialize)]
        struct User {
            id: i64,
            name: String,
            email: Option<String>,
            tags: Vec<String>,
        }
        let record = JsonRecord::from_serialize(&User {
            id: 5,
            name: "ann".into(),
            email: None,
            tags: vec!["x".into()],
        })
        .unwrap();
        assert_eq!(record.get("id"), Some(&Value::Int(5)));
        assert_eq!(record.get("name"), Some(&Value::from("ann")));
        assert_eq!(record.get("email"), Some(&Value::Null));
        assert_eq!(
            record.get("tags"),
            Some(&Value::Json(serde_json::json!(["x"])))
        );
    }

    #[test]
    fn json_record_requires_object() {
        let err = JsonRecord::from_serialize(&[1, 2]).unwrap_err();
        assert!(err.is_configuration());
    }
}
