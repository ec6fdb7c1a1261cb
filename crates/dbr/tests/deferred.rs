//! Deferred values filled from records at build time.

use dbr::prelude::*;
use dbr::{AssembledArgs, StatementKind};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct User {
    id: i64,
    name: String,
    email: String,
}

/// Pushes only the columns it knows, in its own fixed order.
struct Fixed {
    email: &'static str,
    id: i64,
}

impl Assembler for Fixed {
    fn assemble_args(
        &self,
        kind: StatementKind,
        requested: &[&str],
        out: &mut AssembledArgs<'_>,
    ) -> DbrResult<()> {
        // Always id first, whatever order the statement asked in.
        let mut wanted: Vec<&str> = requested.to_vec();
        wanted.sort_by_key(|c| if *c == "id" { 0 } else { 1 });
        for column in wanted {
            match column {
                "id" => out.push("id", self.id),
                "email" => out.push("email", self.email),
                other => return Err(DbrError::unresolved_column(kind, other)),
            }
        }
        Ok(())
    }
}

#[test]
fn values_follow_placeholder_order_not_record_order() {
    let stmt = update("users")
        .set("name", "fixed")
        .set_deferred("email")
        .filter(col("id").deferred())
        .filter(col("active").bool(true));

    let (sql, args) = stmt
        .to_sql_record(&Fixed {
            email: "e@x",
            id: 9,
        })
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE users SET name=?, email=? WHERE (id = ?) AND (active = ?)"
    );
    assert_eq!(
        args,
        vec![
            Value::from("fixed"),
            Value::from("e@x"),
            Value::Int(9),
            Value::Bool(true)
        ]
    );
}

#[test]
fn unresolved_column_names_statement_and_column() {
    let stmt = update("users")
        .set_deferred("email")
        .filter(col("id").int(1));
    let record: BTreeMap<String, Value> = BTreeMap::from([("name".to_string(), Value::from("x"))]);

    let result = stmt.to_sql_record(&record);
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "UPDATE: column 'email' not found");
    assert!(err.is_unresolved_column());
}

#[test]
fn json_record_from_struct() {
    let stmt = update("users")
        .set_deferred_columns(["name", "email"])
        .filter(col("id").deferred());
    let users = [
        User {
            id: 1,
            name: "ann".into(),
            email: "a@x".into(),
        },
        User {
            id: 2,
            name: "bob".into(),
            email: "b@x".into(),
        },
    ];

    let mut built = Vec::new();
    for user in &users {
        let record = JsonRecord::from_serialize(user).unwrap();
        built.push(stmt.to_sql_record(&record).unwrap());
    }
    assert_eq!(built[0].0, built[1].0);
    assert_eq!(
        built[1].1,
        vec![Value::from("bob"), Value::from("b@x"), Value::Int(2)]
    );
}

#[test]
fn deferred_in_sub_select_and_raw_expression() {
    let sub = select(["user_id"])
        .from("memberships")
        .filter(col("team_id").deferred());
    let stmt = select(["id"])
        .from("users")
        .filter(col("id").sub(sub))
        .filter(expr("LOWER(email) = LOWER(?)").deferred_as("email"));

    let record = JsonRecord::from_serialize(&serde_json::json!({
        "email": "Ann@X",
        "team_id": 4,
    }))
    .unwrap();
    let (sql, args) = stmt.to_sql_record(&record).unwrap();
    assert_eq!(
        sql,
        "SELECT id FROM users WHERE (id IN (SELECT user_id FROM memberships WHERE (team_id = ?))) AND (LOWER(email) = LOWER(?))"
    );
    assert_eq!(args, vec![Value::Int(4), Value::from("Ann@X")]);
}

#[test]
fn deferred_with_interpolation() {
    let stmt = delete_from("sessions")
        .filter(col("user_id").deferred())
        .interpolate();
    let record = JsonRecord::from_serialize(&serde_json::json!({"user_id": 12})).unwrap();
    let (sql, args) = stmt.to_sql_record(&record).unwrap();
    assert_eq!(sql, "DELETE FROM sessions WHERE (user_id = 12)");
    assert!(args.is_empty());
}

#[test]
fn missing_record_is_a_configuration_error() {
    let err = delete_from("sessions")
        .filter(col("user_id").deferred())
        .to_sql()
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn same_column_requested_twice() {
    let stmt = select(["id"])
        .from("events")
        .filter(col("starts_at").less_or_equal().deferred_as("at"))
        .filter(col("ends_at").greater().deferred_as("at"));
    let record = JsonRecord::from_serialize(&serde_json::json!({"at": "2024-01-01"})).unwrap();
    let (_, args) = stmt.to_sql_record(&record).unwrap();
    assert_eq!(
        args,
        vec![Value::from("2024-01-01"), Value::from("2024-01-01")]
    );
}
