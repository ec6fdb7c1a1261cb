//! Placeholders and arguments stay aligned for arbitrary fragment lists.

use dbr::prelude::*;
use dbr::{Condition, count_placeholders};
use proptest::prelude::*;

const COLUMNS: [&str; 4] = ["a", "b", "c", "d"];

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        any::<bool>().prop_map(Value::Bool),
        "[a-zA-Z0-9_?' ]{0,8}".prop_map(Value::Text),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        Just(Value::Null),
    ]
}

fn arb_column() -> impl Strategy<Value = &'static str> {
    prop::sample::select(COLUMNS.to_vec())
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    prop_oneof![
        (arb_column(), arb_value()).prop_map(|(c, v)| col(c).value(v)),
        (arb_column(), prop::collection::vec(any::<i64>(), 1..5))
            .prop_map(|(c, vs)| col(c).ints(vs)),
        (arb_column(), any::<i64>(), any::<i64>())
            .prop_map(|(c, lo, hi)| col(c).between().ints([lo, hi])),
        (arb_column(), arb_value()).prop_map(|(c, v)| col(c).greater().value(v).or()),
        (any::<i64>(), any::<i64>()).prop_map(|(x, y)| expr("a + ? > ?").ints([x, y])),
        Just(expr("b=c").not()),
        arb_column().prop_map(|c| col(c).not_null()),
    ]
}

proptest! {
    #[test]
    fn placeholders_match_arguments(conditions in prop::collection::vec(arb_condition(), 0..8)) {
        let (sql, args) = select(["a", "b"])
            .from("t")
            .filters(conditions.clone())
            .to_sql()
            .unwrap();
        prop_assert_eq!(count_placeholders(&sql), args.len());

        let (literal, none) = select(["a", "b"])
            .from("t")
            .filters(conditions)
            .interpolate()
            .to_sql()
            .unwrap();
        prop_assert!(none.is_empty());
        prop_assert_eq!(count_placeholders(&literal), 0);
        prop_assert_eq!(literal, dbr::interpolate(&sql, &args).unwrap());
    }

    #[test]
    fn cached_and_fresh_builds_agree(values in prop::collection::vec(arb_value(), 1..6)) {
        let fresh = update("t")
            .set("x", values[0].clone())
            .filter(col("id").values(values.clone()));
        let cached = fresh.clone().build_cache(true);
        cached.to_sql().unwrap();
        prop_assert_eq!(cached.to_sql().unwrap(), fresh.to_sql().unwrap());
    }
}
