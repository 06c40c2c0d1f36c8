//! Property-based payload and insert tests (proptest).

use proptest::prelude::*;
use saferdb::{render_insert, DbError, Payload, SaferDb, SqliteExecutor, Value};
use serde_json::json;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-zA-Z0-9 '`;-]{0,16}".prop_map(Value::Text),
    ]
}

fn column() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}"
}

fn payload_pairs() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec((column(), scalar()), 1..8)
}

proptest! {
    #[test]
    fn rendered_insert_has_one_placeholder_per_column(pairs in payload_pairs()) {
        let payload = Payload::from_pairs(pairs).unwrap();
        let sql = render_insert("test_table", &payload);

        prop_assert!(sql.starts_with("insert into `test_table` ("));
        prop_assert_eq!(sql.matches('?').count(), payload.len());
        for col in payload.columns() {
            let quoted = format!("`{col}`");
            prop_assert!(sql.contains(&quoted));
        }
    }

    #[test]
    fn scalar_json_objects_are_accepted(pairs in payload_pairs()) {
        let object: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap()))
            .collect();
        let payload = Payload::try_from_json(&serde_json::Value::Object(object.clone())).unwrap();
        prop_assert_eq!(payload.len(), object.len());
    }

    #[test]
    fn nested_values_are_rejected(col in column(), nested in prop_oneof![Just(json!({})), Just(json!([1])), Just(json!({"a": 1}))]) {
        let mut object = serde_json::Map::new();
        object.insert(col, nested);
        let data = serde_json::Value::Object(object);
        let err = Payload::try_from_json(&data).unwrap_err();
        prop_assert!(matches!(&err, DbError::InvalidArgument(m) if m.contains("scalar")));
    }

    #[test]
    fn list_payloads_are_rejected(items in prop::collection::vec(scalar(), 1..5)) {
        let data = serde_json::to_value(&items).unwrap();
        let err = Payload::try_from_json(&data).unwrap_err();
        prop_assert!(matches!(&err, DbError::InvalidArgument(m) if m.contains("non-empty-string")));
    }

    #[test]
    fn every_valid_insert_affects_one_row(rows in prop::collection::vec(scalar(), 1..10)) {
        let db = SaferDb::new(SqliteExecutor::open_in_memory().unwrap());
        db.prepared_query("CREATE TABLE t (id INTEGER PRIMARY KEY, v)", &[]).unwrap();

        let mut last = 0;
        for v in rows {
            let result = db.insert("t", &Payload::from_pairs([("v", v)]).unwrap()).unwrap();
            prop_assert_eq!(result.affected_rows, 1);
            prop_assert!(result.insert_id > last);
            last = result.insert_id;
        }
    }
}
