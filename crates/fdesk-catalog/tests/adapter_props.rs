//! Properties of the option adapter over arbitrary backend payloads.

use fdesk_catalog::{FieldMap, normalize_value, records_in};
use proptest::prelude::*;
use serde_json::{Value, json};
use std::collections::HashSet;

fn arb_record() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0u32..20, "[A-Za-z ]{0,12}").prop_map(|(id, name)| json!({"id": id, "name": name})),
        ("[a-z]{0,3}", "[A-Za-z ]{1,12}").prop_map(|(id, name)| json!({"id": id, "name": name})),
        "[a-z]{1,8}".prop_map(|name| json!({"name": name})),
        Just(Value::Null),
        any::<i64>().prop_map(|n| json!(n)),
    ]
}

proptest! {
    #[test]
    fn ids_unique_and_from_input(records in prop::collection::vec(arb_record(), 0..40)) {
        let payload = Value::Array(records.clone());
        let options = normalize_value(&payload, &FieldMap::default());

        let mut seen = HashSet::new();
        for option in &options {
            prop_assert!(seen.insert(option.id.clone()), "duplicate id {}", option.id);
            prop_assert!(!option.id.trim().is_empty());
        }

        let input_ids: HashSet<String> = records
            .iter()
            .filter_map(|r| match r.get("id") {
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            })
            .collect();
        prop_assert!(options.iter().all(|o| input_ids.contains(&o.id)));
    }

    #[test]
    fn scalars_never_panic(n in any::<i64>(), s in ".{0,16}") {
        prop_assert!(normalize_value(&json!(n), &FieldMap::default()).is_empty());
        prop_assert!(normalize_value(&json!(s), &FieldMap::default()).is_empty());
        let object = json!({"id": n});
        prop_assert!(normalize_value(&object, &FieldMap::default()).is_empty());
    }
}

#[test]
fn enveloped_party_list() {
    let body = json!({
        "success": true,
        "data": {
            "data": [
                {"party_id": 1, "name": "Acme Exports", "email": "ops@acme.test"},
                {"party_id": 2, "name": "Blue Harbor"}
            ],
            "total": 2
        }
    });
    let map = FieldMap::default().id("party_id");
    let options = normalize_value(records_in(&body), &map);
    let names: Vec<_> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["Acme Exports", "Blue Harbor"]);
    assert_eq!(options[0].email(), Some("ops@acme.test"));
}
