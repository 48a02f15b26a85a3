//! Patch generation: a deterministic structural diff between two
//! documents.
//!
//! Objects are compared member by member; arrays over their common
//! prefix, with source extras removed from the tail down and target
//! extras appended. The result favors validity and determinism over
//! minimality.

use jsondoc::Value;

use crate::{patch::PatchOperation, pointer::Pointer};

pub(crate) fn diff(source: &Value, target: &Value) -> Vec<PatchOperation> {
    let mut operations = Vec::new();
    diff_into(source, target, &Pointer::root(), &mut operations);
    operations
}

fn diff_into(
    source: &Value,
    target: &Value,
    location: &Pointer,
    operations: &mut Vec<PatchOperation>,
) {
    if source == target {
        return;
    }
    match (source, target) {
        (Value::Object(source_fields), Value::Object(target_fields)) => {
            for key in source_fields.keys() {
                if !target_fields.contains_key(key) {
                    operations.push(PatchOperation::Remove {
                        path: location.join(&**key),
                    });
                }
            }
            for (key, target_value) in target_fields.iter() {
                match source_fields.get(key) {
                    Some(source_value) => {
                        diff_into(source_value, target_value, &location.join(&**key), operations);
                    }
                    None => operations.push(PatchOperation::Add {
                        path: location.join(&**key),
                        value: target_value.clone(),
                    }),
                }
            }
        }
        (Value::Array(source_items), Value::Array(target_items)) => {
            let common = source_items.len().min(target_items.len());
            for index in 0..common {
                diff_into(
                    &source_items[index],
                    &target_items[index],
                    &location.join(index),
                    operations,
                );
            }
            // Tail removals run highest-index-first so earlier removals do
            // not shift the later targets.
            for index in (common..source_items.len()).rev() {
                operations.push(PatchOperation::Remove {
                    path: location.join(index),
                });
            }
            for (index, item) in target_items.iter().enumerate().skip(common) {
                operations.push(PatchOperation::Add {
                    path: location.join(index),
                    value: item.clone(),
                });
            }
        }
        _ => operations.push(PatchOperation::Replace {
            path: location.clone(),
            value: target.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::patch::Patch;
    use jsondoc::Value;
    use serde_json::json;
    use test_case::test_case;

    fn doc(value: serde_json::Value) -> Value {
        Value::from(value)
    }

    #[test_case(json!({}), json!({}))]
    #[test_case(json!({"a": 1}), json!({"a": 2}))]
    #[test_case(json!({"a": 1, "b": 2}), json!({"b": 2, "c": 3}))]
    #[test_case(json!({"a": {"deep": [1, 2]}}), json!({"a": {"deep": [2]}}))]
    #[test_case(json!([1, 2, 3]), json!([1, 2]))]
    #[test_case(json!([1]), json!([1, 2, 3]))]
    #[test_case(json!([{"a": 1}, 2]), json!([{"a": 2}, 2, 3]))]
    #[test_case(json!({"a": 1}), json!([1, 2]))]
    #[test_case(json!(null), json!({"a": 1}))]
    #[test_case(json!({"mixed": [true, {"x": 1}, "s"]}), json!({"mixed": [false, {"x": 1, "y": 2}]}))]
    fn diff_then_apply_reproduces_the_target(source: serde_json::Value, target: serde_json::Value) {
        let source = doc(source);
        let target = doc(target);
        let patch = Patch::diff(&source, &target);
        assert_eq!(
            patch.apply(&source).expect("diff output must apply"),
            target,
            "patch: {patch}"
        );
    }

    #[test]
    fn equal_documents_produce_an_empty_patch() {
        let document = doc(json!({"a": [1, {"b": 2}]}));
        assert!(Patch::diff(&document, &document).is_empty());
    }

    #[test]
    fn member_changes_recurse_instead_of_replacing() {
        let source = doc(json!({"user": {"name": "John", "age": 32}}));
        let target = doc(json!({"user": {"name": "Jane", "age": 32}}));
        let patch = Patch::diff(&source, &target);
        assert_eq!(
            patch.to_string(),
            r#"[{"op":"replace","path":"/user/name","value":"Jane"}]"#
        );
    }

    #[test]
    fn escaped_keys_round_trip_through_diff() {
        let source = doc(json!({"a/b": 1, "m~n": {"x": 1}}));
        let target = doc(json!({"a/b": 2, "m~n": {"x": 2}}));
        let patch = Patch::diff(&source, &target);
        assert_eq!(patch.apply(&source).expect("valid patch"), target);
        assert!(patch.to_string().contains("/a~1b"));
        assert!(patch.to_string().contains("/m~0n"));
    }
}
