//! RFC 7396 JSON Merge Patch.

use std::sync::Arc;

use jsondoc::{Map, Value};

/// Apply a merge patch to `target`, returning the merged document.
///
/// A non-object `patch` replaces the target wholesale. An object patch
/// merges member by member: `null` removes the member, anything else is
/// merged recursively, and target members the patch does not mention are
/// retained. Neither input is mutated.
///
/// ```rust
/// use jsondoc::Value;
/// use jsondoc_patch::merge;
///
/// # fn example() -> Result<(), jsondoc::ValueError> {
/// let target: Value = r#"{"a": 1, "b": 1, "c": 3}"#.parse()?;
/// let patch: Value = r#"{"a": null, "b": 2}"#.parse()?;
/// assert_eq!(merge(&target, &patch).to_string(), r#"{"b":2,"c":3}"#);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn merge(target: &Value, patch: &Value) -> Value {
    let Value::Object(patch_fields) = patch else {
        return patch.clone();
    };
    // A non-object target contributes nothing: merge onto an empty object.
    let mut merged = match target {
        Value::Object(fields) => (**fields).clone(),
        _ => Map::default(),
    };
    for (key, patch_value) in patch_fields.iter() {
        if patch_value.is_null() {
            merged.shift_remove(key);
        } else {
            let base = merged.get(key).cloned().unwrap_or(Value::Null);
            merged.insert(Arc::clone(key), merge(&base, patch_value));
        }
    }
    Value::Object(Arc::new(merged))
}

/// Generate the merge patch that turns `source` into `target`.
///
/// Members missing from `target` render as `null`, additions and changes
/// render as the target value, and unchanged members are omitted, so
/// `merge(source, &merge_diff(source, target)) == target` except where
/// `target` itself contains `null` members, which RFC 7396 merge patches
/// cannot express.
#[must_use]
pub fn merge_diff(source: &Value, target: &Value) -> Value {
    let (Value::Object(source_fields), Value::Object(target_fields)) = (source, target) else {
        return target.clone();
    };
    let mut patch = Map::default();
    for key in source_fields.keys() {
        if !target_fields.contains_key(key) {
            patch.insert(Arc::clone(key), Value::Null);
        }
    }
    for (key, target_value) in target_fields.iter() {
        match source_fields.get(key) {
            Some(source_value) if source_value == target_value => {}
            Some(source_value) => {
                patch.insert(Arc::clone(key), merge_diff(source_value, target_value));
            }
            None => {
                patch.insert(Arc::clone(key), target_value.clone());
            }
        }
    }
    Value::Object(Arc::new(patch))
}
