//! Single-shot builders for objects and arrays.
//!
//! Builders accumulate entries on one call stack and are finalized exactly
//! once: `build` takes `self` by value, so a finished builder cannot be
//! observed or extended again; reuse is rejected at compile time.

use std::sync::Arc;

use crate::value::{Map, Value};

/// Accumulates object members in insertion order.
///
/// Inserting a name that is already present replaces its value; the name
/// keeps its original position.
///
/// # Examples
///
/// ```rust
/// use jsondoc::ObjectBuilder;
///
/// let value = ObjectBuilder::new()
///     .insert("name", "John Smith")
///     .insert("age", 32u64)
///     .build();
/// assert_eq!(value.to_string(), r#"{"name":"John Smith","age":32}"#);
/// ```
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    fields: Map,
}

impl ObjectBuilder {
    #[must_use]
    pub fn new() -> ObjectBuilder {
        ObjectBuilder::default()
    }

    /// Add or replace a member.
    #[must_use]
    pub fn insert(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> ObjectBuilder {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Finalize into an immutable object. Consumes the builder.
    #[must_use]
    pub fn build(self) -> Value {
        Value::Object(Arc::new(self.fields))
    }
}

/// Accumulates array elements in order.
///
/// # Examples
///
/// ```rust
/// use jsondoc::{ArrayBuilder, ObjectBuilder};
///
/// let value = ArrayBuilder::new()
///     .push(1u64)
///     .push(ObjectBuilder::new().insert("nested", true).build())
///     .build();
/// assert_eq!(value.to_string(), r#"[1,{"nested":true}]"#);
/// ```
#[derive(Debug, Default)]
pub struct ArrayBuilder {
    items: Vec<Value>,
}

impl ArrayBuilder {
    #[must_use]
    pub fn new() -> ArrayBuilder {
        ArrayBuilder::default()
    }

    /// Append an element.
    #[must_use]
    pub fn push(mut self, value: impl Into<Value>) -> ArrayBuilder {
        self.items.push(value.into());
        self
    }

    /// Finalize into an immutable array. Consumes the builder.
    #[must_use]
    pub fn build(self) -> Value {
        Value::Array(Arc::new(self.items))
    }
}
