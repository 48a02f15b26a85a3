use core::fmt;
use std::str::FromStr;

use jsondoc::{ArrayBuilder, Map, ObjectBuilder, Value};

use crate::{
    diff,
    error::{ParseError, PatchError, PatchErrorKind},
    pointer::Pointer,
};

/// One RFC 6902 operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    /// Insert `value` at `path`; overwrites an existing object member.
    Add { path: Pointer, value: Value },
    /// Remove the value at `path`, which must exist.
    Remove { path: Pointer },
    /// Substitute the value at `path`, which must exist.
    Replace { path: Pointer, value: Value },
    /// Remove the value at `from` and insert it at `path`.
    Move { from: Pointer, path: Pointer },
    /// Insert a structurally equal copy of the value at `from` at `path`.
    Copy { from: Pointer, path: Pointer },
    /// Fail the whole patch unless the value at `path` equals `value`.
    Test { path: Pointer, value: Value },
}

impl PatchOperation {
    /// The operation's `op` name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }

    /// The target location.
    #[must_use]
    pub fn path(&self) -> &Pointer {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }

    fn apply(&self, document: &Value) -> Result<Value, PatchErrorKind> {
        match self {
            PatchOperation::Add { path, value } => Ok(path.add(document, value.clone())?),
            PatchOperation::Remove { path } => Ok(path.remove(document)?),
            PatchOperation::Replace { path, value } => Ok(path.replace(document, value.clone())?),
            // Literally remove-then-add, so a `path` inside `from` agrees
            // with the explicit two-operation sequence on every outcome.
            PatchOperation::Move { from, path } => {
                let value = from.resolve(document)?.clone();
                let removed = from.remove(document)?;
                Ok(path.add(&removed, value)?)
            }
            PatchOperation::Copy { from, path } => {
                let value = from.resolve(document)?.clone();
                Ok(path.add(document, value)?)
            }
            PatchOperation::Test { path, value } => {
                if path.resolve(document)? == value {
                    Ok(document.clone())
                } else {
                    Err(PatchErrorKind::TestFailed {
                        path: path.to_string(),
                    })
                }
            }
        }
    }
}

impl From<crate::error::ResolveError> for PatchErrorKind {
    fn from(error: crate::error::ResolveError) -> PatchErrorKind {
        PatchErrorKind::Resolve(error)
    }
}

/// An immutable, ordered sequence of RFC 6902 operations.
///
/// Parse one from its canonical JSON array form with [`Patch::from_value`]
/// or [`str::parse`], build one with [`Patch::builder`], or generate one
/// with [`Patch::diff`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    operations: Vec<PatchOperation>,
}

impl Patch {
    #[must_use]
    pub fn builder() -> PatchBuilder {
        PatchBuilder::default()
    }

    /// A patch that transforms `source` into `target`:
    /// `Patch::diff(a, b).apply(a)` reproduces `b` for any two documents.
    #[must_use]
    pub fn diff(source: &Value, target: &Value) -> Patch {
        Patch {
            operations: diff::diff(source, target),
        }
    }

    #[must_use]
    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Apply every operation in order and return the resulting document.
    ///
    /// Application is atomic: operations run against successive immutable
    /// snapshots and only the final one is returned, so a failure leaves
    /// no observable partial state and `document` is never affected.
    ///
    /// # Errors
    ///
    /// The first failing operation aborts the whole application with a
    /// [`PatchError`] naming the operation's position, kind, and path.
    pub fn apply(&self, document: &Value) -> Result<Value, PatchError> {
        let mut current = document.clone();
        for (index, operation) in self.operations.iter().enumerate() {
            current = operation
                .apply(&current)
                .map_err(|kind| PatchError::new(index, operation.kind(), kind))?;
        }
        Ok(current)
    }

    /// Parse the canonical RFC 6902 array-of-objects form.
    ///
    /// Unrecognized members are ignored, as the RFC requires.
    ///
    /// # Errors
    ///
    /// A [`ParseError`] describing the offending element.
    pub fn from_value(document: &Value) -> Result<Patch, ParseError> {
        let Some(items) = document.as_array() else {
            return Err(ParseError::PatchNotAnArray(document.kind()));
        };
        let mut operations = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(fields) = item.as_object() else {
                return Err(ParseError::OperationNotAnObject {
                    index,
                    kind: item.kind(),
                });
            };
            let op = member_str(fields, "op", index)?;
            let path = member_pointer(fields, "path", index)?;
            let operation = match op {
                "add" => PatchOperation::Add {
                    path,
                    value: member_value(fields, "value", index)?,
                },
                "remove" => PatchOperation::Remove { path },
                "replace" => PatchOperation::Replace {
                    path,
                    value: member_value(fields, "value", index)?,
                },
                "move" => PatchOperation::Move {
                    from: member_pointer(fields, "from", index)?,
                    path,
                },
                "copy" => PatchOperation::Copy {
                    from: member_pointer(fields, "from", index)?,
                    path,
                },
                "test" => PatchOperation::Test {
                    path,
                    value: member_value(fields, "value", index)?,
                },
                other => {
                    return Err(ParseError::UnknownOperation {
                        index,
                        op: other.to_string(),
                    })
                }
            };
            operations.push(operation);
        }
        Ok(Patch { operations })
    }

    /// Render the canonical RFC 6902 array form, with members in the
    /// order `op`, `path`, (`from`), (`value`). Exact inverse of
    /// [`Patch::from_value`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut array = ArrayBuilder::new();
        for operation in &self.operations {
            let object = ObjectBuilder::new()
                .insert("op", operation.kind())
                .insert("path", operation.path().to_string());
            let object = match operation {
                PatchOperation::Move { from, .. } | PatchOperation::Copy { from, .. } => {
                    object.insert("from", from.to_string())
                }
                PatchOperation::Add { value, .. }
                | PatchOperation::Replace { value, .. }
                | PatchOperation::Test { value, .. } => object.insert("value", value.clone()),
                PatchOperation::Remove { .. } => object,
            };
            array = array.push(object.build());
        }
        array.build()
    }
}

fn member_str<'a>(fields: &'a Map, member: &'static str, index: usize) -> Result<&'a str, ParseError> {
    fields
        .get(member)
        .and_then(Value::as_str)
        .ok_or(ParseError::InvalidMember { index, member })
}

fn member_pointer(fields: &Map, member: &'static str, index: usize) -> Result<Pointer, ParseError> {
    Pointer::parse(member_str(fields, member, index)?)
}

fn member_value(fields: &Map, member: &'static str, index: usize) -> Result<Value, ParseError> {
    fields
        .get(member)
        .cloned()
        .ok_or(ParseError::InvalidMember { index, member })
}

impl FromStr for Patch {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Patch, ParseError> {
        let document: Value = text.parse()?;
        Patch::from_value(&document)
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_value().fmt(f)
    }
}

/// Accumulates operations in call order; finalized once by `build`.
///
/// # Examples
///
/// ```rust
/// use jsondoc_patch::{Patch, Pointer};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let patch = Patch::builder()
///     .test(Pointer::parse("/a")?, 1u64)
///     .remove(Pointer::parse("/a")?)
///     .build();
/// assert_eq!(
///     patch.to_string(),
///     r#"[{"op":"test","path":"/a","value":1},{"op":"remove","path":"/a"}]"#
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PatchBuilder {
    operations: Vec<PatchOperation>,
}

impl PatchBuilder {
    #[must_use]
    pub fn new() -> PatchBuilder {
        PatchBuilder::default()
    }

    #[must_use]
    pub fn add(mut self, path: Pointer, value: impl Into<Value>) -> PatchBuilder {
        self.operations.push(PatchOperation::Add {
            path,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn remove(mut self, path: Pointer) -> PatchBuilder {
        self.operations.push(PatchOperation::Remove { path });
        self
    }

    #[must_use]
    pub fn replace(mut self, path: Pointer, value: impl Into<Value>) -> PatchBuilder {
        self.operations.push(PatchOperation::Replace {
            path,
            value: value.into(),
        });
        self
    }

    /// `move` is a keyword; the trailing underscore follows the usual
    /// convention.
    #[must_use]
    pub fn move_(mut self, from: Pointer, path: Pointer) -> PatchBuilder {
        self.operations.push(PatchOperation::Move { from, path });
        self
    }

    #[must_use]
    pub fn copy(mut self, from: Pointer, path: Pointer) -> PatchBuilder {
        self.operations.push(PatchOperation::Copy { from, path });
        self
    }

    #[must_use]
    pub fn test(mut self, path: Pointer, value: impl Into<Value>) -> PatchBuilder {
        self.operations.push(PatchOperation::Test {
            path,
            value: value.into(),
        });
        self
    }

    /// Finalize into an immutable [`Patch`]. Consumes the builder.
    #[must_use]
    pub fn build(self) -> Patch {
        Patch {
            operations: self.operations,
        }
    }
}
