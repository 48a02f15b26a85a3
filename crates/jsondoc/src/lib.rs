//! # jsondoc
//!
//! An immutable, tree-shaped JSON value model.
//!
//! [`Value`] is a closed sum type over the six JSON kinds. Containers and
//! strings are reference-counted: cloning is cheap, values are freely
//! shared across threads, and the transformation engines in the companion
//! `jsondoc-patch` crate produce new documents that share every untouched
//! subtree with their input.
//!
//! Numbers preserve their exact source literal ([`Number`]), objects
//! preserve insertion order, and equality is structural: order-sensitive
//! for arrays, order-insensitive for objects, literal-exact for numbers.
//!
//! ```rust
//! use jsondoc::{ObjectBuilder, Value};
//!
//! let document = ObjectBuilder::new()
//!     .insert("name", "John Smith")
//!     .build();
//! let parsed: Value = r#"{"name": "John Smith"}"#.parse()?;
//! assert_eq!(document, parsed);
//! # Ok::<(), jsondoc::ValueError>(())
//! ```
//!
//! The [`stream`] module adds a forward-only pull parser producing
//! structural events either from a `Value` tree or from an external
//! tokenizer.
mod builder;
mod error;
mod number;
pub mod stream;
mod value;

pub use builder::{ArrayBuilder, ObjectBuilder};
pub use error::ValueError;
pub use number::Number;
pub use value::{Map, Value, ValueKind};
