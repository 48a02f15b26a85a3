//! # jsondoc-patch
//!
//! Location and transformation engines for [`jsondoc`] values, following
//! three IETF specifications:
//!
//! - [`Pointer`], JSON Pointer ([RFC 6901]): parse a path, resolve it,
//!   and produce immutably updated documents with `add`, `remove`, and
//!   `replace`.
//! - [`Patch`], JSON Patch ([RFC 6902]): an ordered operation sequence
//!   applied atomically; includes a structural [`Patch::diff`] generator.
//! - [`merge`], JSON Merge Patch ([RFC 7396]): recursive member
//!   replacement with `null`-deletes; [`merge_diff`] generates patches.
//!
//! Every operation takes documents by reference and returns new ones;
//! untouched subtrees are shared between input and output, so the cost of
//! an update is proportional to the navigated path, not document size.
//!
//! ```rust
//! use jsondoc::Value;
//! use jsondoc_patch::Patch;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let document: Value = r#"{"a": 1}"#.parse()?;
//! let patch: Patch = r#"[
//!     {"op": "test", "path": "/a", "value": 1},
//!     {"op": "remove", "path": "/a"}
//! ]"#
//! .parse()?;
//! assert_eq!(patch.apply(&document)?.to_string(), "{}");
//! # Ok(())
//! # }
//! ```
//!
//! [RFC 6901]: https://datatracker.ietf.org/doc/html/rfc6901
//! [RFC 6902]: https://datatracker.ietf.org/doc/html/rfc6902
//! [RFC 7396]: https://datatracker.ietf.org/doc/html/rfc7396
mod diff;
mod error;
mod merge;
mod patch;
mod pointer;

pub use error::{ParseError, PatchError, PatchErrorKind, ResolveError, ResolveErrorKind};
pub use merge::{merge, merge_diff};
pub use patch::{Patch, PatchBuilder, PatchOperation};
pub use pointer::{Pointer, Segment};
