use core::fmt;
use std::{str::FromStr, sync::Arc};

use jsondoc::Value;

use crate::error::{ParseError, ResolveError, ResolveErrorKind};

/// A parsed RFC 6901 JSON Pointer.
///
/// Tokens are stored unescaped; `Display` re-escapes them canonically, so
/// `parse(render(parse(s))) == parse(s)` for every valid `s`. The empty
/// pointer designates the whole document.
///
/// All mutating operations leave their input untouched and return a new
/// document that shares every subtree off the navigated path with the
/// original.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    tokens: Vec<Box<str>>,
}

/// One unescaped path step, for extending pointers programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// An object member name.
    Key(&'a str),
    /// An array element index.
    Index(usize),
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(value: &'a str) -> Self {
        Segment::Key(value)
    }
}

impl From<usize> for Segment<'_> {
    fn from(value: usize) -> Self {
        Segment::Index(value)
    }
}

/// What a reference token means when the container is an array.
enum ArrayToken {
    Index(usize),
    Append,
    Invalid,
}

fn array_token(token: &str) -> ArrayToken {
    if token == "-" {
        ArrayToken::Append
    } else if let Some(index) = parse_index(token) {
        ArrayToken::Index(index)
    } else {
        ArrayToken::Invalid
    }
}

// Taken from `serde_json`: only "0" or a digit sequence starting with
// 1-9 is numeric; anything else addresses an object member.
fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        return None;
    }
    s.parse().ok()
}

/// The terminal action `add`/`remove`/`replace` perform at the target.
enum LeafOp {
    Insert(Value),
    Replace(Value),
    Remove,
}

impl Pointer {
    /// The empty pointer: the whole document.
    #[must_use]
    pub fn root() -> Pointer {
        Pointer::default()
    }

    /// Parse an RFC 6901 pointer string.
    ///
    /// # Errors
    ///
    /// [`ParseError::MissingSlash`] if a non-empty pointer does not start
    /// with `/`; [`ParseError::InvalidEscape`] if `~` is not followed by
    /// `0` or `1`.
    pub fn parse(pointer: &str) -> Result<Pointer, ParseError> {
        if pointer.is_empty() {
            return Ok(Pointer::root());
        }
        if !pointer.starts_with('/') {
            return Err(ParseError::MissingSlash {
                pointer: pointer.to_string(),
            });
        }
        let mut tokens = Vec::new();
        let mut offset = 1;
        for raw in pointer[1..].split('/') {
            let token = unescape(raw).map_err(|at| ParseError::InvalidEscape {
                pointer: pointer.to_string(),
                offset: offset + at,
            })?;
            tokens.push(token);
            offset += raw.len() + 1;
        }
        Ok(Pointer { tokens })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The unescaped reference tokens, root to leaf.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|token| &**token)
    }

    /// A new pointer with one more segment appended.
    #[must_use]
    pub fn join<'a>(&self, segment: impl Into<Segment<'a>>) -> Pointer {
        let mut tokens = self.tokens.clone();
        match segment.into() {
            Segment::Key(key) => tokens.push(key.into()),
            Segment::Index(index) => tokens.push(index.to_string().into()),
        }
        Pointer { tokens }
    }

    /// Navigate to the referenced value.
    ///
    /// # Errors
    ///
    /// A [`ResolveError`] naming the failing location: missing member,
    /// out-of-range or malformed index, `-` (which never reads), or
    /// navigation into a scalar.
    pub fn resolve<'a>(&self, document: &'a Value) -> Result<&'a Value, ResolveError> {
        let mut current = document;
        for (depth, token) in self.tokens.iter().enumerate() {
            current = self.step(current, depth, token)?;
        }
        Ok(current)
    }

    /// `true` iff the referenced value exists.
    #[must_use]
    pub fn contains(&self, document: &Value) -> bool {
        self.resolve(document).is_ok()
    }

    /// Insert `value` at the referenced location.
    ///
    /// On an object parent the member is inserted or overwritten; on an
    /// array parent the token must be an index in `[0, len]` (shifting
    /// the rest right) or `-` (append). The empty pointer replaces the
    /// whole document. Intermediate containers are never created.
    ///
    /// # Errors
    ///
    /// A [`ResolveError`] if the parent path does not exist or the leaf
    /// token is not addressable.
    pub fn add(&self, document: &Value, value: Value) -> Result<Value, ResolveError> {
        self.apply(document, 0, LeafOp::Insert(value))
    }

    /// Remove the referenced value.
    ///
    /// Array removal shifts subsequent elements left. The empty pointer
    /// fails: the whole document has no parent container.
    ///
    /// # Errors
    ///
    /// A [`ResolveError`] if the referenced value does not exist.
    pub fn remove(&self, document: &Value) -> Result<Value, ResolveError> {
        self.apply(document, 0, LeafOp::Remove)
    }

    /// Substitute the referenced value with `value`, without transient
    /// intermediate states. Unlike [`Pointer::add`], the target must
    /// already exist. The empty pointer substitutes the whole document.
    ///
    /// # Errors
    ///
    /// A [`ResolveError`] if the referenced value does not exist.
    pub fn replace(&self, document: &Value, value: Value) -> Result<Value, ResolveError> {
        self.apply(document, 0, LeafOp::Replace(value))
    }

    fn step<'a>(
        &self,
        current: &'a Value,
        depth: usize,
        token: &str,
    ) -> Result<&'a Value, ResolveError> {
        match current {
            Value::Object(fields) => fields
                .get(token)
                .ok_or_else(|| self.error(depth, ResolveErrorKind::NotFound)),
            Value::Array(items) => match array_token(token) {
                ArrayToken::Index(index) => items.get(index).ok_or_else(|| {
                    self.error(
                        depth,
                        ResolveErrorKind::OutOfRange {
                            index,
                            len: items.len(),
                        },
                    )
                }),
                ArrayToken::Append => Err(self.error(depth, ResolveErrorKind::AppendIndex)),
                ArrayToken::Invalid => Err(self.error(depth, ResolveErrorKind::InvalidIndex)),
            },
            scalar => Err(self.error(depth, ResolveErrorKind::Scalar(scalar.kind()))),
        }
    }

    fn apply(&self, current: &Value, depth: usize, op: LeafOp) -> Result<Value, ResolveError> {
        let Some(token) = self.tokens.get(depth) else {
            // The empty pointer: the operation targets the document itself.
            return match op {
                LeafOp::Insert(value) | LeafOp::Replace(value) => Ok(value),
                LeafOp::Remove => {
                    Err(ResolveError::new(String::new(), ResolveErrorKind::WholeDocument))
                }
            };
        };
        if depth + 1 == self.tokens.len() {
            self.apply_leaf(current, depth, token, op)
        } else {
            let child = self.step(current, depth, token)?;
            let rebuilt = self.apply(child, depth + 1, op)?;
            Ok(with_child(current, token, rebuilt))
        }
    }

    fn apply_leaf(
        &self,
        parent: &Value,
        depth: usize,
        token: &str,
        op: LeafOp,
    ) -> Result<Value, ResolveError> {
        match parent {
            Value::Object(fields) => {
                if !fields.contains_key(token) && !matches!(op, LeafOp::Insert(_)) {
                    return Err(self.error(depth, ResolveErrorKind::NotFound));
                }
                let mut fields = (**fields).clone();
                match op {
                    LeafOp::Insert(value) | LeafOp::Replace(value) => {
                        fields.insert(Arc::from(token), value);
                    }
                    LeafOp::Remove => {
                        fields.shift_remove(token);
                    }
                }
                Ok(Value::Object(Arc::new(fields)))
            }
            Value::Array(items) => {
                let len = items.len();
                let out_of_range = |index| {
                    self.error(depth, ResolveErrorKind::OutOfRange { index, len })
                };
                match (array_token(token), op) {
                    (ArrayToken::Invalid, _) => {
                        Err(self.error(depth, ResolveErrorKind::InvalidIndex))
                    }
                    (ArrayToken::Append, LeafOp::Insert(value)) => {
                        let mut items = (**items).clone();
                        items.push(value);
                        Ok(Value::Array(Arc::new(items)))
                    }
                    (ArrayToken::Append, _) => {
                        Err(self.error(depth, ResolveErrorKind::AppendIndex))
                    }
                    (ArrayToken::Index(index), LeafOp::Insert(value)) => {
                        if index > len {
                            return Err(out_of_range(index));
                        }
                        let mut items = (**items).clone();
                        items.insert(index, value);
                        Ok(Value::Array(Arc::new(items)))
                    }
                    (ArrayToken::Index(index), LeafOp::Replace(value)) => {
                        if index >= len {
                            return Err(out_of_range(index));
                        }
                        let mut items = (**items).clone();
                        items[index] = value;
                        Ok(Value::Array(Arc::new(items)))
                    }
                    (ArrayToken::Index(index), LeafOp::Remove) => {
                        if index >= len {
                            return Err(out_of_range(index));
                        }
                        let mut items = (**items).clone();
                        items.remove(index);
                        Ok(Value::Array(Arc::new(items)))
                    }
                }
            }
            scalar => Err(self.error(depth, ResolveErrorKind::Scalar(scalar.kind()))),
        }
    }

    /// Render the pointer up to and including the failing token.
    fn error(&self, depth: usize, kind: ResolveErrorKind) -> ResolveError {
        let mut at = String::new();
        for token in &self.tokens[..=depth] {
            escape_into(token, &mut at);
        }
        ResolveError::new(at, kind)
    }
}

/// A copy of `container` with the child at `token` swapped out. The token
/// has already been validated by a successful `step`.
fn with_child(container: &Value, token: &str, child: Value) -> Value {
    match container {
        Value::Object(fields) => {
            let mut fields = (**fields).clone();
            fields.insert(Arc::from(token), child);
            Value::Object(Arc::new(fields))
        }
        Value::Array(items) => {
            let index = parse_index(token).expect("validated index");
            let mut items = (**items).clone();
            items[index] = child;
            Value::Array(Arc::new(items))
        }
        _ => unreachable!("only containers have children"),
    }
}

/// Decode `~1` to `/` and `~0` to `~` in one pass, which cannot double
/// substitute. Returns the byte offset of a bad escape.
fn unescape(raw: &str) -> Result<Box<str>, usize> {
    if !raw.contains('~') {
        return Ok(raw.into());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();
    while let Some((at, ch)) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some((_, '0')) => out.push('~'),
                Some((_, '1')) => out.push('/'),
                _ => return Err(at),
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out.into())
}

/// Encode `~` to `~0` first, then `/` to `~1`; doing it per character
/// keeps the order irrelevant.
fn escape_into(token: &str, out: &mut String) {
    out.push('/');
    for ch in token.chars() {
        match ch {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            other => out.push(other),
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        for token in &self.tokens {
            escape_into(token, &mut rendered);
        }
        f.write_str(&rendered)
    }
}

impl FromStr for Pointer {
    type Err = ParseError;

    fn from_str(pointer: &str) -> Result<Pointer, ParseError> {
        Pointer::parse(pointer)
    }
}

impl TryFrom<&str> for Pointer {
    type Error = ParseError;

    fn try_from(pointer: &str) -> Result<Pointer, ParseError> {
        Pointer::parse(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::Pointer;
    use crate::error::{ParseError, ResolveErrorKind};
    use jsondoc::Value;
    use serde_json::json;
    use test_case::test_case;

    fn doc(value: serde_json::Value) -> Value {
        Value::from(value)
    }

    fn rfc_document() -> Value {
        doc(json!({
            "foo": ["bar", "baz"],
            "": 0,
            "a/b": 1,
            "c%d": 2,
            "e^f": 3,
            "g|h": 4,
            "i\\j": 5,
            "k\"l": 6,
            " ": 7,
            "m~n": 8,
        }))
    }

    // RFC 6901, section 5.
    #[test_case("/foo", json!(["bar", "baz"]))]
    #[test_case("/foo/0", json!("bar"))]
    #[test_case("/", json!(0))]
    #[test_case("/a~1b", json!(1))]
    #[test_case("/c%d", json!(2))]
    #[test_case("/e^f", json!(3))]
    #[test_case("/g|h", json!(4))]
    #[test_case("/i\\j", json!(5))]
    #[test_case("/k\"l", json!(6))]
    #[test_case("/ ", json!(7))]
    #[test_case("/m~0n", json!(8))]
    fn rfc6901_evaluation(pointer: &str, expected: serde_json::Value) {
        let document = rfc_document();
        let pointer = Pointer::parse(pointer).expect("valid pointer");
        assert_eq!(pointer.resolve(&document), Ok(&doc(expected)));
    }

    #[test]
    fn empty_pointer_is_the_document() {
        let document = rfc_document();
        let root = Pointer::parse("").expect("valid pointer");
        assert!(root.is_root());
        assert_eq!(root.resolve(&document), Ok(&document));
    }

    #[test]
    fn unescaped_slash_addresses_a_nested_member() {
        // "/a/b" names member "b" inside member "a", not the "a/b" member.
        let document = rfc_document();
        let pointer = Pointer::parse("/a/b").expect("valid pointer");
        let error = pointer.resolve(&document).expect_err("no 'a' member");
        assert_eq!(*error.kind(), ResolveErrorKind::NotFound);
        assert_eq!(error.location(), "/a");
    }

    #[test_case("a/b"; "missing leading slash")]
    #[test_case("foo"; "bare token")]
    fn missing_slash(pointer: &str) {
        assert!(matches!(
            Pointer::parse(pointer),
            Err(ParseError::MissingSlash { .. })
        ));
    }

    #[test_case("/~"; "bare tilde")]
    #[test_case("/~2"; "tilde two")]
    #[test_case("/a~"; "trailing tilde")]
    #[test_case("/a/b~x"; "bad escape in later token")]
    fn invalid_escape(pointer: &str) {
        assert!(matches!(
            Pointer::parse(pointer),
            Err(ParseError::InvalidEscape { .. })
        ));
    }

    #[test_case(""; "root")]
    #[test_case("/a~1b/c~0d"; "escapes")]
    #[test_case("/foo/0/-"; "array steps")]
    #[test_case("//"; "empty tokens")]
    fn render_parse_round_trip(pointer: &str) {
        let parsed = Pointer::parse(pointer).expect("valid pointer");
        assert_eq!(Pointer::parse(&parsed.to_string()).unwrap(), parsed);
        // Canonical inputs render back to themselves.
        assert_eq!(parsed.to_string(), pointer);
    }

    #[test_case("/foo/2", ResolveErrorKind::OutOfRange { index: 2, len: 2 }; "out of range")]
    #[test_case("/foo/-", ResolveErrorKind::AppendIndex; "append token never reads")]
    #[test_case("/foo/01", ResolveErrorKind::InvalidIndex; "leading zero")]
    #[test_case("/foo/x", ResolveErrorKind::InvalidIndex; "non numeric")]
    #[test_case("/foo/0/deep", ResolveErrorKind::Scalar(jsondoc::ValueKind::String); "into a scalar")]
    fn resolution_failures(pointer: &str, expected: ResolveErrorKind) {
        let document = rfc_document();
        let pointer = Pointer::parse(pointer).expect("valid pointer");
        let error = pointer.resolve(&document).expect_err("should fail");
        assert_eq!(*error.kind(), expected);
    }

    #[test]
    fn leading_zero_token_is_an_object_key() {
        // "01" addresses an object member even though it looks numeric.
        let document = doc(json!({"01": "x"}));
        let pointer = Pointer::parse("/01").expect("valid pointer");
        assert_eq!(pointer.resolve(&document), Ok(&doc(json!("x"))));
    }

    #[test_case("/0"; "by index")]
    #[test_case("/-"; "by append token")]
    fn add_into_empty_array(pointer: &str) {
        let document = doc(json!([]));
        let pointer = Pointer::parse(pointer).expect("valid pointer");
        let result = pointer.add(&document, Value::from("x")).expect("valid add");
        assert_eq!(result, doc(json!(["x"])));
    }

    #[test]
    fn add_inserts_and_shifts() {
        let document = doc(json!(["a", "c"]));
        let pointer = Pointer::parse("/1").expect("valid pointer");
        let result = pointer.add(&document, Value::from("b")).expect("valid add");
        assert_eq!(result, doc(json!(["a", "b", "c"])));
        // the original is untouched
        assert_eq!(document, doc(json!(["a", "c"])));
    }

    #[test]
    fn add_member() {
        let document = doc(json!({"name": "John Smith"}));
        let pointer = Pointer::parse("/wife").expect("valid pointer");
        let result = pointer
            .add(&document, doc(json!({"name": "Sarah", "age": 32})))
            .expect("valid add");
        assert_eq!(
            result,
            doc(json!({"name": "John Smith", "wife": {"name": "Sarah", "age": 32}}))
        );
    }

    #[test]
    fn add_never_creates_intermediate_containers() {
        let document = doc(json!({"name": "John Smith"}));
        let pointer = Pointer::parse("/child/name").expect("valid pointer");
        let error = pointer
            .add(&document, Value::from("x"))
            .expect_err("parent does not exist");
        assert_eq!(*error.kind(), ResolveErrorKind::NotFound);
        assert_eq!(error.location(), "/child");
    }

    #[test]
    fn add_at_root_replaces_the_document() {
        let document = doc(json!({"a": 1}));
        let pointer = Pointer::root();
        let result = pointer
            .add(&document, doc(json!([1, 2])))
            .expect("valid add");
        assert_eq!(result, doc(json!([1, 2])));
    }

    #[test]
    fn add_out_of_range() {
        let document = doc(json!(["a"]));
        let pointer = Pointer::parse("/2").expect("valid pointer");
        let error = pointer
            .add(&document, Value::from("x"))
            .expect_err("index 2 > len 1");
        assert_eq!(*error.kind(), ResolveErrorKind::OutOfRange { index: 2, len: 1 });
    }

    #[test]
    fn remove_member_and_element() {
        let document = doc(json!({"a": [1, 2, 3], "b": true}));
        let by_key = Pointer::parse("/b").unwrap().remove(&document).expect("valid remove");
        assert_eq!(by_key, doc(json!({"a": [1, 2, 3]})));
        let by_index = Pointer::parse("/a/1").unwrap().remove(&document).expect("valid remove");
        assert_eq!(by_index, doc(json!({"a": [1, 3], "b": true})));
    }

    #[test]
    fn remove_failures() {
        let document = doc(json!({"a": [1]}));
        for (pointer, kind) in [
            ("/missing", ResolveErrorKind::NotFound),
            ("/a/-", ResolveErrorKind::AppendIndex),
            ("/a/1", ResolveErrorKind::OutOfRange { index: 1, len: 1 }),
            ("", ResolveErrorKind::WholeDocument),
        ] {
            let error = Pointer::parse(pointer)
                .unwrap()
                .remove(&document)
                .expect_err("should fail");
            assert_eq!(*error.kind(), kind, "pointer {pointer:?}");
        }
    }

    #[test]
    fn replace_requires_existence() {
        let document = doc(json!({"name": "John Smith"}));
        let missing = Pointer::parse("/age").unwrap();
        assert_eq!(
            *missing
                .replace(&document, Value::from(32u64))
                .expect_err("no such member")
                .kind(),
            ResolveErrorKind::NotFound
        );
        let present = Pointer::parse("/name").unwrap();
        assert_eq!(
            present.replace(&document, Value::from("Jane")).expect("valid replace"),
            doc(json!({"name": "Jane"}))
        );
    }

    #[test]
    fn replace_at_root_substitutes_the_document() {
        let document = doc(json!({"a": 1}));
        let result = Pointer::root()
            .replace(&document, Value::from(true))
            .expect("valid replace");
        assert_eq!(result, doc(json!(true)));
    }

    #[test]
    fn replace_keeps_member_position() {
        let document = doc(json!({"a": 1, "b": 2, "c": 3}));
        let result = Pointer::parse("/b")
            .unwrap()
            .replace(&document, Value::from(9u64))
            .expect("valid replace");
        assert_eq!(result.to_string(), r#"{"a":1,"b":9,"c":3}"#);
    }

    #[test]
    fn untouched_subtrees_are_shared() {
        use std::sync::Arc;
        let document = doc(json!({"left": {"deep": [1, 2, 3]}, "right": {"x": 1}}));
        let patched = Pointer::parse("/right/x")
            .unwrap()
            .replace(&document, Value::from(2u64))
            .expect("valid replace");
        let (Value::Object(before), Value::Object(after)) = (&document, &patched) else {
            panic!("expected objects");
        };
        let (Some(Value::Object(left_before)), Some(Value::Object(left_after))) =
            (before.get("left"), after.get("left"))
        else {
            panic!("expected objects");
        };
        assert!(Arc::ptr_eq(left_before, left_after));
    }

    #[test]
    fn contains() {
        let document = rfc_document();
        assert!(Pointer::parse("/foo/1").unwrap().contains(&document));
        assert!(!Pointer::parse("/foo/2").unwrap().contains(&document));
        assert!(Pointer::root().contains(&document));
    }

    #[test]
    fn join_builds_escaped_tokens() {
        let pointer = Pointer::root().join("a/b").join(0).join("m~n");
        assert_eq!(pointer.to_string(), "/a~1b/0/m~0n");
        assert_eq!(
            pointer.tokens().collect::<Vec<_>>(),
            ["a/b", "0", "m~n"]
        );
    }
}
