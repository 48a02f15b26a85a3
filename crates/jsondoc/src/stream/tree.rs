use std::{slice, sync::Arc};

use super::{Event, PullParser, StreamError};
use crate::{value::Value, Number};

/// Pull parser over an in-memory document.
///
/// Borrows the document; the walk allocates one frame per nesting level
/// and never clones values.
#[derive(Debug)]
pub struct TreeEvents<'a> {
    root: Option<&'a Value>,
    frames: Vec<Frame<'a>>,
    current: Option<Current<'a>>,
    done: bool,
}

#[derive(Debug)]
enum Frame<'a> {
    Array(slice::Iter<'a, Value>),
    Object {
        entries: indexmap::map::Iter<'a, Arc<str>, Value>,
        /// The value belonging to the key that was just emitted.
        pending: Option<&'a Value>,
    },
}

#[derive(Debug)]
enum Current<'a> {
    Key(&'a str),
    Scalar(&'a Value),
    Structural(Event),
}

impl<'a> TreeEvents<'a> {
    /// Start a walk over `document`, which must be an object or an array.
    ///
    /// # Errors
    ///
    /// [`StreamError::ScalarRoot`] for any other root kind; the streaming
    /// grammar has no representation for a bare scalar document.
    pub fn new(document: &'a Value) -> Result<TreeEvents<'a>, StreamError> {
        match document {
            Value::Object(_) | Value::Array(_) => Ok(TreeEvents {
                root: Some(document),
                frames: Vec::new(),
                current: None,
                done: false,
            }),
            other => Err(StreamError::ScalarRoot(other.kind())),
        }
    }

    fn emit_value(&mut self, value: &'a Value) -> Event {
        match value {
            Value::Object(fields) => {
                self.frames.push(Frame::Object {
                    entries: fields.iter(),
                    pending: None,
                });
                self.set_current(Current::Structural(Event::StartObject))
            }
            Value::Array(items) => {
                self.frames.push(Frame::Array(items.iter()));
                self.set_current(Current::Structural(Event::StartArray))
            }
            scalar => self.set_current(Current::Scalar(scalar)),
        }
    }

    fn set_current(&mut self, current: Current<'a>) -> Event {
        let event = current.event();
        self.current = Some(current);
        event
    }
}

impl Current<'_> {
    fn event(&self) -> Event {
        match self {
            Current::Key(_) => Event::KeyName,
            Current::Scalar(value) => match value {
                Value::Null => Event::ValueNull,
                Value::Bool(true) => Event::ValueTrue,
                Value::Bool(false) => Event::ValueFalse,
                Value::Number(_) => Event::ValueNumber,
                Value::String(_) => Event::ValueString,
                Value::Array(_) | Value::Object(_) => unreachable!("containers push frames"),
            },
            Current::Structural(event) => *event,
        }
    }
}

impl PullParser for TreeEvents<'_> {
    fn has_next(&self) -> bool {
        !self.done
    }

    fn advance(&mut self) -> Result<Event, StreamError> {
        if self.done {
            return Err(StreamError::NoMoreEvents);
        }
        if let Some(root) = self.root.take() {
            return Ok(self.emit_value(root));
        }
        let frame = self.frames.last_mut().expect("unclosed root frame");
        match frame {
            Frame::Array(items) => match items.next() {
                Some(value) => Ok(self.emit_value(value)),
                None => {
                    self.frames.pop();
                    self.done = self.frames.is_empty();
                    Ok(self.set_current(Current::Structural(Event::EndArray)))
                }
            },
            Frame::Object { entries, pending } => {
                if let Some(value) = pending.take() {
                    return Ok(self.emit_value(value));
                }
                match entries.next() {
                    Some((key, value)) => {
                        *pending = Some(value);
                        Ok(self.set_current(Current::Key(key)))
                    }
                    None => {
                        self.frames.pop();
                        self.done = self.frames.is_empty();
                        Ok(self.set_current(Current::Structural(Event::EndObject)))
                    }
                }
            }
        }
    }

    fn as_str(&self) -> Result<&str, StreamError> {
        match &self.current {
            Some(Current::Key(key)) => Ok(key),
            Some(Current::Scalar(Value::String(text))) => Ok(text),
            _ => Err(StreamError::InvalidAccessor {
                expected: "a member name or string value",
                current: self.current.as_ref().map(Current::event),
            }),
        }
    }

    fn as_number(&self) -> Result<&Number, StreamError> {
        match &self.current {
            Some(Current::Scalar(Value::Number(number))) => Ok(number),
            _ => Err(StreamError::InvalidAccessor {
                expected: "a number value",
                current: self.current.as_ref().map(Current::event),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, PullParser, StreamError, TreeEvents};
    use crate::value::Value;
    use serde_json::json;

    fn events(value: serde_json::Value) -> Vec<Event> {
        let document = Value::from(value);
        let mut parser = TreeEvents::new(&document).expect("container root");
        let mut collected = Vec::new();
        while parser.has_next() {
            match parser.advance() {
                Ok(event) => collected.push(event),
                Err(StreamError::NoMoreEvents) => break,
                Err(error) => panic!("unexpected error: {error}"),
            }
        }
        collected
    }

    #[test]
    fn object_walk() {
        use Event::*;
        assert_eq!(
            events(json!({"a": [1, true, null], "b": "x"})),
            [
                StartObject,
                KeyName,
                StartArray,
                ValueNumber,
                ValueTrue,
                ValueNull,
                EndArray,
                KeyName,
                ValueString,
                EndObject,
            ]
        );
    }

    #[test]
    fn empty_containers() {
        use Event::*;
        assert_eq!(events(json!([])), [StartArray, EndArray]);
        assert_eq!(events(json!({})), [StartObject, EndObject]);
        assert_eq!(
            events(json!([{}, []])),
            [StartArray, StartObject, EndObject, StartArray, EndArray, EndArray]
        );
    }

    #[test]
    fn scalar_root_is_rejected() {
        let document = Value::from(json!(42));
        let error = TreeEvents::new(&document).expect_err("scalar root");
        assert!(error.is_contract_violation());
    }

    #[test]
    fn advancing_past_the_end() {
        let document = Value::from(json!([]));
        let mut parser = TreeEvents::new(&document).expect("container root");
        parser.advance().expect("start");
        parser.advance().expect("end");
        assert!(!parser.has_next());
        let error = parser.advance().expect_err("exhausted");
        assert!(error.is_contract_violation());
    }

    #[test]
    fn accessors_follow_the_cursor() {
        let document = Value::from(json!({"name": "Sarah", "age": 32}));
        let mut parser = TreeEvents::new(&document).expect("container root");
        assert!(parser.as_str().is_err());
        parser.advance().expect("start object");
        parser.advance().expect("key");
        assert_eq!(parser.as_str().expect("key name"), "name");
        parser.advance().expect("value");
        assert_eq!(parser.as_str().expect("string value"), "Sarah");
        parser.advance().expect("key");
        parser.advance().expect("value");
        assert_eq!(parser.as_number().expect("number").as_str(), "32");
        let error = parser.as_str().expect_err("number under string accessor");
        assert!(error.is_contract_violation());
    }
}
