//! Forward-only, pull-based event parsing.
//!
//! Two interchangeable sources produce the same event vocabulary: a walk
//! over an in-memory [`Value`](crate::Value) tree ([`TreeEvents`]) and an
//! automaton driven by an external tokenizer ([`TokenEvents`]). Equivalent
//! documents yield identical event sequences from either source.

mod tokens;
mod tree;

use core::fmt;

pub use tokens::{Token, TokenEvents, TokenSource};
pub use tree::TreeEvents;

use crate::{Number, ValueKind};

/// One structural event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    StartObject,
    StartArray,
    /// An object member name. Always followed by the member's value event.
    KeyName,
    ValueString,
    ValueNumber,
    ValueTrue,
    ValueFalse,
    ValueNull,
    EndObject,
    EndArray,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Event::StartObject => "start of object",
            Event::StartArray => "start of array",
            Event::KeyName => "member name",
            Event::ValueString => "string value",
            Event::ValueNumber => "number value",
            Event::ValueTrue => "'true'",
            Event::ValueFalse => "'false'",
            Event::ValueNull => "'null'",
            Event::EndObject => "end of object",
            Event::EndArray => "end of array",
        })
    }
}

/// A pull parser over some event source.
///
/// `advance` moves to the next event; the scalar accessors read the payload
/// of the current one. Calling an accessor whose kind does not match the
/// current event, or advancing past the closed root, is a contract
/// violation (a caller bug), reported separately from malformed input.
pub trait PullParser {
    /// `false` once the root container has been closed.
    fn has_next(&self) -> bool;

    /// Produce the next event.
    ///
    /// # Errors
    ///
    /// A contract-kind [`StreamError`] past the terminal state; data-kind
    /// errors for malformed token input.
    fn advance(&mut self) -> Result<Event, StreamError>;

    /// The current member name or string value.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidAccessor`] unless the current event is
    /// [`Event::KeyName`] or [`Event::ValueString`].
    fn as_str(&self) -> Result<&str, StreamError>;

    /// The current number value.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidAccessor`] unless the current event is
    /// [`Event::ValueNumber`].
    fn as_number(&self) -> Result<&Number, StreamError>;
}

/// Streaming failures.
///
/// The first three variants are contract violations: the caller broke the
/// parser's state protocol. The rest are data errors: the input itself is
/// malformed or unavailable.
#[derive(Debug)]
pub enum StreamError {
    /// `advance` was called after the root container closed.
    NoMoreEvents,
    /// A scalar accessor was called while positioned on a non-matching event.
    InvalidAccessor {
        expected: &'static str,
        current: Option<Event>,
    },
    /// The parser was constructed over a scalar root.
    ScalarRoot(ValueKind),
    /// A token that the structural grammar does not allow here.
    UnexpectedToken {
        token: &'static str,
        expected: &'static str,
    },
    /// The token source ran dry inside an unclosed container.
    UnexpectedEnd,
    /// The token source itself failed.
    Source(Box<dyn std::error::Error + Send + Sync>),
}

impl StreamError {
    /// `true` for caller bugs, `false` for malformed-input conditions.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            StreamError::NoMoreEvents
                | StreamError::InvalidAccessor { .. }
                | StreamError::ScalarRoot(_)
        )
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::NoMoreEvents => f.write_str("the event stream is exhausted"),
            StreamError::InvalidAccessor { expected, current } => match current {
                Some(event) => write!(f, "expected {expected}, but the current event is {event}"),
                None => write!(f, "expected {expected}, but no event has been produced yet"),
            },
            StreamError::ScalarRoot(kind) => {
                write!(f, "cannot parse events over a {kind} root")
            }
            StreamError::UnexpectedToken { token, expected } => {
                write!(f, "unexpected {token} where {expected} was expected")
            }
            StreamError::UnexpectedEnd => f.write_str("input ended inside an unclosed container"),
            StreamError::Source(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Source(error) => Some(&**error),
            _ => None,
        }
    }
}
