use super::{Event, PullParser, StreamError};
use crate::Number;

/// A primitive lexical token, as produced by an external tokenizer.
///
/// String payloads arrive already unescaped and number payloads already
/// validated; lexical concerns stay on the tokenizer's side of the
/// boundary, and this automaton only enforces the structural grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    BeginObject,
    BeginArray,
    EndObject,
    EndArray,
    /// `:`
    NameSeparator,
    /// `,`
    ValueSeparator,
    String(String),
    Number(Number),
    True,
    False,
    Null,
}

impl Token {
    fn describe(&self) -> &'static str {
        match self {
            Token::BeginObject => "'{'",
            Token::BeginArray => "'['",
            Token::EndObject => "'}'",
            Token::EndArray => "']'",
            Token::NameSeparator => "':'",
            Token::ValueSeparator => "','",
            Token::String(_) => "a string",
            Token::Number(_) => "a number",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::Null => "'null'",
        }
    }
}

/// The lexer boundary: yields tokens until the input is exhausted.
pub trait TokenSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The next token, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying input.
    fn next_token(&mut self) -> Result<Option<Token>, Self::Error>;
}

/// Where the automaton stands inside the innermost open container.
#[derive(Debug, Clone, Copy)]
enum Expect {
    ArrayValueOrEnd,
    ArrayValue,
    ArrayCommaOrEnd,
    ObjectKeyOrEnd,
    ObjectKey,
    ObjectColon,
    ObjectValue,
    ObjectCommaOrEnd,
}

impl Expect {
    fn describe(self) -> &'static str {
        match self {
            Expect::ArrayValueOrEnd => "a value or ']'",
            Expect::ArrayValue | Expect::ObjectValue => "a value",
            Expect::ArrayCommaOrEnd => "',' or ']'",
            Expect::ObjectKeyOrEnd => "a member name or '}'",
            Expect::ObjectKey => "a member name",
            Expect::ObjectColon => "':'",
            Expect::ObjectCommaOrEnd => "',' or '}'",
        }
    }
}

enum Current {
    Key(String),
    Str(String),
    Num(Number),
    Marker(Event),
}

impl Current {
    fn event(&self) -> Event {
        match self {
            Current::Key(_) => Event::KeyName,
            Current::Str(_) => Event::ValueString,
            Current::Num(_) => Event::ValueNumber,
            Current::Marker(event) => *event,
        }
    }
}

/// Pull parser that drives an external tokenizer through the RFC 8259
/// structural grammar.
///
/// Separator tokens are consumed silently; every other accepted token
/// becomes exactly one event. The root must be a container; malformed
/// token sequences are data errors, while advancing past the closed root
/// is a contract violation.
pub struct TokenEvents<S> {
    source: S,
    stack: Vec<Expect>,
    current: Option<Current>,
    started: bool,
    done: bool,
}

impl<S: TokenSource> TokenEvents<S> {
    pub fn new(source: S) -> TokenEvents<S> {
        TokenEvents {
            source,
            stack: Vec::new(),
            current: None,
            started: false,
            done: false,
        }
    }

    fn next_token(&mut self) -> Result<Token, StreamError> {
        match self.source.next_token() {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(StreamError::UnexpectedEnd),
            Err(error) => Err(StreamError::Source(Box::new(error))),
        }
    }

    fn set_current(&mut self, current: Current) -> Event {
        let event = current.event();
        self.current = Some(current);
        event
    }

    /// A value token was accepted; emit its event, entering the container
    /// for `{` and `[`.
    fn accept_value(&mut self, token: Token, expected: &'static str) -> Result<Event, StreamError> {
        Ok(match token {
            Token::BeginObject => {
                self.stack.push(Expect::ObjectKeyOrEnd);
                self.set_current(Current::Marker(Event::StartObject))
            }
            Token::BeginArray => {
                self.stack.push(Expect::ArrayValueOrEnd);
                self.set_current(Current::Marker(Event::StartArray))
            }
            Token::String(text) => self.set_current(Current::Str(text)),
            Token::Number(number) => self.set_current(Current::Num(number)),
            Token::True => self.set_current(Current::Marker(Event::ValueTrue)),
            Token::False => self.set_current(Current::Marker(Event::ValueFalse)),
            Token::Null => self.set_current(Current::Marker(Event::ValueNull)),
            other => {
                return Err(StreamError::UnexpectedToken {
                    token: other.describe(),
                    expected,
                })
            }
        })
    }

    fn close(&mut self, event: Event) -> Event {
        self.stack.pop();
        self.done = self.stack.is_empty();
        self.set_current(Current::Marker(event))
    }
}

impl<S: TokenSource> PullParser for TokenEvents<S> {
    fn has_next(&self) -> bool {
        !self.done
    }

    fn advance(&mut self) -> Result<Event, StreamError> {
        if self.done {
            return Err(StreamError::NoMoreEvents);
        }
        // Separators produce no events, so one advance may consume
        // several tokens.
        loop {
            let token = self.next_token()?;
            if !self.started {
                self.started = true;
                return match token {
                    Token::BeginObject | Token::BeginArray => {
                        self.accept_value(token, "a root container")
                    }
                    other => Err(StreamError::UnexpectedToken {
                        token: other.describe(),
                        expected: "'{' or '['",
                    }),
                };
            }
            let expect = *self.stack.last().expect("unclosed root frame");
            match expect {
                Expect::ArrayValueOrEnd | Expect::ArrayValue => {
                    if matches!(token, Token::EndArray) {
                        if matches!(expect, Expect::ArrayValueOrEnd) {
                            return Ok(self.close(Event::EndArray));
                        }
                        return Err(StreamError::UnexpectedToken {
                            token: token.describe(),
                            expected: expect.describe(),
                        });
                    }
                    *self.stack.last_mut().expect("checked above") = Expect::ArrayCommaOrEnd;
                    return self.accept_value(token, expect.describe());
                }
                Expect::ArrayCommaOrEnd => match token {
                    Token::ValueSeparator => {
                        *self.stack.last_mut().expect("checked above") = Expect::ArrayValue;
                    }
                    Token::EndArray => return Ok(self.close(Event::EndArray)),
                    other => {
                        return Err(StreamError::UnexpectedToken {
                            token: other.describe(),
                            expected: expect.describe(),
                        })
                    }
                },
                Expect::ObjectKeyOrEnd | Expect::ObjectKey => match token {
                    Token::String(key) => {
                        *self.stack.last_mut().expect("checked above") = Expect::ObjectColon;
                        return Ok(self.set_current(Current::Key(key)));
                    }
                    Token::EndObject if matches!(expect, Expect::ObjectKeyOrEnd) => {
                        return Ok(self.close(Event::EndObject));
                    }
                    other => {
                        return Err(StreamError::UnexpectedToken {
                            token: other.describe(),
                            expected: expect.describe(),
                        })
                    }
                },
                Expect::ObjectColon => match token {
                    Token::NameSeparator => {
                        *self.stack.last_mut().expect("checked above") = Expect::ObjectValue;
                    }
                    other => {
                        return Err(StreamError::UnexpectedToken {
                            token: other.describe(),
                            expected: expect.describe(),
                        })
                    }
                },
                Expect::ObjectValue => {
                    *self.stack.last_mut().expect("checked above") = Expect::ObjectCommaOrEnd;
                    return self.accept_value(token, expect.describe());
                }
                Expect::ObjectCommaOrEnd => match token {
                    Token::ValueSeparator => {
                        *self.stack.last_mut().expect("checked above") = Expect::ObjectKey;
                    }
                    Token::EndObject => return Ok(self.close(Event::EndObject)),
                    other => {
                        return Err(StreamError::UnexpectedToken {
                            token: other.describe(),
                            expected: expect.describe(),
                        })
                    }
                },
            }
        }
    }

    fn as_str(&self) -> Result<&str, StreamError> {
        match &self.current {
            Some(Current::Key(text) | Current::Str(text)) => Ok(text),
            other => Err(StreamError::InvalidAccessor {
                expected: "a member name or string value",
                current: other.as_ref().map(Current::event),
            }),
        }
    }

    fn as_number(&self) -> Result<&Number, StreamError> {
        match &self.current {
            Some(Current::Num(number)) => Ok(number),
            other => Err(StreamError::InvalidAccessor {
                expected: "a number value",
                current: other.as_ref().map(Current::event),
            }),
        }
    }
}
