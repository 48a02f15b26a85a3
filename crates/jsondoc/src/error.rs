use core::fmt;

/// Errors raised while constructing values.
///
/// These are reported at the offending call, never deferred to `build`.
#[derive(Debug)]
pub enum ValueError {
    /// NaN or ±infinity has no JSON representation.
    NonFinite(f64),
    /// The text is not an RFC 8259 number literal.
    InvalidLiteral(String),
    /// The text is not a JSON document.
    Syntax(serde_json::Error),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::NonFinite(value) => {
                write!(f, "{value} cannot be represented as a JSON number")
            }
            ValueError::InvalidLiteral(literal) => {
                write!(f, "'{literal}' is not a valid JSON number literal")
            }
            ValueError::Syntax(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for ValueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValueError::Syntax(error) => Some(error),
            ValueError::NonFinite(_) | ValueError::InvalidLiteral(_) => None,
        }
    }
}

impl From<serde_json::Error> for ValueError {
    fn from(error: serde_json::Error) -> Self {
        ValueError::Syntax(error)
    }
}
