//! # Error Definitions

/// Failures while building or reading call data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The method reference text does not follow `Type.method(p1,p2)`.
    MalformedMethodRef { text: String, reason: &'static str },
    /// An argument has no runtime type to put into a method reference.
    UntypedArgument { index: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedMethodRef { text, reason } => {
                write!(f, "Malformed method reference '{}': {}", text, reason)
            }
            Self::UntypedArgument { index } => {
                write!(f, "Argument {} is null and has no runtime type", index)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
