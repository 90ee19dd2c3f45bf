use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Failure kinds of the runtime. Every variant is a programming-contract
/// violation surfaced at the point of origin; none is retried or degraded.
#[derive(Debug)]
pub enum CoreError {
    /// A namespace or type name is already bound.
    DuplicateName(String),
    /// Mutation attempted on a type that has already been specialized.
    LockedType(String),
    /// An abstract placeholder was invoked, or no base method is bound.
    NotImplemented(String),
    /// The capsule channel was opened while already occupied.
    ReentrantAccess,
    /// A token was presented to a guard that did not issue it.
    AccessDenied,
    /// Terminal `reduce` on an exhausted cursor without a seed.
    EmptyReduce,
    /// A qualified name failed to parse.
    InvalidName(String),
    /// A dynamic call received the wrong kind or number of arguments.
    InvalidArgument(String),
    /// A type or namespace path did not resolve.
    UnknownName(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::DuplicateName(name) => {
                write!(f, "Name '{}' is already defined in namespace.", name)
            }
            CoreError::LockedType(name) => write!(f, "Type '{}' is locked.", name),
            CoreError::NotImplemented(what) => write!(f, "Not implemented: {}.", what),
            CoreError::ReentrantAccess => {
                write!(f, "Access denied: capsule channel is already in use.")
            }
            CoreError::AccessDenied => write!(f, "Access denied."),
            CoreError::EmptyReduce => write!(f, "Reduce of an empty cursor with no seed."),
            CoreError::InvalidName(msg) => write!(f, "Invalid name: {}", msg),
            CoreError::InvalidArgument(msg) => write!(f, "Invalid argument: {}.", msg),
            CoreError::UnknownName(name) => write!(f, "Unknown name '{}'.", name),
        }
    }
}

impl Error for CoreError {}
