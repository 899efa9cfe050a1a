// We want a few things here:
// 1. A way to create a new error with a backtrace
// 2. A way to centralize setting a breakpoint to trap any error in the system fairly soon
//    after it's created (or at least when it's propagated from a library we use back to us)
// 3. Same but for logging / emitting error messages into the tracing/logging system
// 4. A coarse kind, so callers can tell a missing join key from a misuse of the API

use std::borrow::Cow;
use backtrace_error::DynBacktraceError;
use tracing::error;

#[cfg(test)]
use test_log::test;

/// Coarse classification of failures. Nothing in the engine retries, the
/// kind only tells the caller whose fault it was.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// The caller broke a documented precondition (unsorted input, a
    /// grouping already open, mismatched slabs, ...).
    Precondition,
    /// A key the operation depends on is absent.
    MissingReference,
    /// A position, width or packed field is out of range.
    Capacity,
    /// A column or value has the wrong type for where it was put.
    Type,
    /// Anything converted from a foreign error.
    Other,
}

#[derive(Debug)]
#[allow(dead_code)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    inner: DynBacktraceError,
}
pub type Result<T> = std::result::Result<T, Error>;

struct SimpleErr(Cow<'static, str>);
impl std::fmt::Debug for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for SimpleErr {}

impl<E: std::error::Error + Send + Sync + 'static> From<E> for Error {
    fn from(err: E) -> Error {
        Error::new(ErrorKind::Other, err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.msg)
    }
}

impl Error {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(kind: ErrorKind, err: E) -> Error {
        error!(target: "ringtab", kind = ?kind, "{:?}", err);
        let msg = err.to_string();
        let inner = DynBacktraceError::from(err);
        Error { kind, msg, inner }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

fn simple(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Error {
    Error::new(kind, SimpleErr(msg.into()))
}

pub fn err(msg: impl Into<Cow<'static, str>>) -> Error {
    simple(ErrorKind::Other, msg)
}

pub fn precondition(msg: impl Into<Cow<'static, str>>) -> Error {
    simple(ErrorKind::Precondition, msg)
}

pub fn missing(msg: impl Into<Cow<'static, str>>) -> Error {
    simple(ErrorKind::MissingReference, msg)
}

pub fn capacity(msg: impl Into<Cow<'static, str>>) -> Error {
    simple(ErrorKind::Capacity, msg)
}

pub fn type_mismatch(msg: impl Into<Cow<'static, str>>) -> Error {
    simple(ErrorKind::Type, msg)
}

#[test]
fn test_error() {
    let err = err("test error");
    assert_eq!(err.kind(), ErrorKind::Other);
    assert_eq!(err.message(), "test error");
}

#[test]
fn test_error_kinds() {
    assert_eq!(precondition("x").kind(), ErrorKind::Precondition);
    assert_eq!(missing("x").kind(), ErrorKind::MissingReference);
    assert_eq!(capacity("x").kind(), ErrorKind::Capacity);
    assert_eq!(type_mismatch("x").kind(), ErrorKind::Type);
    let fmt_err: Error = std::fmt::Error.into();
    assert_eq!(fmt_err.kind(), ErrorKind::Other);
    assert_eq!(format!("{}", missing("no key: 1")), "MissingReference: no key: 1");
}
