//! # Buffer Validator
//!
//! Every caller-supplied buffer passes through here before any byte of it
//! reaches a primitive. The primitives index into these slices at fixed
//! offsets, so a short buffer is a memory-safety problem, not a logic one.

use crate::error::AeadError;
use crate::value::HostValue;

/// Shape a buffer argument must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Any,
    Exact(usize),
    AtLeast(usize),
}

/// Associated data as the caller supplied it.
///
/// `Absent` and `Present(&[])` are kept apart all the way down to the
/// primitive boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociatedData<'a> {
    #[default]
    Absent,
    Present(&'a [u8]),
}

impl<'a> AssociatedData<'a> {
    pub fn as_option(&self) -> Option<&'a [u8]> {
        match *self {
            AssociatedData::Absent => None,
            AssociatedData::Present(ad) => Some(ad),
        }
    }

    pub fn len(&self) -> usize {
        self.as_option().map_or(0, <[u8]>::len)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, AssociatedData::Absent)
    }
}

impl<'a> From<Option<&'a [u8]>> for AssociatedData<'a> {
    fn from(ad: Option<&'a [u8]>) -> Self {
        match ad {
            Some(ad) => AssociatedData::Present(ad),
            None => AssociatedData::Absent,
        }
    }
}

impl<'a> From<&'a [u8]> for AssociatedData<'a> {
    fn from(ad: &'a [u8]) -> Self {
        AssociatedData::Present(ad)
    }
}

/// Checks an already-typed slice against a length constraint.
#[inline]
pub fn check_len<'a>(
    argument: &'static str,
    buf: &'a [u8],
    constraint: Constraint,
) -> Result<&'a [u8], AeadError> {
    match constraint {
        Constraint::Any => Ok(buf),
        Constraint::Exact(len) if buf.len() == len => Ok(buf),
        Constraint::Exact(len) => Err(AeadError::exact(argument, len)),
        Constraint::AtLeast(len) if buf.len() >= len => Ok(buf),
        Constraint::AtLeast(len) => Err(AeadError::at_least(argument, len)),
    }
}

/// Narrows a host value to a byte view.
pub fn require_buffer<'a>(
    argument: &'static str,
    value: &'a HostValue,
    constraint: Constraint,
) -> Result<&'a [u8], AeadError> {
    let buf = value
        .as_bytes()
        .ok_or(AeadError::TypeMismatch { argument })?;
    check_len(argument, buf, constraint)
}

/// Narrows a host value that may be `null`/`undefined`.
pub fn optional_buffer<'a>(
    argument: &'static str,
    value: &'a HostValue,
) -> Result<AssociatedData<'a>, AeadError> {
    if value.is_absent() {
        return Ok(AssociatedData::Absent);
    }
    require_buffer(argument, value, Constraint::Any).map(AssociatedData::Present)
}

/// Positional access to a host argument list.
///
/// Missing trailing arguments read as absent, so a required buffer that was
/// never passed fails the same way as one of the wrong type.
pub struct Args<'a> {
    values: &'a [HostValue],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [HostValue]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn at(&self, index: usize) -> &'a HostValue {
        static ABSENT: HostValue = HostValue::Undefined;
        self.values.get(index).unwrap_or(&ABSENT)
    }

    pub fn buffer(
        &self,
        index: usize,
        argument: &'static str,
        constraint: Constraint,
    ) -> Result<&'a [u8], AeadError> {
        require_buffer(argument, self.at(index), constraint)
    }

    pub fn optional(
        &self,
        index: usize,
        argument: &'static str,
    ) -> Result<AssociatedData<'a>, AeadError> {
        optional_buffer(argument, self.at(index))
    }

    pub fn external<T: core::any::Any + Send + Sync>(
        &self,
        index: usize,
        argument: &'static str,
    ) -> Result<&'a T, AeadError> {
        self.at(index)
            .downcast_external::<T>()
            .ok_or(AeadError::TypeMismatch { argument })
    }
}
