//! Incremental `DD/MM/YYYY` input masking.
//!
//! The mask works on whole input values, not keystrokes: the host hands over
//! the text the field would hold after an edit and gets back either the new
//! buffer or a rejection, in which case the field keeps its previous buffer.

use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use tracing::trace;

use crate::consts::{DATE_BUFFER_LEN, DATE_SEPARATOR};
use crate::prelude::*;
use crate::{CalendarDate, DateError};

lazy_static! {
    /// Every shape a stored buffer may take.
    static ref BUFFER_SHAPE: Regex =
        Regex::new(r"^(?:[0-9]{0,2}|[0-9]{1,2}/[0-9]{0,2}|[0-9]{1,2}/[0-9]{1,2}/[0-9]{0,4})$")
            .expect("static date buffer pattern");
    /// A segment that just overflowed by one digit: `DDM` or `D?D/MMY`.
    static ref SEGMENT_OVERFLOW: Regex =
        Regex::new(r"^(?:[0-9]{3}|[0-9]{1,2}/[0-9]{3})$")
            .expect("static segment overflow pattern");
    static ref COMPLETE_SHAPE: Regex =
        Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("static complete date pattern");
}

/// Raw input that matches no partial date shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("input does not match a partial DD/MM/YYYY shape")]
pub struct InputRejected;

/// A partially typed date, always in one of the shapes
/// `D{0,2}`, `D{1,2}/D{0,2}` or `D{1,2}/D{1,2}/D{0,4}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deref, Display)]
pub struct DateBuffer(String);

impl DateBuffer {
    pub const fn new() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True once all of `DD/MM/YYYY` has been typed.
    pub fn is_complete(&self) -> bool {
        COMPLETE_SHAPE.is_match(&self.0)
    }

    /// Validates the calendar date of a complete buffer.
    ///
    /// # Errors
    /// `DateError::IncompleteFormat` if the buffer is not a full `DD/MM/YYYY`,
    /// otherwise whatever the month-length table rejects.
    pub fn validate_complete(&self) -> Result<CalendarDate, DateError> {
        self.0.parse()
    }
}

impl FromStr for DateBuffer {
    type Err = InputRejected;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if BUFFER_SHAPE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(InputRejected)
        }
    }
}

impl AsRef<str> for DateBuffer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stateless transformation from the previous buffer and the raw field value
/// to the next buffer.
pub struct DateMaskParser;

impl DateMaskParser {
    /// Applies one edit to `previous`.
    ///
    /// A growing input whose last digit overflowed the day or month segment
    /// gets a separator inserted before that digit (`"123"` becomes `"12/3"`).
    /// Earlier segments are never reformatted.
    ///
    /// # Errors
    /// `InputRejected` if `raw` fits no partial shape. A shrinking edit that
    /// would leave an overflowed segment (deleting the separator of `"12/3"`)
    /// is rejected too.
    pub fn apply(previous: &DateBuffer, raw: &str) -> Result<DateBuffer, InputRejected> {
        if raw.len() > DATE_BUFFER_LEN {
            trace!(len = raw.len(), "date input longer than a full date");
            return Err(InputRejected);
        }
        if BUFFER_SHAPE.is_match(raw) {
            return Ok(DateBuffer(raw.to_owned()));
        }
        if raw.len() > previous.len() && SEGMENT_OVERFLOW.is_match(raw) {
            let (split, _) = raw.char_indices().last().ok_or(InputRejected)?;
            let mut masked = String::with_capacity(raw.len() + 1);
            masked.push_str(&raw[..split]);
            masked.push(DATE_SEPARATOR);
            masked.push_str(&raw[split..]);
            trace!(raw, masked = %masked, "inserted date separator");
            return Ok(DateBuffer(masked));
        }
        trace!(raw, previous = %previous, "rejected date input");
        Err(InputRejected)
    }
}

/// A date input field: the current buffer plus the mask applied on every edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateField {
    buffer: DateBuffer,
}

impl DateField {
    pub const fn new() -> Self {
        Self {
            buffer: DateBuffer::new(),
        }
    }

    /// Pre-fills the field from a stored date, bypassing the keystroke mask.
    ///
    /// # Errors
    /// `InputRejected` if `value` is not a valid buffer shape.
    pub fn with_value(value: &str) -> Result<Self, InputRejected> {
        Ok(Self {
            buffer: value.parse()?,
        })
    }

    pub const fn buffer(&self) -> &DateBuffer {
        &self.buffer
    }

    pub fn as_str(&self) -> &str {
        self.buffer.as_str()
    }

    /// Feeds the raw field value through the mask. Returns whether the buffer
    /// changed; a rejected edit leaves it untouched.
    pub fn input(&mut self, raw: &str) -> bool {
        match DateMaskParser::apply(&self.buffer, raw) {
            Ok(next) if next != self.buffer => {
                self.buffer = next;
                true
            }
            Ok(_) | Err(InputRejected) => false,
        }
    }

    /// # Errors
    /// See [`DateBuffer::validate_complete`].
    pub fn validate(&self) -> Result<CalendarDate, DateError> {
        self.buffer.validate_complete()
    }

    pub fn clear(&mut self) {
        self.buffer = DateBuffer::new();
    }
}
