//! Declarative argument checks run before a request is built.
//!
//! Each operation owns a [`Schema`]: a list of fields and the shape each must
//! have. Arguments are checked as a JSON view, so typed and untyped callers
//! get identical messages.

use crate::{Error, Result};
use serde_json::Value;

/// Expected shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    /// Non-empty string usable as one URL path segment.
    PathSegment,
    /// String-encoded timestamp.
    Timestamp,
    /// Array with at least one element.
    NonEmptyArray,
    Number,
    Object,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn new(field: &'static str, kind: FieldKind) -> Self {
        Self { field, kind }
    }

    fn check(&self, value: Option<&Value>) -> Result<()> {
        let field = self.field;
        match self.kind {
            FieldKind::PathSegment => match value.and_then(Value::as_str) {
                Some(s) if !s.is_empty() && s != "." && s != ".." => Ok(()),
                Some(_) => Err(Error::validation(
                    field,
                    format!("{} should be a non-empty path segment", field),
                )),
                None => Err(Error::validation(
                    field,
                    format!("{} should be a string", field),
                )),
            },
            FieldKind::Timestamp => match value.and_then(Value::as_str) {
                Some(s) if !s.trim().is_empty() => Ok(()),
                _ => Err(Error::validation(
                    field,
                    format!("{} should be a string", field),
                )),
            },
            FieldKind::NonEmptyArray => match value.and_then(Value::as_array) {
                Some(items) if !items.is_empty() => Ok(()),
                Some(_) => Err(Error::validation(
                    field,
                    format!("{} should be an array with at least 1 item", field),
                )),
                None => Err(Error::validation(
                    field,
                    format!("{} should be an array", field),
                )),
            },
            FieldKind::Number => match value {
                Some(Value::Number(_)) => Ok(()),
                _ => Err(Error::validation(
                    field,
                    format!("{} should be a number", field),
                )),
            },
            FieldKind::Object => match value {
                Some(Value::Object(_)) => Ok(()),
                _ => Err(Error::validation(
                    field,
                    format!("{} should be an object", field),
                )),
            },
        }
    }
}

/// Ordered set of field rules; the first failing rule is reported.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Schema {
    rules: &'static [FieldRule],
}

impl Schema {
    /// Checks every rule against the fields of `args`.
    pub fn check(&self, args: &Value) -> Result<()> {
        self.rules
            .iter()
            .try_for_each(|rule| rule.check(args.get(rule.field)))
    }

    /// Checks a bare value against the rules declared for `field`.
    pub fn check_value(&self, field: &'static str, value: &Value) -> Result<()> {
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .try_for_each(|rule| rule.check(Some(value)))
    }
}

pub(crate) const CAMPUS: Schema = Schema {
    rules: &[FieldRule::new("campusKey", FieldKind::PathSegment)],
};

pub(crate) const APPOINTMENT: Schema = Schema {
    rules: &[
        FieldRule::new("campusKey", FieldKind::PathSegment),
        FieldRule::new("appointmentId", FieldKind::PathSegment),
    ],
};

pub(crate) const APPOINTMENT_UPDATE: Schema = Schema {
    rules: &[FieldRule::new("body", FieldKind::Object)],
};

pub(crate) const AVAILABILITY: Schema = Schema {
    rules: &[
        FieldRule::new("startDate", FieldKind::Timestamp),
        FieldRule::new("endDate", FieldKind::Timestamp),
        FieldRule::new("examGroups", FieldKind::NonEmptyArray),
        FieldRule::new("duration", FieldKind::Number),
    ],
};
