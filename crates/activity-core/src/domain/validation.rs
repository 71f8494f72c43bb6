//! Structural validation shared by every entity.
//!
//! Rules live on the entities as `validator` attributes. Callers only ever see
//! one violation: the first failing field by name, so the message is stable.

use validator::{Validate, ValidationErrors};

use crate::error::DomainError;

const SCHEMA_FIELD: &str = "__all__";

pub fn first_violation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let Some((field, err)) = fields
        .iter()
        .find_map(|(field, errs)| errs.first().map(|e| (field, e)))
    else {
        return "invalid input".to_string();
    };

    let detail = match &err.message {
        Some(msg) => msg.to_string(),
        None => err.code.to_string(),
    };
    if field == SCHEMA_FIELD {
        detail
    } else {
        format!("{}: {}", field, detail)
    }
}

/// Runs the entity's rules and converts failures into [`DomainError::ValidationError`].
pub trait Validated: Validate {
    fn check(&self) -> Result<(), DomainError> {
        self.validate().map_err(DomainError::from)
    }
}

impl<T: Validate> Validated for T {}
