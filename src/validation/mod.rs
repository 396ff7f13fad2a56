//! Declarative input checks.
//!
//! Request bodies implement [`Validate`]; the `Valid<T>` extractor runs it
//! before a handler sees the body, and services call the same rules again
//! where a check belongs to the operation itself.
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{
    CreateProject, LoginUser, NewProject, ProjectChanges, ProjectStatus, RegisterUser,
    UpdateProject,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field name -> first problem found for that field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    fields: HashMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn into_fields(self) -> HashMap<String, String> {
        self.fields
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// "Invalid input: a, b" with field names sorted
    pub fn summary(&self) -> String {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        format!("Invalid input: {}", names.join(", "))
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub mod rules {
    use super::*;

    /// Non-empty after trimming. Returns the trimmed value when present.
    pub fn required<'a>(errors: &mut ValidationErrors, field: &str, value: &'a str) -> Option<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            errors.add(field, "This field is required");
            None
        } else {
            Some(trimmed)
        }
    }

    /// Optional field that must not be blank when provided
    pub fn not_blank<'a>(
        errors: &mut ValidationErrors,
        field: &str,
        value: Option<&'a str>,
    ) -> Option<&'a str> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                errors.add(field, "This field cannot be empty");
                None
            } else {
                Some(trimmed)
            }
        })
    }

    pub fn date(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(field, "Expected a date in YYYY-MM-DD format");
                None
            }
        }
    }

    pub fn uuid(field: &str, value: &str) -> Result<Uuid, ValidationErrors> {
        Uuid::parse_str(value.trim())
            .map_err(|_| ValidationErrors::single(field, format!("Invalid id: {}", value)))
    }

    pub fn min_length(errors: &mut ValidationErrors, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            errors.add(field, format!("Must be at least {} characters", min));
        }
    }

    pub fn email(errors: &mut ValidationErrors, field: &str, value: &str) {
        let value = value.trim();
        let valid = match value.split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
            None => false,
        };
        if !valid {
            errors.add(field, "Invalid email format");
        }
    }

    /// 3-30 chars, starts with a letter, then letters, digits or `_`
    pub fn username(errors: &mut ValidationErrors, field: &str, value: &str) {
        let len = value.chars().count();
        let mut chars = value.chars();
        let starts_with_letter = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic());
        let valid = (3..=30).contains(&len)
            && starts_with_letter
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            errors.add(
                field,
                "Must be 3-30 characters, start with a letter, and contain only letters, numbers and underscores",
            );
        }
    }
}

impl CreateProject {
    /// Trimmed, typed fields or every problem found.
    pub fn parse(&self) -> Result<NewProject, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = rules::required(&mut errors, "name", &self.name);
        let description = rules::required(&mut errors, "description", &self.description);
        let start_date = rules::required(&mut errors, "startDate", &self.start_date)
            .and_then(|v| rules::date(&mut errors, "startDate", v));
        let end_date = rules::required(&mut errors, "endDate", &self.end_date)
            .and_then(|v| rules::date(&mut errors, "endDate", v));

        match (name, description, start_date, end_date) {
            (Some(name), Some(description), Some(start_date), Some(end_date)) if errors.is_empty() => {
                Ok(NewProject {
                    name: name.to_string(),
                    description: description.to_string(),
                    start_date,
                    end_date,
                })
            }
            _ => Err(errors),
        }
    }
}

impl Validate for CreateProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.parse().map(|_| ())
    }
}

impl UpdateProject {
    pub fn parse(&self) -> Result<ProjectChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = rules::not_blank(&mut errors, "name", self.name.as_deref());
        let description = rules::not_blank(&mut errors, "description", self.description.as_deref());
        let start_date = rules::not_blank(&mut errors, "startDate", self.start_date.as_deref())
            .and_then(|v| rules::date(&mut errors, "startDate", v));
        let end_date = rules::not_blank(&mut errors, "endDate", self.end_date.as_deref())
            .and_then(|v| rules::date(&mut errors, "endDate", v));
        let status = rules::not_blank(&mut errors, "status", self.status.as_deref()).and_then(|v| {
            v.parse::<ProjectStatus>()
                .map_err(|msg| errors.add("status", msg))
                .ok()
        });

        errors.into_result()?;

        let changes = ProjectChanges {
            name: name.map(str::to_string),
            description: description.map(str::to_string),
            start_date,
            end_date,
            status,
        };
        if changes.is_empty() {
            return Err(ValidationErrors::single(
                "body",
                "At least one of name, description, startDate, endDate or status is required",
            ));
        }
        Ok(changes)
    }
}

impl Validate for UpdateProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.parse().map(|_| ())
    }
}

impl Validate for RegisterUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(username) = rules::required(&mut errors, "username", &self.username) {
            rules::username(&mut errors, "username", username);
        }
        if let Some(email) = rules::required(&mut errors, "email", &self.email) {
            rules::email(&mut errors, "email", email);
        }
        if rules::required(&mut errors, "password", &self.password).is_some() {
            rules::min_length(&mut errors, "password", &self.password, 8);
        }
        errors.into_result()
    }
}

impl Validate for LoginUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        rules::required(&mut errors, "username", &self.username);
        rules::required(&mut errors, "password", &self.password);
        errors.into_result()
    }
}
