use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
    dates::{deserialize_date, deserialize_date_patch, deserialize_optional_date},
    error::AppError,
    model::Priority,
};

pub const MIN_PASSWORD_LEN: usize = 6;

// Request body for creating an account
#[derive(Debug, Deserialize)]
pub struct RegisterSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterSchema {
    /// Trims the name, trims and lowercases the email, then checks the rules
    /// registration enforces before touching the database.
    pub fn normalize(self) -> Result<RegisterSchema, AppError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(AppError::validation(
                "Name, email, and password are required",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(
                "Password must be at least 6 characters",
            ));
        }
        Ok(RegisterSchema {
            name,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginSchema {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginSchema {
    pub fn normalize(self) -> Result<LoginSchema, AppError> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() || self.password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }
        Ok(LoginSchema {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordSchema {
    #[serde(default)]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[serde(default)]
    pub new_password: String,
}

// Struct representing the request body for creating a new Event
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventSchema {
    #[validate(custom = "not_blank")]
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_date")]
    pub end_date: DateTime<Utc>,
    pub all_day: Option<bool>,
    #[validate(custom = "hex_color")]
    pub color: Option<String>,
}

// Struct representing the request body for updating an Event
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventSchema {
    #[validate(custom = "not_blank")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    #[validate(custom = "hex_color")]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

// Struct representing the request body for creating a new Todo
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoSchema {
    #[validate(custom = "not_blank")]
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<DateTime<Utc>>,
}

// Struct representing the request body for updating a Todo
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoSchema {
    #[validate(custom = "not_blank")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_date_patch")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListSchema {
    #[validate(custom = "not_blank")]
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub list_date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListSchema {
    #[validate(custom = "not_blank")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub list_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemSchema {
    #[validate(custom = "not_blank")]
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MagicMirrorQuery {
    pub date: Option<String>,
}

/// Trims an optional free-text field, treating absence as empty.
pub fn clean_text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("Title is required"));
        return Err(err);
    }
    Ok(())
}

fn hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or("");
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        let mut err = ValidationError::new("hex_color");
        err.message = Some(Cow::from("Color must be a hex value such as #3b82f6"));
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_every_field() {
        let schema = RegisterSchema {
            name: "  ".into(),
            email: "a@b.c".into(),
            password: "secret1".into(),
        };
        let err = schema.normalize().unwrap_err();
        assert_eq!(err.to_string(), "Name, email, and password are required");
    }

    #[test]
    fn register_rejects_short_password() {
        let schema = RegisterSchema {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "12345".into(),
        };
        let err = schema.normalize().unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn register_normalizes_email() {
        let schema = RegisterSchema {
            name: " Ada ".into(),
            email: "  Ada@Example.COM ".into(),
            password: "123456".into(),
        }
        .normalize()
        .unwrap();
        assert_eq!(schema.name, "Ada");
        assert_eq!(schema.email, "ada@example.com");
    }

    #[test]
    fn item_title_required_but_description_optional() {
        let blank: AddItemSchema =
            serde_json::from_str(r#"{"title": "   ", "description": "x"}"#).unwrap();
        assert!(blank.validate().is_err());

        let ok: AddItemSchema =
            serde_json::from_str(r#"{"title": "Milk", "description": ""}"#).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn event_color_must_be_hex() {
        let mut update = UpdateEventSchema {
            color: Some("#3B82F6".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        update.color = Some("#fff".into());
        assert!(update.validate().is_ok());
        update.color = Some("blue".into());
        assert!(update.validate().is_err());
        update.color = Some("#12345g".into());
        assert!(update.validate().is_err());
    }

    #[test]
    fn event_dates_are_coerced() {
        let body: CreateEventSchema = serde_json::from_str(
            r#"{"title":"Standup","startDate":"2024-12-01T09:00","endDate":"2024-12-01"}"#,
        )
        .unwrap();
        assert_eq!(body.start_date.to_rfc3339(), "2024-12-01T09:00:00+00:00");
        assert_eq!(body.end_date.to_rfc3339(), "2024-12-01T00:00:00+00:00");

        let bad = serde_json::from_str::<CreateEventSchema>(
            r#"{"title":"Standup","startDate":"soon","endDate":"2024-12-01"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let bad = serde_json::from_str::<CreateTodoSchema>(r#"{"title":"x","priority":"urgent"}"#);
        assert!(bad.is_err());

        let ok: CreateTodoSchema =
            serde_json::from_str(r#"{"title":"x","priority":"high","dueDate":""}"#).unwrap();
        assert_eq!(ok.priority, Some(Priority::High));
        assert_eq!(ok.due_date, None);
    }
}
