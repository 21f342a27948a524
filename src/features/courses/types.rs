//! Catalog payloads. Durations arrive as numbers, numeric strings or not at
//! all, so they are normalized at the boundary. Prices are kept as sent.

use crate::client::{AppError, Upload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "raw_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Price>,
    #[serde(default, alias = "createdBy", skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
}

impl Course {
    /// Free means no price, `0` or `"0"`. Any other value is paid, including
    /// ones that do not parse.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.price.as_ref().map_or(true, Price::is_zero)
    }

    /// Amount to charge, or `None` for free courses and malformed prices.
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.price.as_ref().and_then(Price::amount)
    }
}

/// Course price exactly as the backend sent it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Number(number) => number.classify() == std::num::FpCategory::Zero,
            Self::Text(text) => matches!(text.trim(), "" | "0"),
        }
    }

    /// Positive, finite amount; anything else cannot be charged.
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        let amount = match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        };
        amount.filter(|amount| amount.is_finite() && *amount > 0.0)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self, self.amount()) {
            (_, Some(amount)) => write!(f, "{amount:.2}"),
            (Self::Number(number), None) => write!(f, "{number}"),
            (Self::Text(text), None) => f.write_str(text.trim()),
        }
    }
}

/// Form for a new course. Every text field is required; the cover image is not.
#[derive(Clone, Debug, Default)]
pub struct NewCourse {
    pub title: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub instructor_name: String,
    pub image: Option<Upload>,
}

impl NewCourse {
    /// # Errors
    /// Returns `Validation` for a blank field or a price that is not a
    /// non-negative number.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            &self.title,
            &self.category,
            &self.description,
            &self.price,
            &self.instructor_name,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::Validation("Fill all required fields".to_string()));
        }

        match self.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => Ok(()),
            _ => Err(AppError::Validation(
                "Price must be a number of zero or more.".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CoursesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub courses: Vec<Course>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EnrollResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `null` is no price; numbers and strings are kept verbatim. Other shapes
/// keep their JSON text so they never read as free.
fn raw_price<'de, D>(deserializer: D) -> Result<Option<Price>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => number.as_f64().map(Price::Number),
        Some(Value::String(text)) => Some(Price::Text(text)),
        Some(other) => Some(Price::Text(other.to_string())),
    })
}

/// Accepts numbers or strings and keeps them as display text.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        _ => None,
    })
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
