//! Client-side domain types.
//!
//! These are the shapes the UI works with: camelCase field names, a
//! lower-case repeat enum and a flat `notifications` list. The server
//! speaks a different dialect; see [`crate::wire`] for the translation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersonaError;

/// A user-defined context that events are grouped and colored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A persona that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaDraft {
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single concrete occurrence. `repeat` records intent only; no
/// recurrence is expanded locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub persona_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub notifications: Vec<NotificationSetting>,
}

/// An event that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub persona_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub notifications: Vec<NotificationSetting>,
}

impl Event {
    /// True when the event starts inside `[from, to]`.
    pub fn starts_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start >= from && self.start <= to
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// How often an event is meant to recur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Repeat {
    pub const ALL: [Repeat; 4] = [Repeat::None, Repeat::Daily, Repeat::Weekly, Repeat::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Repeat::None => "none",
            Repeat::Daily => "daily",
            Repeat::Weekly => "weekly",
            Repeat::Monthly => "monthly",
        }
    }

    /// The server's spelling.
    pub fn as_upper(&self) -> &'static str {
        match self {
            Repeat::None => "NONE",
            Repeat::Daily => "DAILY",
            Repeat::Weekly => "WEEKLY",
            Repeat::Monthly => "MONTHLY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Repeat::None => "반복 안함",
            Repeat::Daily => "매일",
            Repeat::Weekly => "매주",
            Repeat::Monthly => "매월",
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Repeat {
    type Err = PersonaError;

    /// Case-insensitive; both layers' spellings parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Repeat::None),
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            other => Err(PersonaError::Validation(format!(
                "Invalid repeat '{}'. Expected none, daily, weekly or monthly",
                other
            ))),
        }
    }
}

/// Where a reminder is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Push,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::Push => "push",
        }
    }

    pub fn as_upper(&self) -> &'static str {
        match self {
            NotificationChannel::Email => "EMAIL",
            NotificationChannel::Push => "PUSH",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationChannel {
    type Err = PersonaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(NotificationChannel::Email),
            "push" => Ok(NotificationChannel::Push),
            other => Err(PersonaError::Validation(format!(
                "Invalid notification type '{}'. Expected email or push",
                other
            ))),
        }
    }
}

/// Remind via `channel`, `minutes_before` the event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSetting {
    #[serde(rename = "type")]
    pub channel: NotificationChannel,
    #[serde(alias = "minutes_before")]
    pub minutes_before: i64,
}

impl NotificationSetting {
    pub fn push(minutes_before: i64) -> Self {
        NotificationSetting {
            channel: NotificationChannel::Push,
            minutes_before,
        }
    }

    pub fn email(minutes_before: i64) -> Self {
        NotificationSetting {
            channel: NotificationChannel::Email,
            minutes_before,
        }
    }
}
