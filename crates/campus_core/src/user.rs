//! User records as issued by the campus platform.
//!
//! A user carries a fixed set of common fields plus exactly one role profile.
//! The profile is a tagged union keyed by `role`, so fields that belong to a
//! different role can never be present on the same record.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a user record or its point balance is invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("user id must not be empty")]
    MissingId,

    #[error("user email must not be empty")]
    MissingEmail,

    #[error("point balance must not be negative (got {0})")]
    NegativeBalance(i64),

    #[error("insufficient points: balance {balance}, requested {requested}")]
    InsufficientPoints { balance: i64, requested: i64 },

    #[error("point amount must be positive (got {0})")]
    InvalidAmount(i64),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("user record carries a role this client does not support")]
    UnrecognizedRole,
}

/// The roles a user can log in as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "admin" => Ok(Role::Admin),
            other => Err(ProfileError::UnknownRole(other.to_string())),
        }
    }
}

/// A platform user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier
    pub id: String,

    pub email: String,

    /// Display name
    pub name: String,

    /// ISO date (`2024-01-15`) or RFC 3339 timestamp
    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,

    /// Role-specific fields, tagged by `role`
    #[serde(flatten)]
    pub profile: Profile,
}

/// Role-specific part of a [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Student(StudentProfile),
    Faculty(FacultyProfile),
    Admin(AdminProfile),
    /// A role tag this client does not know about.
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub department: String,
    pub enrollment_year: i32,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacultyProfile {
    pub department: String,
    pub subject: String,
    /// Opaque identifier encoded into attendance QR codes
    pub qr_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub college: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl StudentProfile {
    /// Add `amount` points earned from an achievement or event.
    pub fn award_points(&mut self, amount: i64) -> Result<i64, ProfileError> {
        if amount <= 0 {
            return Err(ProfileError::InvalidAmount(amount));
        }
        self.points = self.points.saturating_add(amount);
        Ok(self.points)
    }

    /// Deduct `amount` points for a redemption.
    ///
    /// The balance is left untouched when it does not cover the request.
    pub fn spend_points(&mut self, amount: i64) -> Result<i64, ProfileError> {
        if amount <= 0 {
            return Err(ProfileError::InvalidAmount(amount));
        }
        if amount > self.points {
            return Err(ProfileError::InsufficientPoints {
                balance: self.points,
                requested: amount,
            });
        }
        self.points -= amount;
        Ok(self.points)
    }
}

impl User {
    /// The user's role, or `None` for a role tag this client does not know.
    pub fn role(&self) -> Option<Role> {
        match self.profile {
            Profile::Student(_) => Some(Role::Student),
            Profile::Faculty(_) => Some(Role::Faculty),
            Profile::Admin(_) => Some(Role::Admin),
            Profile::Unrecognized => None,
        }
    }

    pub fn student(&self) -> Option<&StudentProfile> {
        match &self.profile {
            Profile::Student(student) => Some(student),
            _ => None,
        }
    }

    pub fn student_mut(&mut self) -> Option<&mut StudentProfile> {
        match &mut self.profile {
            Profile::Student(student) => Some(student),
            _ => None,
        }
    }

    pub fn faculty(&self) -> Option<&FacultyProfile> {
        match &self.profile {
            Profile::Faculty(faculty) => Some(faculty),
            _ => None,
        }
    }

    pub fn admin(&self) -> Option<&AdminProfile> {
        match &self.profile {
            Profile::Admin(admin) => Some(admin),
            _ => None,
        }
    }

    /// Check the invariants a user must hold before it is kept in a session.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.id.trim().is_empty() {
            return Err(ProfileError::MissingId);
        }
        if self.email.trim().is_empty() {
            return Err(ProfileError::MissingEmail);
        }
        match &self.profile {
            Profile::Student(student) if student.points < 0 => {
                Err(ProfileError::NegativeBalance(student.points))
            }
            Profile::Unrecognized => Err(ProfileError::UnrecognizedRole),
            _ => Ok(()),
        }
    }

    /// Calendar date the account was created, if `created_at` parses.
    pub fn created_on(&self) -> Option<NaiveDate> {
        let raw = self.created_at.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(timestamp.date_naive());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}
