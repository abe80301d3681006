use serde::{Deserialize, Serialize};
use chrono::Utc;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub state_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
    pub photo_link: Option<String>,
    pub is_email_verified: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl User {
    /// "First L." as shown to buddies.
    pub fn display_name(&self) -> String {
        match self.last_name.chars().next() {
            Some(initial) => format!("{} {}.", self.first_name, initial),
            None => self.first_name.clone(),
        }
    }
}

/// Public handle derived from the real name: `First.L`.
pub fn user_name(first_name: &str, last_name: &str) -> String {
    let initial: String = last_name.chars().take(1).collect();
    format!("{}.{}", first_name, initial)
}

/// Splits "First Last" into its first word and the rest. Both halves must be present
/// and at most 50 characters.
pub fn split_full_name(full_name: &str) -> Option<(String, String)> {
    let mut words = full_name.split_whitespace();
    let first = words.next()?;
    let last = words.collect::<Vec<_>>().join(" ");

    if last.is_empty() || first.chars().count() > 50 || last.chars().count() > 50 {
        return None;
    }
    Some((first.to_string(), last))
}

#[derive(sqlx::FromRow, Debug)]
pub struct GetUserCredentials {
    pub id: i64,
    pub password: String,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NearbyUser {
    pub first_name: String,
}

/// What the candidate search needs to know about the requester.
#[derive(sqlx::FromRow, Debug)]
pub struct MatchContext {
    pub gender: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance: Option<i32>,
    pub gender_pref: Option<String>,
}

pub struct NewUser {
    pub name: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub state_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
}

pub struct PersonalInformation {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    /// `None` keeps the stored number.
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_name_uses_last_initial() {
        assert_eq!(user_name("Olen", "Daelhousen"), "Olen.D");
        assert_eq!(user_name("Ana", ""), "Ana.");
    }

    #[test]
    fn user_name_handles_multibyte_initials() {
        assert_eq!(user_name("Zoë", "Øster"), "Zoë.Ø");
    }

    #[test]
    fn full_name_needs_first_and_last() {
        assert_eq!(
            split_full_name("  Olen  Van Daelhousen "),
            Some(("Olen".to_string(), "Van Daelhousen".to_string()))
        );
        assert_eq!(split_full_name("Olen"), None);
        assert_eq!(split_full_name("   "), None);
        assert_eq!(split_full_name(&format!("Olen {}", "x".repeat(51))), None);
    }
}
