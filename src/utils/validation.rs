use lazy_static::lazy_static;
use regex::Regex;
use validator::Validate;
use crate::errors::AppError;
use crate::models::notification_pref::CODES;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9 ().-]{7,20}$").unwrap();
    static ref PROXY_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

pub fn validate_notification_code(code: &str) -> Result<(), AppError> {
    if !CODES.contains(&code) {
        return Err(AppError::BadRequest(format!(
            "Notification code must be one of {}",
            CODES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), AppError> {
    if !PHONE_RE.is_match(phone) {
        return Err(AppError::BadRequest("Invalid phone number".to_string()));
    }
    Ok(())
}

// Proxies end up in the local part of relay addresses.
pub fn validate_proxy(proxy: &str) -> Result<(), AppError> {
    if !PROXY_RE.is_match(proxy) {
        return Err(AppError::BadRequest("Invalid proxy".to_string()));
    }
    Ok(())
}

pub fn validate_coordinates(lat: f64, long: f64) -> Result<(), AppError> {
    if !crate::utils::geo::is_valid_coordinate(lat, long) {
        return Err(AppError::BadRequest(
            "Latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_codes() {
        assert!(validate_notification_code("newBuddy").is_ok());
        assert!(validate_notification_code("newRequest").is_ok());
        assert!(validate_notification_code("newbuddy").is_err());
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone("+1 (503) 555-0199").is_ok());
        assert!(validate_phone("503.555.0199").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("12").is_err());
    }

    #[test]
    fn proxies_cannot_smuggle_addresses() {
        assert!(validate_proxy("a1b2-c3").is_ok());
        assert!(validate_proxy("evil@example.com").is_err());
        assert!(validate_proxy("").is_err());
    }
}
