pub mod mailer;
pub mod matching;
pub mod mx;
pub mod photos;
pub mod relationships;
