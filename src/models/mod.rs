pub mod answer;
pub mod match_pref;
pub mod notification_pref;
pub mod refresh_token;
pub mod user;
