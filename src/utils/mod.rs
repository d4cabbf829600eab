pub mod mailer;
pub mod record_id;
pub mod secrets;
pub mod time;
