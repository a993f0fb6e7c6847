use crate::error::Error;

mod smtp;
pub use smtp::*;

/// Best-effort delivery of one cycle's change descriptions.
pub trait Notifier {
    fn send(&self, messages: &[String]) -> Result<(), Error>;
}

pub fn make_subject<Tz>(at: &chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} - {} - {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        at.format("%m/%d/%Y %H:%M:%S")
    )
}

pub fn make_body(messages: &[String]) -> String {
    messages.join("\n\n")
}
