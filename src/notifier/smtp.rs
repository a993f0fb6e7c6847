use super::{Notifier, make_body, make_subject};
use crate::error::Error;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::info;

pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub from: Mailbox,
    pub to: Mailbox,
    pub credentials: Option<(String, String)>,
    pub enable_ssl: bool,
}

impl SmtpSettings {
    pub fn new(
        server: &str,
        port: u16,
        from: Option<&str>,
        to: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
        enable_ssl: bool,
    ) -> Result<Self, Error> {
        let from = parse_mailbox_("email-from", from)?;
        let to = parse_mailbox_("email-to", to)?;
        let credentials = user.map(|user| {
            (
                user.to_string(),
                password.map(str::to_string).unwrap_or_default(),
            )
        });
        Ok(Self {
            server: server.to_string(),
            port,
            from,
            to,
            credentials,
            enable_ssl,
        })
    }
}

fn parse_mailbox_(option: &str, value: Option<&str>) -> Result<Mailbox, Error> {
    let value = value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::new_config(format!("--{option} is required with --smtp-server")))?;
    value
        .parse::<Mailbox>()
        .map_err(|error| Error::new_config(format!("invalid --{option} {value} : {error}")))
}

pub struct EmailNotifier {
    transport: SmtpTransport,
    settings: SmtpSettings,
}

impl EmailNotifier {
    pub fn new(settings: SmtpSettings) -> Result<Self, Error> {
        let builder = if settings.enable_ssl {
            SmtpTransport::starttls_relay(&settings.server).map_err(|error| {
                Error::new_config(format!(
                    "failed to init smtp relay {} : {error}",
                    settings.server
                ))
            })?
        } else {
            SmtpTransport::builder_dangerous(&settings.server)
        };
        let mut builder = builder.port(settings.port);
        if let Some((user, password)) = &settings.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }
        info!(
            "smtp notifier {}:{} enable_ssl:{}",
            settings.server, settings.port, settings.enable_ssl
        );

        Ok(Self {
            transport: builder.build(),
            settings,
        })
    }
}

impl Notifier for EmailNotifier {
    fn send(&self, messages: &[String]) -> Result<(), Error> {
        let email = Message::builder()
            .from(self.settings.from.clone())
            .to(self.settings.to.clone())
            .subject(make_subject(&chrono::Local::now()))
            .header(ContentType::TEXT_PLAIN)
            .body(make_body(messages))
            .map_err(|error| Error::new_delivery(format!("failed to build email : {error}")))?;

        self.transport.send(&email).map_err(|error| {
            Error::new_delivery(format!(
                "failed to send email via {} : {error}",
                self.settings.server
            ))
        })?;
        info!("email alert sent via {}", self.settings.server);
        Ok(())
    }
}
