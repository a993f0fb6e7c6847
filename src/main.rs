use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;
use log::info;
use std::time::Duration;

mod account;
mod alias;
mod detector;
mod error;
mod monitor;
mod notifier;
mod persistence;
mod source;

use monitor::{Monitor, SystemClock};
use notifier::{DEFAULT_SMTP_PORT, EmailNotifier, Notifier, SmtpSettings};
use persistence::SQLitePersistance;
use source::{NullRequester, Requester, SEQUENCE_ACCOUNTS_URL, SequenceRequester};

use error::Error;

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum AccountSource {
    Null,
    Sequence,
}

impl std::fmt::Display for AccountSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

/// Watch account balances and record every change
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Bearer access token for the accounts API
    #[clap(short, long, value_parser)]
    token: String,

    /// Interval in seconds between checks
    #[clap(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// db file
    #[clap(default_value = "balances.db", short, long, value_parser)]
    db_file: String,

    /// account source
    #[clap(default_value_t = AccountSource::Sequence, short, long, value_parser)]
    source: AccountSource,

    /// accounts endpoint
    #[clap(default_value = SEQUENCE_ACCOUNTS_URL, long, value_parser)]
    api_url: String,

    /// stop after this many checks
    #[clap(long, value_parser)]
    max_cycles: Option<u64>,

    /// SMTP server address, alerts are disabled without it
    #[clap(long, value_parser)]
    smtp_server: Option<String>,

    /// SMTP port
    #[clap(default_value_t = DEFAULT_SMTP_PORT, long, value_parser)]
    smtp_port: u16,

    /// Email sender address
    #[clap(long, value_parser)]
    email_from: Option<String>,

    /// Email recipient address
    #[clap(long, value_parser)]
    email_to: Option<String>,

    /// SMTP username
    #[clap(long, value_parser)]
    smtp_user: Option<String>,

    /// SMTP password
    #[clap(long, value_parser)]
    smtp_pass: Option<String>,

    /// Enable STARTTLS for SMTP
    #[clap(long, action)]
    enable_ssl: bool,
}

fn make_requester(args: &Args) -> Result<Box<dyn Requester>, Error> {
    let value: Box<dyn Requester> = match args.source {
        AccountSource::Null => Box::new(NullRequester),
        AccountSource::Sequence => Box::new(SequenceRequester::new(&args.api_url, &args.token)?),
    };
    Ok(value)
}

fn make_smtp_settings(args: &Args) -> Result<Option<SmtpSettings>, Error> {
    let server = match args.smtp_server.as_deref() {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Ok(None),
    };
    let settings = SmtpSettings::new(
        server,
        args.smtp_port,
        args.email_from.as_deref(),
        args.email_to.as_deref(),
        args.smtp_user.as_deref(),
        args.smtp_pass.as_deref(),
        args.enable_ssl,
    )?;
    Ok(Some(settings))
}

fn make_notifier(args: &Args) -> Result<Option<Box<dyn Notifier>>, Error> {
    match make_smtp_settings(args)? {
        Some(settings) => Ok(Some(Box::new(EmailNotifier::new(settings)?))),
        None => Ok(None),
    }
}

fn main() -> Result<(), Error> {
    //
    // cli arg
    let args = Args::parse();

    //
    // logger
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    builder.init();

    info!("starting balance monitor");
    info!("source {} {}", args.source, args.api_url);
    info!("poll interval {} seconds", args.interval);

    //
    // persistence
    let persistence = SQLitePersistance::new(&args.db_file)?;
    info!("store file {}", args.db_file);

    //
    // snapshot source and alerting
    let requester = make_requester(&args)?;
    let notifier = make_notifier(&args)?;
    if notifier.is_none() {
        info!("no smtp server configured, alerts disabled");
    }

    //
    // poll
    let clock = SystemClock;
    let mut monitor = Monitor::new(
        requester,
        &persistence,
        notifier,
        &clock,
        Duration::from_secs(args.interval),
    );
    monitor.run(args.max_cycles);

    Ok(())
}
