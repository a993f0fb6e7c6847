//! Fixed-interval polling loop: fetch, detect per account, persist, notify, sleep.
//!
//! Nothing survives between cycles except what the store holds. The last
//! recorded amount of every account is read back from the store each time,
//! so a restart, or a cycle that failed half way, is picked up on the next
//! tick without special handling.

use crate::account::{AccountSnapshot, Balance, BalanceRecord, LastRecorded};
use crate::alias::{Amount, DateTime};
use crate::detector::{Decision, evaluate};
use crate::error::Error;
use crate::notifier::Notifier;
use crate::source::Requester;

use log::{debug, error, info, warn};
use std::time::Duration;

mod clock;
pub use clock::*;

/// Minimal store contract used by the loop. Records are only ever appended.
pub trait Persistance {
    /// Newest record of the account, by append order.
    fn last_recorded(&self, account_id: &str) -> Result<Option<LastRecorded>, Error>;
    fn append(&self, record: &BalanceRecord) -> Result<(), Error>;

    fn last_amount(&self, account_id: &str) -> Result<Option<Amount>, Error> {
        Ok(self.last_recorded(account_id)?.and_then(|last| last.amount))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Fetching,
    Processing,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    pub accounts: usize,
    pub inserted: usize,
    pub failed: usize,
    pub messages: Vec<String>,
    pub notified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    FetchFailed,
    Completed(CycleReport),
}

pub struct Monitor<'a, P, C>
where
    P: Persistance,
    C: Clock,
{
    requester: Box<dyn Requester>,
    persistence: &'a P,
    notifier: Option<Box<dyn Notifier>>,
    clock: &'a C,
    interval: Duration,
    state: CycleState,
}

impl<'a, P, C> Monitor<'a, P, C>
where
    P: Persistance,
    C: Clock,
{
    pub fn new(
        requester: Box<dyn Requester>,
        persistence: &'a P,
        notifier: Option<Box<dyn Notifier>>,
        clock: &'a C,
        interval: Duration,
    ) -> Self {
        Self {
            requester,
            persistence,
            notifier,
            clock,
            interval,
            state: CycleState::Idle,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Runs cycles back to back, sleeping `interval` between them. With
    /// `max_cycles` the loop returns after that many cycles, without a
    /// trailing sleep; otherwise it only ends with the process.
    pub fn run(&mut self, max_cycles: Option<u64>) {
        info!(
            "monitor started, interval:{}s max_cycles:{}",
            self.interval.as_secs(),
            max_cycles.map_or_else(|| "unbounded".to_string(), |value| value.to_string())
        );
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            debug!("cycle {} begin", cycle);
            match self.run_cycle() {
                CycleOutcome::FetchFailed => info!("cycle {} skipped", cycle),
                CycleOutcome::Completed(report) => info!(
                    "cycle {} done nb_account:{} nb_change:{} nb_failed:{} notified:{}",
                    cycle, report.accounts, report.inserted, report.failed, report.notified
                ),
            }

            if max_cycles.is_some_and(|max| cycle >= max) {
                info!("monitor stopped after {} cycles", cycle);
                break;
            }
            self.clock.sleep(self.interval);
        }
    }

    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.state = CycleState::Fetching;
        let snapshots = match self.requester.request() {
            Ok(value) => value,
            Err(err) => {
                error!("polling accounts failed: {}", err);
                self.state = CycleState::Idle;
                return CycleOutcome::FetchFailed;
            }
        };

        self.state = CycleState::Processing;
        let mut report = CycleReport {
            accounts: snapshots.len(),
            ..Default::default()
        };
        for snapshot in snapshots.iter() {
            match self.process_account(snapshot) {
                Ok(Some(description)) => {
                    report.inserted += 1;
                    report.messages.push(description);
                }
                Ok(None) => {}
                Err(err) => {
                    error!(
                        "account {} ({}) deferred to next cycle: {}",
                        snapshot.name, snapshot.id, err
                    );
                    report.failed += 1;
                }
            }
        }

        if !report.messages.is_empty() {
            if let Some(notifier) = &self.notifier {
                match notifier.send(&report.messages) {
                    Ok(()) => report.notified = true,
                    Err(err) => error!("failed to send alert: {}", err),
                }
            }
        }

        self.state = CycleState::Idle;
        CycleOutcome::Completed(report)
    }

    fn process_account(&self, snapshot: &AccountSnapshot) -> Result<Option<String>, Error> {
        if let Balance::Error(label) = &snapshot.balance {
            warn!(
                "balance unavailable for {} ({}): {}",
                snapshot.name, snapshot.id, label
            );
            return Ok(None);
        }

        let last = self.persistence.last_recorded(&snapshot.id)?;
        match evaluate(snapshot, last.and_then(|value| value.amount)) {
            Decision::NoOp => {
                debug!("no change for {} ({})", snapshot.name, snapshot.id);
                Ok(None)
            }
            Decision::Insert {
                record,
                reason,
                description,
            } => {
                let record = record.recorded_at(self.stamp(snapshot, last));
                self.persistence.append(&record)?;
                info!("{} [{}]", description, reason);
                debug!("record inserted for {}", snapshot.name);
                Ok(Some(description))
            }
        }
    }

    // never older than the account's previous record
    fn stamp(&self, snapshot: &AccountSnapshot, last: Option<LastRecorded>) -> DateTime {
        let now = self.clock.now();
        match last {
            Some(value) if value.recorded_at > now => {
                warn!(
                    "clock is behind the last record of {} ({}), {} < {}",
                    snapshot.name, snapshot.id, now, value.recorded_at
                );
                value.recorded_at
            }
            _ => now,
        }
    }
}
