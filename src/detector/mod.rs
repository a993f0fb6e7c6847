//! Decides, for one observed account, whether its balance is worth recording.
//!
//! The detector is a pure function of the snapshot and the last recorded
//! amount. It never reads or writes the store and never notifies: the
//! caller stamps and persists the returned record.

use crate::account::{AccountSnapshot, Balance, PendingRecord};
use crate::alias::Amount;
use rust_decimal::RoundingStrategy;

mod money;
pub use money::*;

pub const CANONICAL_SCALE: u32 = 2;

/// Rounds to cents, half away from zero. Every comparison goes through here.
#[inline]
pub fn canonicalize(amount: Amount) -> Amount {
    amount.round_dp_with_strategy(CANONICAL_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    NewAccount,
    BalanceChanged,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::NewAccount => "new account discovered".fmt(f),
            Reason::BalanceChanged => "balance changed".fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Insert {
        record: PendingRecord,
        reason: Reason,
        description: String,
    },
    NoOp,
}

pub fn evaluate(snapshot: &AccountSnapshot, last_recorded: Option<Amount>) -> Decision {
    let current = match &snapshot.balance {
        Balance::Amount(value) => canonicalize(*value),
        Balance::Error(_) => return Decision::NoOp,
    };

    match last_recorded.map(canonicalize) {
        None => Decision::Insert {
            record: make_record_(snapshot, current),
            reason: Reason::NewAccount,
            description: format!(
                "New Account Tracked: {} - Balance: {}",
                snapshot.name,
                format_money(current)
            ),
        },
        Some(last) if last != current => Decision::Insert {
            record: make_record_(snapshot, current),
            reason: Reason::BalanceChanged,
            description: format!(
                "Balance Changed: {}. Old: {}, New: {}",
                snapshot.name,
                format_money(last),
                format_money(current)
            ),
        },
        Some(_) => Decision::NoOp,
    }
}

fn make_record_(snapshot: &AccountSnapshot, amount: Amount) -> PendingRecord {
    PendingRecord {
        account_id: snapshot.id.clone(),
        name: snapshot.name.clone(),
        amount: Some(amount),
        kind: snapshot.kind.clone(),
        error: snapshot.error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn canonicalize_01() {
        assert_eq!(canonicalize(dec!(100.004)), dec!(100.00));
        assert_eq!(canonicalize(dec!(150.005)), dec!(150.01));
        assert_eq!(canonicalize(dec!(99.995)), dec!(100.00));
        assert_eq!(canonicalize(dec!(-2.345)), dec!(-2.35));
        assert_eq!(canonicalize(dec!(-2.344)), dec!(-2.34));
        assert_eq!(canonicalize(dec!(7)), dec!(7.00));
    }

    #[test]
    fn evaluate_new_account() {
        let snapshot = make_snapshot_("acc-1", dec!(100.004));
        let decision = evaluate(&snapshot, None);
        match decision {
            Decision::Insert {
                record,
                reason,
                description,
            } => {
                assert_eq!(reason, Reason::NewAccount);
                assert_eq!(reason.to_string(), "new account discovered");
                assert_eq!(record.account_id, "acc-1");
                assert_eq!(record.name, "Checking acc-1");
                assert_eq!(record.kind, "Account");
                assert_eq!(record.amount, Some(dec!(100.00)));
                assert!(record.error.is_none());
                assert!(description.contains("New Account Tracked"));
                assert!(description.contains("Checking acc-1"));
                assert!(description.contains("100.00"));
            }
            Decision::NoOp => panic!("expected insert"),
        }
    }

    #[test]
    fn evaluate_unchanged() {
        let snapshot = make_snapshot_("acc-1", dec!(100.00));
        assert_eq!(evaluate(&snapshot, Some(dec!(100.00))), Decision::NoOp);

        // scale differences are not changes
        assert_eq!(evaluate(&snapshot, Some(dec!(100))), Decision::NoOp);
        assert_eq!(evaluate(&snapshot, Some(dec!(100.0))), Decision::NoOp);
    }

    #[test]
    fn evaluate_same_canonical_value() {
        for cent in cents_() {
            let values = same_cent_values_(cent);
            assert_eq!(values.len(), 11);
            for current in values.iter() {
                assert_eq!(canonicalize(*current), cent, "{}", current);
                let snapshot = make_snapshot_("acc-1", *current);
                for recorded in values.iter() {
                    assert_eq!(
                        evaluate(&snapshot, Some(canonicalize(*recorded))),
                        Decision::NoOp,
                        "{} vs {}",
                        current,
                        recorded
                    );
                }
            }
        }
    }

    #[test]
    fn evaluate_ties_round_away_from_zero() {
        for cent in cents_() {
            let half = if cent.is_sign_negative() {
                dec!(-0.005)
            } else {
                dec!(0.005)
            };
            let tie = cent + half;
            assert_eq!(canonicalize(tie), cent + half + half, "{}", tie);

            let snapshot = make_snapshot_("acc-1", tie);
            assert!(
                matches!(
                    evaluate(&snapshot, Some(cent)),
                    Decision::Insert {
                        reason: Reason::BalanceChanged,
                        ..
                    }
                ),
                "{} vs {}",
                tie,
                cent
            );
        }
    }

    #[test]
    fn evaluate_changed() {
        let snapshot = make_snapshot_("acc-1", dec!(150.005));
        let decision = evaluate(&snapshot, Some(dec!(100.00)));
        match decision {
            Decision::Insert {
                record,
                reason,
                description,
            } => {
                assert_eq!(reason, Reason::BalanceChanged);
                assert_eq!(record.amount, Some(dec!(150.01)));
                assert_eq!(
                    description,
                    "Balance Changed: Checking acc-1. Old: $100.00, New: $150.01"
                );
            }
            Decision::NoOp => panic!("expected insert"),
        }
    }

    #[test]
    fn evaluate_one_cent_change() {
        let snapshot = make_snapshot_("acc-1", dec!(100.005));
        let decision = evaluate(&snapshot, Some(dec!(100.00)));
        assert!(matches!(
            decision,
            Decision::Insert {
                reason: Reason::BalanceChanged,
                ..
            }
        ));
    }

    #[test]
    fn evaluate_keeps_error_label() {
        let snapshot = make_snapshot_("acc-1", dec!(12.34)).with_error("stale balance");
        match evaluate(&snapshot, None) {
            Decision::Insert { record, .. } => {
                assert_eq!(record.amount, Some(dec!(12.34)));
                assert_eq!(record.error.as_deref(), Some("stale balance"));
            }
            Decision::NoOp => panic!("expected insert"),
        }

        // a label alone is not a change
        assert_eq!(evaluate(&snapshot, Some(dec!(12.34))), Decision::NoOp);
    }

    #[test]
    fn evaluate_error_snapshot() {
        let snapshot = AccountSnapshot::new(
            "acc-2",
            "Savings",
            "Account",
            Balance::Error("institution unavailable".to_string()),
        );
        assert_eq!(evaluate(&snapshot, None), Decision::NoOp);
        assert_eq!(evaluate(&snapshot, Some(dec!(12.00))), Decision::NoOp);
    }

    fn cents_() -> Vec<Amount> {
        vec![
            dec!(0.01),
            dec!(1.23),
            dec!(99.99),
            dec!(100.00),
            dec!(-0.01),
            dec!(-5.12),
            dec!(-100.00),
        ]
    }

    // every 3 digit value rounding to `cent`, plus the 4 digit value just short of the next tie
    fn same_cent_values_(cent: Amount) -> Vec<Amount> {
        let (low, high, last): (i64, i64, Amount) = if cent.is_sign_negative() {
            (-4, 5, dec!(-0.0049))
        } else {
            (-5, 4, dec!(0.0049))
        };
        let mut values: Vec<Amount> = (low..=high)
            .map(|thousandths| cent + Amount::new(thousandths, 3))
            .collect();
        values.push(cent + last);
        values
    }

    fn make_snapshot_(id: &str, amount: Amount) -> AccountSnapshot {
        AccountSnapshot::new(
            id.to_string(),
            format!("Checking {id}"),
            "Account".to_string(),
            Balance::Amount(amount),
        )
    }
}
