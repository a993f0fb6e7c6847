use crate::alias::{Amount, DateTime};

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    pub account_id: String,
    pub name: String,
    pub amount: Option<Amount>,
    pub kind: String,
    pub error: Option<String>,
    pub recorded_at: DateTime,
}

/// Amount and timestamp of the newest record of an account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastRecorded {
    pub amount: Option<Amount>,
    pub recorded_at: DateTime,
}

/// A record waiting for its timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub account_id: String,
    pub name: String,
    pub amount: Option<Amount>,
    pub kind: String,
    pub error: Option<String>,
}

impl PendingRecord {
    #[inline]
    pub fn recorded_at(self, recorded_at: DateTime) -> BalanceRecord {
        BalanceRecord {
            account_id: self.account_id,
            name: self.name,
            amount: self.amount,
            kind: self.kind,
            error: self.error,
            recorded_at,
        }
    }
}
