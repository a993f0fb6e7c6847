use crate::alias::Amount;

/// Observed balance of an account, either an amount or the provider's error label.
#[derive(Debug, Clone, PartialEq)]
pub enum Balance {
    Amount(Amount),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub balance: Balance,
    /// Error label the provider reported next to an amount.
    pub error: Option<String>,
}

impl AccountSnapshot {
    pub fn new<T: Into<String>>(id: T, name: T, kind: T, balance: Balance) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            balance,
            error: None,
        }
    }

    pub fn with_error<T: Into<String>>(mut self, error: T) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn amount(&self) -> Option<Amount> {
        match &self.balance {
            Balance::Amount(value) => Some(*value),
            Balance::Error(_) => None,
        }
    }
}
