use super::Requester;
use crate::account::{AccountSnapshot, Balance};
use crate::alias::Amount;
use crate::error::{Error, ErrorKind};

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

pub const SEQUENCE_ACCOUNTS_URL: &str = "https://api.getsequence.io/accounts";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SequenceResponse {
    message: Option<String>,
    request_id: Option<String>,
    data: Option<SequenceData>,
}

#[derive(Debug, Deserialize)]
struct SequenceData {
    accounts: Option<Vec<SequenceAccount>>,
}

#[derive(Debug, Deserialize)]
struct SequenceAccount {
    id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    balance: Option<SequenceBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SequenceBalance {
    amount_in_dollars: Option<Amount>,
    error: Option<String>,
}

impl From<SequenceAccount> for AccountSnapshot {
    fn from(account: SequenceAccount) -> Self {
        let (balance, error) = match account.balance {
            Some(SequenceBalance {
                amount_in_dollars: Some(amount),
                error,
            }) => (Balance::Amount(amount), error),
            Some(SequenceBalance {
                error: Some(error), ..
            }) => (Balance::Error(error), None),
            _ => (Balance::Error("no balance reported".to_string()), None),
        };
        Self {
            id: account.id,
            name: account.name.unwrap_or_default(),
            kind: account.kind.unwrap_or_default(),
            balance,
            error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::new(ErrorKind::Fetch, format!("malformed accounts response: {error}"))
    }
}

pub fn parse_accounts(body: &str) -> Result<Vec<AccountSnapshot>, Error> {
    let response: SequenceResponse = serde_json::from_str(body)?;
    debug!(
        "accounts response request_id:{} message:{}",
        response.request_id.as_deref().unwrap_or("-"),
        response.message.as_deref().unwrap_or("-")
    );
    let accounts = response
        .data
        .and_then(|data| data.accounts)
        .unwrap_or_default();
    Ok(accounts.into_iter().map(AccountSnapshot::from).collect())
}

pub struct SequenceRequester {
    reqwest_client: Client,
    url: String,
}

impl SequenceRequester {
    pub fn new(url: &str, token: &str) -> Result<Self, Error> {
        let mut token_value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|error| Error::new_config(format!("invalid access token : {error}")))?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-sequence-access-token", token_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|error| Error::new_config(format!("failed to init reqwest : {error}")))?;

        Ok(Self {
            reqwest_client: client,
            url: url.to_string(),
        })
    }
}

impl Requester for SequenceRequester {
    fn request(&self) -> Result<Vec<AccountSnapshot>, Error> {
        debug!("request accounts from url {}", self.url);
        let response = self
            .reqwest_client
            .post(&self.url)
            .body("{}")
            .send()
            .map_err(|error| Error::new_fetch(format!("failed to request accounts error:{error}")))?;

        let status = response.status();
        let output = response.text().map_err(|error| {
            Error::new_fetch(format!(
                "failed to read body from accounts request error:{error}"
            ))
        })?;
        if !status.is_success() {
            return Err(Error::new_fetch(format!(
                "accounts api error status:{status} body:{output}"
            )));
        }
        debug!("request result: {}", output);

        let accounts = parse_accounts(&output)?;
        info!("request accounts done, nb_account:{}", accounts.len());
        Ok(accounts)
    }
}
