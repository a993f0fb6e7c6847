use crate::account::{BalanceRecord, LastRecorded};
use crate::alias::{Amount, DateTime};
use crate::error::{Error, ErrorKind};
use crate::monitor::Persistance;
use chrono::SecondsFormat;
use rusqlite::{Connection, OptionalExtension, Result};
use std::str::FromStr;

struct SQLiteAmount(Amount);
impl rusqlite::types::FromSql for SQLiteAmount {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        match value {
            rusqlite::types::ValueRef::Text(txt) => {
                let str_txt = std::str::from_utf8(txt)
                    .map_err(|_| rusqlite::types::FromSqlError::InvalidType)?;
                match Amount::from_str(str_txt) {
                    Ok(value) => Ok(SQLiteAmount(value)),
                    Err(_) => Err(rusqlite::types::FromSqlError::InvalidType),
                }
            }
            _ => Err(rusqlite::types::FromSqlError::InvalidType),
        }
    }
}

struct SQLiteDateTime(DateTime);
impl rusqlite::types::FromSql for SQLiteDateTime {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        match value {
            rusqlite::types::ValueRef::Text(txt) => {
                let str_txt = std::str::from_utf8(txt)
                    .map_err(|_| rusqlite::types::FromSqlError::InvalidType)?;
                match chrono::DateTime::parse_from_rfc3339(str_txt) {
                    Ok(value) => Ok(SQLiteDateTime(value.with_timezone(&chrono::Utc))),
                    Err(_) => Err(rusqlite::types::FromSqlError::InvalidType),
                }
            }
            _ => Err(rusqlite::types::FromSqlError::InvalidType),
        }
    }
}

// fixed width so that text order is time order
fn to_sql_timestamp(value: &DateTime) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Error::new(ErrorKind::Persistance, error.to_string())
    }
}

pub struct SQLitePersistance {
    connection: Connection,
}

impl SQLitePersistance {
    pub fn new(file: &str) -> Result<Self, Error> {
        let connection = Connection::open(file)?;
        let instance = Self { connection };
        instance.setup()?;
        Ok(instance)
    }

    pub fn in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;
        let instance = Self { connection };
        instance.setup()?;
        Ok(instance)
    }

    fn setup(&self) -> Result<(), Error> {
        self.connection.execute(
          "CREATE TABLE IF NOT EXISTS Balances (sequence_id TEXT NOT NULL, name TEXT, balance TEXT, type TEXT, error TEXT, last_update TEXT NOT NULL)",
          (),
        )?;
        self.connection.execute(
            "CREATE INDEX IF NOT EXISTS BalancesBySequenceId ON Balances (sequence_id, last_update)",
            (),
        )?;
        Ok(())
    }

    /// Every record of an account, in append order.
    pub fn records(&self, account_id: &str) -> Result<Vec<BalanceRecord>, Error> {
        let mut stmt = self.connection.prepare(
            "SELECT sequence_id, name, balance, type, error, last_update FROM Balances WHERE sequence_id = ? ORDER BY rowid",
        )?;

        let rows = stmt.query_map((account_id,), |row| {
            Ok(BalanceRecord {
                account_id: row.get(0)?,
                name: row.get::<usize, Option<String>>(1)?.unwrap_or_default(),
                amount: row.get::<usize, Option<SQLiteAmount>>(2)?.map(|value| value.0),
                kind: row.get::<usize, Option<String>>(3)?.unwrap_or_default(),
                error: row.get(4)?,
                recorded_at: row.get::<usize, SQLiteDateTime>(5)?.0,
            })
        })?;

        let mut records = Vec::new();
        for item in rows {
            records.push(item?);
        }
        Ok(records)
    }
}

impl Persistance for SQLitePersistance {
    // append-only, so the newest row wins even if the wall clock went back
    fn last_recorded(&self, account_id: &str) -> Result<Option<LastRecorded>, Error> {
        let value = self
            .connection
            .query_row(
                "SELECT balance, last_update FROM Balances WHERE sequence_id = ? ORDER BY rowid DESC LIMIT 1",
                (account_id,),
                |row| {
                    Ok(LastRecorded {
                        amount: row.get::<usize, Option<SQLiteAmount>>(0)?.map(|value| value.0),
                        recorded_at: row.get::<usize, SQLiteDateTime>(1)?.0,
                    })
                },
            )
            .optional()?;
        Ok(value)
    }

    fn append(&self, record: &BalanceRecord) -> Result<(), Error> {
        self.connection.execute(
            "INSERT INTO Balances (sequence_id, name, balance, type, error, last_update) VALUES(?, ?, ?, ?, ?, ?)",
            (
                &record.account_id,
                &record.name,
                record.amount.map(|amount| amount.to_string()),
                &record.kind,
                &record.error,
                to_sql_timestamp(&record.recorded_at),
            ),
        )?;
        Ok(())
    }
}
