pub type DateTime = chrono::DateTime<chrono::Utc>;
pub type Amount = rust_decimal::Decimal;
