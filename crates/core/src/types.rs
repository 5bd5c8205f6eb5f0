/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (policy start/expiry/renewal) carry no time or zone.
pub type CalendarDate = chrono::NaiveDate;
