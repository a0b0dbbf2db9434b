/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Row counts and page arithmetic use signed 64-bit integers, matching the
/// backend's `BIGINT` totals.
pub type Count = i64;
