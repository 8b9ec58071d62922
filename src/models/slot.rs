use serde::{Deserialize, Serialize};

/// A date/time instance of an experience with finite seats. `date` and
/// `time` are display keys, never parsed as datetimes. `available_seats`
/// is the one mutable counter in the system and only changes inside a
/// booking transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    pub experience_id: i64,
    pub date: String,
    pub time: String,
    pub available_seats: i64,
    pub total_seats: i64,
}
