use serde::{Deserialize, Serialize};

/// A confirmed booking. Created exactly once, atomically with the slot
/// seat decrement. The pricing fields are a snapshot frozen at creation
/// and are never recomputed from live experience or promo state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub reference_id: String,
    pub experience_id: i64,
    pub slot_id: i64,
    pub full_name: String,
    pub email: String,
    pub quantity: i64,
    pub promo_code: Option<String>,
    pub discount: i64,
    pub subtotal: i64,
    pub taxes: i64,
    pub total: i64,
    pub status: BookingStatus,
    pub booking_date: String,
}

/// Bookings have no lifecycle beyond confirmation; cancellation does not
/// exist in this system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
        }
    }
}

/// Wire shape of a booking creation request. Fields are optional so that
/// missing ones surface as a 400 from presence validation rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingRequest {
    pub experience_id: Option<i64>,
    pub slot_id: Option<i64>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub quantity: Option<i64>,
    pub promo_code: Option<String>,
}
