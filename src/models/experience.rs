use serde::{Deserialize, Serialize};

/// A bookable activity. Read-only from the booking path; rows are seeded
/// out of band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub image_url: String,
    pub about: Option<String>,
}
