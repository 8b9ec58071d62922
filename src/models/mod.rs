pub mod booking;
pub mod experience;
pub mod promo;
pub mod slot;

pub use booking::{Booking, BookingRequest, BookingStatus};
pub use experience::Experience;
pub use promo::{DiscountType, PromoCode};
pub use slot::Slot;
