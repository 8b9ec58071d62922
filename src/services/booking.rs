use anyhow::anyhow;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries::{self, NewBooking};
use crate::errors::AppError;
use crate::models::{Booking, BookingRequest};
use crate::services::{pricing, reference};

/// Insert attempts before giving up on allocating a unique booking
/// reference. With ~62 bits of reference entropy a second attempt is
/// already vanishingly rare.
const REFERENCE_INSERT_ATTEMPTS: u32 = 3;

/// Runs the whole booking unit of work: lock, validate, price, reserve,
/// persist, commit. Everything after the transaction opens either commits
/// together or rolls back together; no intermediate state is visible to
/// other callers.
pub fn create_booking(conn: &mut Connection, req: &BookingRequest) -> Result<Booking, AppError> {
    create_booking_with(conn, req, &mut reference::generate)
}

/// Same unit of work with an injectable reference source, so tests can
/// force reference collisions and insert failures.
pub fn create_booking_with(
    conn: &mut Connection,
    req: &BookingRequest,
    next_reference: &mut dyn FnMut() -> String,
) -> Result<Booking, AppError> {
    // Fail fast on malformed input; no transaction is opened and no side
    // effects occur.
    let draft = validate(req)?;

    // The immediate transaction takes the store's write lock at BEGIN, so
    // concurrent reservations against the same slot serialize here instead
    // of both acting on a stale read of available_seats. Dropping the
    // transaction on any error path below rolls everything back.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let slot = queries::get_slot(&tx, draft.slot_id)?
        .ok_or_else(|| AppError::NotFound(format!("slot {}", draft.slot_id)))?;

    if slot.available_seats < draft.quantity {
        return Err(AppError::InsufficientSeats {
            requested: draft.quantity,
            available: slot.available_seats,
        });
    }

    // A valid slot always references a valid experience; absence here is a
    // data inconsistency, not a client error.
    let unit_price = queries::get_experience_price(&tx, draft.experience_id)?.ok_or_else(|| {
        AppError::Internal(anyhow!(
            "experience {} missing for slot {}",
            draft.experience_id,
            slot.id
        ))
    })?;

    // An unknown or inactive promo code never fails a booking; it just
    // contributes no discount. Only /api/promo/validate reports bad codes.
    let promo = match &draft.promo_code {
        Some(code) => {
            let found = queries::find_active_promo(&tx, code)?;
            if found.is_none() {
                tracing::debug!(code = %code, "promo code not applicable, continuing without discount");
            }
            found
        }
        None => None,
    };

    let quote = pricing::quote(unit_price, draft.quantity, promo.as_ref());

    if !queries::take_slot_seats(&tx, draft.slot_id, draft.quantity)? {
        // Unreachable while the availability check above runs under the
        // same lock.
        return Err(AppError::InsufficientSeats {
            requested: draft.quantity,
            available: slot.available_seats,
        });
    }

    let applied_code = promo.as_ref().map(|p| p.code.as_str());

    let mut booking_id = None;
    for attempt in 1..=REFERENCE_INSERT_ATTEMPTS {
        let reference_id = next_reference();
        let new_booking = NewBooking {
            reference_id: &reference_id,
            experience_id: draft.experience_id,
            slot_id: draft.slot_id,
            full_name: &draft.full_name,
            email: &draft.email,
            quantity: draft.quantity,
            promo_code: applied_code,
            discount: quote.discount,
            subtotal: quote.subtotal,
            taxes: quote.taxes,
            total: quote.total,
        };

        match queries::insert_booking(&tx, &new_booking) {
            Ok(id) => {
                booking_id = Some(id);
                break;
            }
            Err(e) if is_reference_conflict(&e) => {
                tracing::warn!(reference = %reference_id, attempt, "booking reference collided, regenerating");
            }
            Err(e) => return Err(AppError::Internal(e)),
        }
    }
    let booking_id = booking_id
        .ok_or_else(|| AppError::Internal(anyhow!("could not allocate a unique booking reference")))?;

    let booking = queries::get_booking(&tx, booking_id)?
        .ok_or_else(|| AppError::Internal(anyhow!("booking {booking_id} vanished before commit")))?;

    tx.commit()?;

    tracing::info!(
        reference = %booking.reference_id,
        slot = booking.slot_id,
        quantity = booking.quantity,
        total = booking.total,
        "booking confirmed"
    );

    Ok(booking)
}

struct Draft {
    experience_id: i64,
    slot_id: i64,
    full_name: String,
    email: String,
    quantity: i64,
    promo_code: Option<String>,
}

fn validate(req: &BookingRequest) -> Result<Draft, AppError> {
    let experience_id = req.experience_id.filter(|id| *id > 0);
    let slot_id = req.slot_id.filter(|id| *id > 0);
    let full_name = req
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let email = req.email.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let (Some(experience_id), Some(slot_id), Some(full_name), Some(email)) =
        (experience_id, slot_id, full_name, email)
    else {
        return Err(AppError::Validation("missing required fields".to_string()));
    };

    let quantity = req.quantity.unwrap_or(0);
    if quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    let promo_code = req
        .promo_code
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(Draft {
        experience_id,
        slot_id,
        full_name: full_name.to_string(),
        email: email.to_string(),
        quantity,
        promo_code,
    })
}

fn is_reference_conflict(e: &anyhow::Error) -> bool {
    match e.downcast_ref::<rusqlite::Error>() {
        Some(rusqlite::Error::SqliteFailure(err, Some(msg))) => {
            err.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("reference_id")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::params;

    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        conn.execute_batch(
            "INSERT INTO experiences (id, title, description, location, price, image_url, about)
             VALUES (1, 'Kayaking', 'Backwater paddling.', 'Udupi', 999, 'https://example.com/k.jpg', 'Gear included.');

             INSERT INTO slots (id, experience_id, date, time, available_seats, total_seats)
             VALUES (10, 1, '2099-01-01', '07:00 am', 4, 10),
                    (11, 1, '2099-01-01', '09:00 am', 1, 10);

             INSERT INTO promo_codes (code, discount_type, discount_value, is_active)
             VALUES ('SAVE10', 'percentage', 10.0, 1),
                    ('FLAT100', 'flat', 100.0, 1),
                    ('EXPIRED', 'percentage', 50.0, 0);",
        )
        .unwrap();
        conn
    }

    fn request(slot_id: i64, quantity: i64, promo_code: Option<&str>) -> BookingRequest {
        BookingRequest {
            experience_id: Some(1),
            slot_id: Some(slot_id),
            full_name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            quantity: Some(quantity),
            promo_code: promo_code.map(str::to_string),
        }
    }

    fn seats(conn: &Connection, slot_id: i64) -> i64 {
        conn.query_row(
            "SELECT available_seats FROM slots WHERE id = ?1",
            params![slot_id],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_booking_succeeds_and_decrements_seats() {
        let mut conn = setup_db();

        let booking = create_booking(&mut conn, &request(10, 2, None)).unwrap();

        assert_eq!(booking.reference_id.len(), 12);
        assert_eq!(booking.quantity, 2);
        assert_eq!(booking.subtotal, 1998);
        assert_eq!(booking.discount, 0);
        assert_eq!(booking.taxes, 120); // round(1998 * 0.06)
        assert_eq!(booking.total, 2118);
        assert_eq!(booking.promo_code, None);
        assert_eq!(booking.status.as_str(), "confirmed");
        assert_eq!(seats(&conn, 10), 2);
    }

    #[test]
    fn test_slot_not_found() {
        let mut conn = setup_db();

        let err = create_booking(&mut conn, &request(999, 1, None)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_insufficient_seats_leaves_inventory_untouched() {
        let mut conn = setup_db();

        let err = create_booking(&mut conn, &request(11, 2, None)).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientSeats {
                requested: 2,
                available: 1
            }
        ));
        assert_eq!(seats(&conn, 11), 1);
    }

    #[test]
    fn test_unknown_promo_is_silently_ignored() {
        let mut conn = setup_db();

        let booking = create_booking(&mut conn, &request(10, 1, Some("NOPE"))).unwrap();
        assert_eq!(booking.discount, 0);
        assert_eq!(booking.promo_code, None);
        assert_eq!(booking.total, 1058); // 999 + round(999 * 0.06)
    }

    #[test]
    fn test_inactive_promo_is_silently_ignored() {
        let mut conn = setup_db();

        let booking = create_booking(&mut conn, &request(10, 1, Some("EXPIRED"))).unwrap();
        assert_eq!(booking.discount, 0);
        assert_eq!(booking.promo_code, None);
    }

    #[test]
    fn test_promo_code_is_case_insensitive() {
        let mut conn = setup_db();

        let booking = create_booking(&mut conn, &request(10, 1, Some("save10"))).unwrap();
        assert_eq!(booking.promo_code, Some("SAVE10".to_string()));
        assert_eq!(booking.discount, 100); // round(99.9)
        assert_eq!(booking.subtotal, 999);
        assert_eq!(booking.taxes, 54); // round(899 * 0.06)
        assert_eq!(booking.total, 953);
    }

    #[test]
    fn test_flat_promo_applied() {
        let mut conn = setup_db();

        let booking = create_booking(&mut conn, &request(10, 2, Some("FLAT100"))).unwrap();
        assert_eq!(booking.subtotal, 1998);
        assert_eq!(booking.discount, 100);
        assert_eq!(booking.taxes, 114); // round(1898 * 0.06)
        assert_eq!(booking.total, 2012);
    }

    #[test]
    fn test_missing_fields_rejected_before_any_side_effect() {
        let mut conn = setup_db();

        let req = BookingRequest {
            full_name: Some("Asha Rao".to_string()),
            ..Default::default()
        };
        let err = create_booking(&mut conn, &req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(seats(&conn, 10), 4);
    }

    #[test]
    fn test_blank_name_counts_as_missing() {
        let mut conn = setup_db();

        let mut req = request(10, 1, None);
        req.full_name = Some("   ".to_string());
        let err = create_booking(&mut conn, &req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut conn = setup_db();

        let err = create_booking(&mut conn, &request(10, 0, None)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(seats(&conn, 10), 4);
    }

    #[test]
    fn test_reference_collision_retries_and_succeeds() {
        let mut conn = setup_db();

        // Occupy a reference, then hand the coordinator that same value
        // first and a fresh one second.
        create_booking_with(&mut conn, &request(10, 1, None), &mut || {
            "TAKEN0000000".to_string()
        })
        .unwrap();

        let mut attempts = 0;
        let booking = create_booking_with(&mut conn, &request(10, 1, None), &mut || {
            attempts += 1;
            if attempts == 1 {
                "TAKEN0000000".to_string()
            } else {
                "FRESH0000000".to_string()
            }
        })
        .unwrap();

        assert_eq!(attempts, 2);
        assert_eq!(booking.reference_id, "FRESH0000000");
        assert_eq!(seats(&conn, 10), 2);
    }

    #[test]
    fn test_insert_failure_rolls_back_seat_reservation() {
        let mut conn = setup_db();

        create_booking_with(&mut conn, &request(10, 1, None), &mut || {
            "TAKEN0000000".to_string()
        })
        .unwrap();
        assert_eq!(seats(&conn, 10), 3);

        // Every attempt collides, so the insert ultimately fails; the seat
        // decrement must be rolled back with it.
        let err = create_booking_with(&mut conn, &request(10, 1, None), &mut || {
            "TAKEN0000000".to_string()
        })
        .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(seats(&conn, 10), 3);
    }

    #[test]
    fn test_sequential_bookings_drain_slot_exactly() {
        let mut conn = setup_db();

        // 4 seats: two singles and a double succeed, the next single fails.
        create_booking(&mut conn, &request(10, 1, None)).unwrap();
        create_booking(&mut conn, &request(10, 2, None)).unwrap();
        create_booking(&mut conn, &request(10, 1, None)).unwrap();

        let err = create_booking(&mut conn, &request(10, 1, None)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientSeats { .. }));
        assert_eq!(seats(&conn, 10), 0);
    }
}
