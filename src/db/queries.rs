use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, DiscountType, Experience, PromoCode, Slot};

// ── Experiences ──

pub fn list_experiences(
    conn: &Connection,
    search: Option<&str>,
) -> anyhow::Result<Vec<Experience>> {
    let mut experiences = vec![];

    match search {
        Some(term) => {
            let pattern = format!("%{term}%");
            let mut stmt = conn.prepare(
                "SELECT id, title, description, location, price, image_url, about
                 FROM experiences
                 WHERE title LIKE ?1 OR location LIKE ?1 OR description LIKE ?1
                 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![pattern], parse_experience_row)?;
            for row in rows {
                experiences.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, location, price, image_url, about
                 FROM experiences ORDER BY id",
            )?;
            let rows = stmt.query_map([], parse_experience_row)?;
            for row in rows {
                experiences.push(row?);
            }
        }
    }

    Ok(experiences)
}

pub fn get_experience(conn: &Connection, id: i64) -> anyhow::Result<Option<Experience>> {
    let result = conn.query_row(
        "SELECT id, title, description, location, price, image_url, about
         FROM experiences WHERE id = ?1",
        params![id],
        parse_experience_row,
    );

    match result {
        Ok(experience) => Ok(Some(experience)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_experience_price(conn: &Connection, id: i64) -> anyhow::Result<Option<i64>> {
    let result = conn.query_row(
        "SELECT price FROM experiences WHERE id = ?1",
        params![id],
        |row| row.get(0),
    );

    match result {
        Ok(price) => Ok(Some(price)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_experience_row(row: &rusqlite::Row) -> rusqlite::Result<Experience> {
    Ok(Experience {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        price: row.get(4)?,
        image_url: row.get(5)?,
        about: row.get(6)?,
    })
}

// ── Slots ──

pub fn get_upcoming_slots(conn: &Connection, experience_id: i64) -> anyhow::Result<Vec<Slot>> {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT id, experience_id, date, time, available_seats, total_seats
         FROM slots
         WHERE experience_id = ?1 AND date >= ?2
         ORDER BY date, time",
    )?;

    let rows = stmt.query_map(params![experience_id, today], parse_slot_row)?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row?);
    }
    Ok(slots)
}

/// Reads the slot inside the caller's unit of work. With an immediate
/// transaction the store's write lock is already held, so the returned
/// seat count cannot go stale before the decrement.
pub fn get_slot(conn: &Connection, id: i64) -> anyhow::Result<Option<Slot>> {
    let result = conn.query_row(
        "SELECT id, experience_id, date, time, available_seats, total_seats
         FROM slots WHERE id = ?1",
        params![id],
        parse_slot_row,
    );

    match result {
        Ok(slot) => Ok(Some(slot)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Decrements `available_seats`, guarded so the counter can never go
/// negative even if the caller's availability check is bypassed. Returns
/// false when the slot is missing or short on seats.
pub fn take_slot_seats(conn: &Connection, id: i64, quantity: i64) -> anyhow::Result<bool> {
    let updated = conn.execute(
        "UPDATE slots SET available_seats = available_seats - ?1
         WHERE id = ?2 AND available_seats >= ?1",
        params![quantity, id],
    )?;
    Ok(updated > 0)
}

fn parse_slot_row(row: &rusqlite::Row) -> rusqlite::Result<Slot> {
    Ok(Slot {
        id: row.get(0)?,
        experience_id: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        available_seats: row.get(4)?,
        total_seats: row.get(5)?,
    })
}

// ── Promo Codes ──

/// Case-insensitive lookup: codes are stored upper-case and the input is
/// upper-cased before matching. A missing row and an inactive row collapse
/// into the same `None`.
pub fn find_active_promo(conn: &Connection, code: &str) -> anyhow::Result<Option<PromoCode>> {
    let normalized = code.trim().to_uppercase();

    let result = conn.query_row(
        "SELECT code, discount_type, discount_value, is_active
         FROM promo_codes WHERE code = ?1 AND is_active = 1",
        params![normalized],
        parse_promo_row,
    );

    match result {
        Ok(promo) => Ok(Some(promo)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_promo_row(row: &rusqlite::Row) -> rusqlite::Result<PromoCode> {
    Ok(PromoCode {
        code: row.get(0)?,
        discount_type: DiscountType::parse(&row.get::<_, String>(1)?),
        discount_value: row.get(2)?,
        is_active: row.get::<_, i32>(3)? != 0,
    })
}

// ── Bookings ──

pub struct NewBooking<'a> {
    pub reference_id: &'a str,
    pub experience_id: i64,
    pub slot_id: i64,
    pub full_name: &'a str,
    pub email: &'a str,
    pub quantity: i64,
    pub promo_code: Option<&'a str>,
    pub discount: i64,
    pub subtotal: i64,
    pub taxes: i64,
    pub total: i64,
}

pub fn insert_booking(conn: &Connection, booking: &NewBooking) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO bookings (reference_id, experience_id, slot_id, full_name, email, quantity,
                               promo_code, discount, subtotal, taxes, total, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            booking.reference_id,
            booking.experience_id,
            booking.slot_id,
            booking.full_name,
            booking.email,
            booking.quantity,
            booking.promo_code,
            booking.discount,
            booking.subtotal,
            booking.taxes,
            booking.total,
            BookingStatus::Confirmed.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_booking(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, reference_id, experience_id, slot_id, full_name, email, quantity,
                promo_code, discount, subtotal, taxes, total, booking_date
         FROM bookings WHERE id = ?1",
        params![id],
        parse_booking_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        reference_id: row.get(1)?,
        experience_id: row.get(2)?,
        slot_id: row.get(3)?,
        full_name: row.get(4)?,
        email: row.get(5)?,
        quantity: row.get(6)?,
        promo_code: row.get(7)?,
        discount: row.get(8)?,
        subtotal: row.get(9)?,
        taxes: row.get(10)?,
        total: row.get(11)?,
        status: BookingStatus::Confirmed,
        booking_date: row.get(12)?,
    })
}
