use anyhow::Context;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection};

struct SeedExperience {
    title: &'static str,
    description: &'static str,
    location: &'static str,
    price: i64,
    image_url: &'static str,
    about: &'static str,
}

const DESCRIPTION: &str =
    "Curated small-group experience. Certified guide. Safety first with gear included.";

const EXPERIENCES: &[SeedExperience] = &[
    SeedExperience {
        title: "Kayaking",
        description: DESCRIPTION,
        location: "Udupi",
        price: 999,
        image_url: "https://images.unsplash.com/photo-1544551763-46a013bb70d5?w=800",
        about: "Scenic routes, trained guides, and safety briefing. Minimum age 10. Helmet and life jackets along with an expert will accompany in kayaking.",
    },
    SeedExperience {
        title: "Nandi Hills Sunrise",
        description: DESCRIPTION,
        location: "Bangalore",
        price: 899,
        image_url: "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800",
        about: "Early morning trek to catch the breathtaking sunrise from Nandi Hills. Includes transportation and breakfast.",
    },
    SeedExperience {
        title: "Coffee Trail",
        description: DESCRIPTION,
        location: "Coorg",
        price: 1299,
        image_url: "https://images.unsplash.com/photo-1447933601403-0c6688de566e?w=800",
        about: "Explore the coffee plantations of Coorg with an expert guide. Learn about coffee cultivation and processing.",
    },
    SeedExperience {
        title: "Kayaking",
        description: DESCRIPTION,
        location: "Udupi, Karnataka",
        price: 999,
        image_url: "https://images.unsplash.com/photo-1503803548695-c2a7b4a5b875?w=800",
        about: "Navigate through serene backwaters with experienced guides. Perfect for beginners and experts alike.",
    },
    SeedExperience {
        title: "Boat Cruise",
        description: DESCRIPTION,
        location: "Sunderban",
        price: 999,
        image_url: "https://images.unsplash.com/photo-1544551763-92ab472180f5?w=800",
        about: "Enjoy a relaxing boat cruise through the Sunderbans mangrove forest with wildlife spotting opportunities.",
    },
    SeedExperience {
        title: "Bunjee Jumping",
        description: DESCRIPTION,
        location: "Manali",
        price: 999,
        image_url: "https://images.unsplash.com/photo-1515023115689-589c33041d3c?w=800",
        about: "Experience the ultimate adrenaline rush with a bunjee jump from a height of 150 feet in Manali.",
    },
    SeedExperience {
        title: "Coffee Trail",
        description: DESCRIPTION,
        location: "Coorg",
        price: 1299,
        image_url: "https://images.unsplash.com/photo-1509042239860-f550ce710b93?w=800",
        about: "Walk through lush green coffee estates and learn about the journey from bean to cup.",
    },
    SeedExperience {
        title: "Kayaking",
        description: DESCRIPTION,
        location: "Udupi, Karnataka",
        price: 999,
        image_url: "https://images.unsplash.com/photo-1542296332-2e4473faf563?w=800",
        about: "Paddle through calm waters surrounded by mangroves and natural beauty.",
    },
];

const SLOT_TIMES: &[(&str, i64)] = &[
    ("07:00 am", 4),
    ("09:00 am", 2),
    ("11:00 am", 5),
    ("01:00 pm", 0), // sold out
];

const TOTAL_SEATS: i64 = 10;

const PROMO_CODES: &[(&str, &str, f64)] = &[
    ("SAVE10", "percentage", 10.0),
    ("FLAT100", "flat", 100.0),
    ("SAVE20", "percentage", 20.0),
    ("FLAT50", "flat", 50.0),
];

/// Clears all data and loads the sample catalog: eight experiences, seven
/// days of slots each, and four promo codes.
pub fn run(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "DELETE FROM bookings;
         DELETE FROM slots;
         DELETE FROM promo_codes;
         DELETE FROM experiences;",
    )
    .context("failed to clear existing data")?;

    for exp in EXPERIENCES {
        conn.execute(
            "INSERT INTO experiences (title, description, location, price, image_url, about)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                exp.title,
                exp.description,
                exp.location,
                exp.price,
                exp.image_url,
                exp.about
            ],
        )
        .context("failed to insert experience")?;
    }
    tracing::info!(count = EXPERIENCES.len(), "experiences inserted");

    let experience_ids: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT id FROM experiences ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<_, _>>()?
    };

    let today = Utc::now().date_naive();
    let mut slot_count = 0;
    for experience_id in &experience_ids {
        for day in 0..7 {
            let date = (today + Duration::days(day)).format("%Y-%m-%d").to_string();
            for (time, seats) in SLOT_TIMES {
                conn.execute(
                    "INSERT INTO slots (experience_id, date, time, available_seats, total_seats)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![experience_id, date, time, seats, TOTAL_SEATS],
                )
                .context("failed to insert slot")?;
                slot_count += 1;
            }
        }
    }
    tracing::info!(count = slot_count, "slots inserted");

    for (code, discount_type, value) in PROMO_CODES {
        conn.execute(
            "INSERT INTO promo_codes (code, discount_type, discount_value, is_active)
             VALUES (?1, ?2, ?3, 1)",
            params![code, discount_type, value],
        )
        .context("failed to insert promo code")?;
    }
    tracing::info!(count = PROMO_CODES.len(), "promo codes inserted");

    Ok(())
}
