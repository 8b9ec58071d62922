use uuid::Uuid;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const REFERENCE_LEN: usize = 12;

/// Generates the short public reference for a booking: 12 upper-case
/// alphanumeric characters drawn from a v4 UUID's random bits (~62 bits of
/// entropy). The store enforces uniqueness; the coordinator retries the
/// insert on the off chance of a collision.
pub fn generate() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(REFERENCE_LEN);
    for _ in 0..REFERENCE_LEN {
        out.push(ALPHABET[(n % ALPHABET.len() as u128) as usize] as char);
        n /= ALPHABET.len() as u128;
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_length_and_charset() {
        for _ in 0..100 {
            let reference = generate();
            assert_eq!(reference.len(), REFERENCE_LEN);
            assert!(reference
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_no_collisions_over_large_n() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate()), "reference collided");
        }
    }
}
