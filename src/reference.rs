//! Transaction reference codec.
//!
//! A reference is the token we generate before calling the payment gateway;
//! the gateway echoes it back on completion and it is our only way to link a
//! callback to local rows. Format:
//!
//! `REF-<8 digit random>-<user id | ANONYMOUS>[-<cart id | NONE>-<donation id | NONE>]`
//!
//! The trailing cart/donation segments are only emitted when at least one of
//! them is set, so a plain donor reference stays in the short
//! `REF-12345678-42` form.
//!
//! Decoding is deliberately lenient: a segment that does not parse as an
//! integer degrades to "unattributed" instead of failing the request. A
//! tampered reference therefore produces an unattributed payment rather than
//! a rejected callback, which matches the gateway contract we inherited.

use rand::Rng;

const PREFIX: &str = "REF";
const ANONYMOUS: &str = "ANONYMOUS";
const NONE: &str = "NONE";

/// Outcome of parsing one attribution segment.
///
/// `Unattributed` is an explicit tagged case, not a silent null: callers can
/// log or count unattributable callbacks without confusing them with
/// genuinely anonymous flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Id(i64),
    Unattributed,
}

impl Target {
    pub fn id(self) -> Option<i64> {
        match self {
            Target::Id(id) => Some(id),
            Target::Unattributed => None,
        }
    }
}

/// Decoded reference parts. Missing or malformed segments come back as
/// `Unattributed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceParts {
    pub user: Target,
    pub cart: Target,
    pub donation: Target,
}

fn random_part() -> String {
    let mut rng = rand::thread_rng();
    format!("{:08}", rng.gen_range(0..100_000_000u32))
}

fn segment(id: Option<i64>, absent: &str) -> String {
    match id {
        Some(id) => id.to_string(),
        None => absent.to_string(),
    }
}

/// Generate a fresh reference embedding the given attribution ids.
pub fn encode(user_id: Option<i64>, cart_id: Option<i64>, donation_id: Option<i64>) -> String {
    let head = format!(
        "{}-{}-{}",
        PREFIX,
        random_part(),
        segment(user_id, ANONYMOUS)
    );

    if cart_id.is_none() && donation_id.is_none() {
        return head;
    }

    format!(
        "{}-{}-{}",
        head,
        segment(cart_id, NONE),
        segment(donation_id, NONE)
    )
}

fn parse_segment(parts: &[&str], index: usize) -> Target {
    parts
        .get(index)
        .and_then(|s| s.parse::<i64>().ok())
        .map(Target::Id)
        .unwrap_or(Target::Unattributed)
}

/// Best-effort parse of a gateway-echoed reference.
///
/// Segment positions are fixed: 2 = user, 3 = cart, 4 = donation. Anything
/// that is absent or non-numeric decodes to `Target::Unattributed`.
pub fn decode(reference: &str) -> ReferenceParts {
    let parts: Vec<&str> = reference.split('-').collect();
    ReferenceParts {
        user: parse_segment(&parts, 2),
        cart: parse_segment(&parts, 3),
        donation: parse_segment(&parts, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_user_only_is_short_form() {
        let reference = encode(Some(42), None, None);
        let segments: Vec<&str> = reference.split('-').collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], "REF");
        assert_eq!(segments[1].len(), 8);
        assert!(segments[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(segments[2], "42");
    }

    #[test]
    fn test_encode_anonymous() {
        let reference = encode(None, None, None);
        assert!(reference.starts_with("REF-"));
        assert!(reference.ends_with("-ANONYMOUS"));
    }

    #[test]
    fn test_round_trip_all_ids() {
        let reference = encode(Some(7), Some(31), Some(99));
        let parts = decode(&reference);
        assert_eq!(parts.user, Target::Id(7));
        assert_eq!(parts.cart, Target::Id(31));
        assert_eq!(parts.donation, Target::Id(99));
    }

    #[test]
    fn test_round_trip_donation_without_cart() {
        let reference = encode(None, None, Some(5));
        let parts = decode(&reference);
        assert_eq!(parts.user, Target::Unattributed);
        assert_eq!(parts.cart, Target::Unattributed);
        assert_eq!(parts.donation, Target::Id(5));
    }

    #[test]
    fn test_decode_anonymous_round_trip() {
        let parts = decode(&encode(None, None, None));
        assert_eq!(parts.user, Target::Unattributed);
        assert_eq!(parts.user.id(), None);
    }

    #[test]
    fn test_decode_malformed_degrades_to_unattributed() {
        let parts = decode("garbage");
        assert_eq!(parts.user, Target::Unattributed);
        assert_eq!(parts.cart, Target::Unattributed);
        assert_eq!(parts.donation, Target::Unattributed);

        // Tampered user segment, valid cart segment.
        let parts = decode("REF-12345678-abc-9-NONE");
        assert_eq!(parts.user, Target::Unattributed);
        assert_eq!(parts.cart, Target::Id(9));
        assert_eq!(parts.donation, Target::Unattributed);
    }

    #[test]
    fn test_random_parts_differ() {
        let a = encode(Some(1), None, None);
        let b = encode(Some(1), None, None);
        assert_ne!(a, b);
    }
}
