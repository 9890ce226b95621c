//! Currency-unit conversion
//!
//! The orchestration layer deals in integer minor units (cents); the
//! gateway expects decimal major-unit amounts. The conversion lives here so
//! both layers agree on the boundary.

/// Convert an integer minor-unit amount into a decimal major-unit amount.
///
/// `500` becomes `5.00`, `100` becomes `1.00`.
pub fn minor_to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_minor_units_to_major() {
        assert_eq!(minor_to_major(500), 5.0);
        assert_eq!(minor_to_major(100), 1.0);
        assert_eq!(minor_to_major(1), 0.01);
        assert_eq!(minor_to_major(0), 0.0);
    }

    #[test]
    fn keeps_sub_dollar_precision() {
        assert_eq!(minor_to_major(2599), 25.99);
    }
}
