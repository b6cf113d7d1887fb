//! # Business Number Generation
//!
//! Human-facing transaction numbers, generated alongside the UUID primary
//! key: `INV-NNNNNN` for invoices, `SALE-NNNNNN` for sales, where NNNNNN
//! is the six trailing digits of the current epoch milliseconds.
//!
//! These are display identifiers, not uniqueness guarantees; two commits
//! inside the same millisecond window would collide on the number while
//! remaining distinct by UUID.

use chrono::Utc;

/// Generates an invoice number: `INV-` + 6 trailing digits of epoch ms.
pub fn invoice_number() -> String {
    format!("INV-{:06}", Utc::now().timestamp_millis() % 1_000_000)
}

/// Generates a sale number: `SALE-` + 6 trailing digits of epoch ms.
pub fn sale_number() -> String {
    format!("SALE-{:06}", Utc::now().timestamp_millis() % 1_000_000)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_format() {
        let number = invoice_number();
        let digits = number.strip_prefix("INV-").expect("INV- prefix");
        assert_eq!(digits.len(), 6);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_sale_number_format() {
        let number = sale_number();
        let digits = number.strip_prefix("SALE-").expect("SALE- prefix");
        assert_eq!(digits.len(), 6);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
