//! Custom nonce overrides and the advisory nonce warning.

use std::collections::HashMap;

use crate::tx::TxId;

/// Per-transaction nonce overrides set from the nonce field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomNonces(HashMap<TxId, u64>);

impl CustomNonces {
    pub fn get(&self, id: TxId) -> Option<u64> {
        self.0.get(&id).copied()
    }

    /// Stores `nonce` for `id`, or clears the override when `None`.
    pub fn set(&mut self, id: TxId, nonce: Option<u64>) {
        match nonce {
            Some(n) => {
                self.0.insert(id, n);
            }
            None => {
                self.0.remove(&id);
            }
        }
    }

    pub fn clear(&mut self, id: TxId) -> Option<u64> {
        self.0.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sanitises raw nonce-field input.
///
/// Empty, non-numeric, and negative input clears the override. Fractions are
/// floored.
pub fn parse_custom_nonce_input(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(n);
    }

    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return None;
    }
    Some(value.floor() as u64)
}

/// Warning shown when the override skips ahead of the suggested nonce.
pub fn nonce_warning(next_nonce: Option<u64>, custom_nonce: Option<u64>) -> Option<String> {
    match (next_nonce, custom_nonce) {
        (Some(next), Some(custom)) if custom > next => {
            Some(format!("Nonce is higher than suggested nonce of {next}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitises_field_input() {
        assert_eq!(parse_custom_nonce_input(""), None);
        assert_eq!(parse_custom_nonce_input("   "), None);
        assert_eq!(parse_custom_nonce_input("7"), Some(7));
        assert_eq!(parse_custom_nonce_input(" 12 "), Some(12));
        assert_eq!(parse_custom_nonce_input("3.9"), Some(3));
        assert_eq!(parse_custom_nonce_input("-1"), None);
        assert_eq!(parse_custom_nonce_input("-0.5"), None);
        assert_eq!(parse_custom_nonce_input("abc"), None);
        assert_eq!(parse_custom_nonce_input("NaN"), None);
        assert_eq!(parse_custom_nonce_input("inf"), None);
    }

    #[test]
    fn warns_only_above_the_suggested_nonce() {
        assert_eq!(
            nonce_warning(Some(5), Some(9)).as_deref(),
            Some("Nonce is higher than suggested nonce of 5")
        );
        assert_eq!(nonce_warning(Some(5), Some(5)), None);
        assert_eq!(nonce_warning(Some(5), Some(2)), None);
        assert_eq!(nonce_warning(None, Some(9)), None);
        assert_eq!(nonce_warning(Some(5), None), None);
    }

    #[test]
    fn overrides_are_keyed_by_transaction() {
        let mut nonces = CustomNonces::default();
        nonces.set(TxId(1), Some(4));
        nonces.set(TxId(2), Some(8));
        assert_eq!(nonces.get(TxId(1)), Some(4));

        nonces.set(TxId(1), None);
        assert_eq!(nonces.get(TxId(1)), None);
        assert_eq!(nonces.clear(TxId(2)), Some(8));
        assert!(nonces.is_empty());
    }
}
