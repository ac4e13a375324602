//! Field-name migration.
//!
//! Older configuration files spell fields in camelCase (`remotePort`). Both
//! spellings are decoded and merged per field: the canonical value wins
//! unless it is unset and the legacy one is set.

/// Merge one logical field from its canonical and legacy spellings.
///
/// `is_unset` decides what counts as "not provided" for the field's type.
pub fn merge_legacy<T>(canonical: T, legacy: T, is_unset: impl Fn(&T) -> bool) -> T {
    if is_unset(&canonical) && !is_unset(&legacy) {
        legacy
    } else {
        canonical
    }
}

/// [`merge_legacy`] using the type's zero value as "unset".
pub fn prefer_canonical<T: Default + PartialEq>(canonical: T, legacy: T) -> T {
    let zero = T::default();
    merge_legacy(canonical, legacy, |v| *v == zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_wins_when_both_set() {
        assert_eq!(prefer_canonical(5432_u16, 6543), 5432);
    }

    #[test]
    fn legacy_fills_unset_canonical() {
        assert_eq!(prefer_canonical(0_u16, 6543), 6543);
        assert_eq!(prefer_canonical(String::new(), "db".to_owned()), "db");
    }

    #[test]
    fn both_unset_stays_unset() {
        assert_eq!(prefer_canonical(0_u16, 0), 0);
    }

    #[test]
    fn custom_unset_check() {
        let merged = merge_legacy(Some(0_u16), Some(22), |v| v.is_none_or(|p| p == 0));
        assert_eq!(merged, Some(22));
    }
}
