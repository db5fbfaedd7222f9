//! Canonical string keys for memoized search states.
//!
//! A key looks like `fancy_apple=3.00,honey=5.00|4`: the remaining
//! requirement sorted by ingredient id, then the number of free team slots.

use team_core::ingredients::{normalize_requirement, AMOUNT_DECIMALS};
use team_core::{IngredientAmount, IngredientId};
use thiserror::Error;

/// Remaining requirement and free team slots at one point of the search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchState {
    /// Canonical multiset: one entry per ingredient, no zero amounts, sorted by
    /// id, amounts rounded up to two decimals.
    pub remaining: Vec<IngredientAmount>,
    pub slots_left: usize,
}

impl SearchState {
    /// Build a state, canonicalizing `remaining`.
    pub fn new(remaining: &[IngredientAmount], slots_left: usize) -> Self {
        Self {
            remaining: normalize_requirement(remaining),
            slots_left,
        }
    }

    /// Nothing left to cover, or nobody left to cover it.
    pub fn is_terminal(&self) -> bool {
        self.slots_left == 0 || self.remaining.is_empty()
    }
}

/// Encoded [`SearchState`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoKey(String);

impl MemoKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors decoding a memo key.
#[derive(Debug, Error, PartialEq)]
pub enum MemoKeyError {
    #[error("memo key {0:?} has no slot section")]
    MissingSlots(String),
    #[error("memo key slot count {0:?} is not a number")]
    BadSlots(String),
    #[error("memo key entry {0:?} is not of the form ingredient=amount")]
    BadEntry(String),
    #[error("memo key amount {0:?} is not a positive number")]
    BadAmount(String),
}

/// Encode a state. States with the same multiset content encode identically.
pub fn encode(state: &SearchState) -> MemoKey {
    let entries: Vec<String> = normalize_requirement(&state.remaining)
        .iter()
        .map(|a| format!("{}={:.*}", a.ingredient, AMOUNT_DECIMALS as usize, a.amount))
        .collect();
    MemoKey(format!("{}|{}", entries.join(","), state.slots_left))
}

/// Decode a key produced by [`encode`].
pub fn decode(key: &str) -> Result<SearchState, MemoKeyError> {
    let (entries, slots) = key
        .rsplit_once('|')
        .ok_or_else(|| MemoKeyError::MissingSlots(key.to_string()))?;
    let slots_left = slots
        .parse::<usize>()
        .map_err(|_| MemoKeyError::BadSlots(slots.to_string()))?;
    let remaining = if entries.is_empty() {
        Vec::new()
    } else {
        entries
            .split(',')
            .map(decode_entry)
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(SearchState {
        remaining,
        slots_left,
    })
}

fn decode_entry(entry: &str) -> Result<IngredientAmount, MemoKeyError> {
    let (name, amount) = entry
        .split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| MemoKeyError::BadEntry(entry.to_string()))?;
    let amount = amount
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| MemoKeyError::BadAmount(amount.to_string()))?;
    Ok(IngredientAmount {
        ingredient: IngredientId::new(name),
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn amt(name: &str, amount: f64) -> IngredientAmount {
        IngredientAmount::new(name, amount)
    }

    #[test]
    fn key_is_sorted_and_fixed_precision() {
        let state = SearchState::new(&[amt("honey", 5.0), amt("fancy_apple", 3.0)], 4);
        assert_eq!(encode(&state).as_str(), "fancy_apple=3.00,honey=5.00|4");
    }

    #[test]
    fn fractional_requirements_round_up_in_the_key() {
        let state = SearchState::new(&[amt("honey", 4.001)], 1);
        assert_eq!(encode(&state).as_str(), "honey=4.01|1");
    }

    #[test]
    fn zero_amounts_never_reach_the_key() {
        let state = SearchState {
            remaining: vec![amt("honey", 0.0), amt("milk", 2.0), amt("milk", 1.0)],
            slots_left: 2,
        };
        assert_eq!(encode(&state).as_str(), "milk=3.00|2");
    }

    #[test]
    fn empty_requirement_roundtrips() {
        let key = encode(&SearchState::new(&[], 3));
        assert_eq!(key.as_str(), "|3");
        let back = decode(key.as_str()).unwrap();
        assert!(back.remaining.is_empty());
        assert!(back.is_terminal());
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(matches!(decode("honey=1.00"), Err(MemoKeyError::MissingSlots(_))));
        assert!(matches!(decode("honey=1.00|x"), Err(MemoKeyError::BadSlots(_))));
        assert!(matches!(decode("honey|2"), Err(MemoKeyError::BadEntry(_))));
        assert!(matches!(decode("=1.00|2"), Err(MemoKeyError::BadEntry(_))));
        assert!(matches!(decode("honey=0.00|2"), Err(MemoKeyError::BadAmount(_))));
        assert!(matches!(decode("honey=abc|2"), Err(MemoKeyError::BadAmount(_))));
    }

    fn requirement() -> impl Strategy<Value = Vec<IngredientAmount>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["honey", "fancy_apple", "moomoo_milk", "bean_sausage"]),
                0u32..5_000,
            ),
            0..10,
        )
        .prop_map(|v| {
            v.into_iter()
                .map(|(name, centi)| amt(name, centi as f64 / 100.0))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn encoding_ignores_insertion_order(req in requirement(), slots in 0usize..6) {
            let mut shuffled = req.clone();
            shuffled.reverse();
            prop_assert_eq!(
                encode(&SearchState::new(&req, slots)),
                encode(&SearchState::new(&shuffled, slots))
            );
        }

        #[test]
        fn decode_inverts_encode(req in requirement(), slots in 0usize..6) {
            let state = SearchState::new(&req, slots);
            let key = encode(&state);
            let back = decode(key.as_str()).unwrap();
            prop_assert_eq!(&back, &state);
            prop_assert_eq!(encode(&back), key);
        }
    }
}
