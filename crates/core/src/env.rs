//! Workflow environment mappings.

use indexmap::IndexMap;

/// Ordered environment mapping (variable name to scalar value).
pub type EnvMap = IndexMap<String, serde_yaml::Value>;

/// Merge `overrides` over `base`.
///
/// Override wins on key collision. Keys already in `base` keep their
/// position, new keys are appended in override order.
#[must_use]
pub fn merge_env(mut base: EnvMap, overrides: &EnvMap) -> EnvMap {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Build an [`EnvMap`] from string pairs.
#[must_use]
pub fn env_from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> EnvMap {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), serde_yaml::Value::String(v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn num(n: i64) -> serde_yaml::Value {
        serde_yaml::Value::Number(n.into())
    }

    #[test]
    fn test_override_wins() {
        let base: EnvMap = [("A".to_string(), num(1)), ("B".to_string(), num(2))]
            .into_iter()
            .collect();
        let overrides: EnvMap = [("B".to_string(), num(3)), ("C".to_string(), num(4))]
            .into_iter()
            .collect();

        let merged = merge_env(base, &overrides);

        let expected: EnvMap = [
            ("A".to_string(), num(1)),
            ("B".to_string(), num(3)),
            ("C".to_string(), num(4)),
        ]
        .into_iter()
        .collect();
        assert_eq!(merged, expected);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["A", "B", "C"]);
    }

    #[test]
    fn test_empty_overrides() {
        let base = env_from_pairs([("A", "x")]);
        assert_eq!(merge_env(base.clone(), &EnvMap::new()), base);
    }

    proptest! {
        #[test]
        fn test_merge_contains_every_override(
            base in prop::collection::btree_map("[A-D]", 0i64..10, 0..4),
            overrides in prop::collection::btree_map("[A-D]", 10i64..20, 0..4),
        ) {
            let base: EnvMap = base.into_iter().map(|(k, v)| (k, num(v))).collect();
            let overrides: EnvMap = overrides.into_iter().map(|(k, v)| (k, num(v))).collect();
            let merged = merge_env(base.clone(), &overrides);

            for (key, value) in &overrides {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, value) in &base {
                if !overrides.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
            prop_assert!(merged.len() <= base.len() + overrides.len());
        }
    }
}
