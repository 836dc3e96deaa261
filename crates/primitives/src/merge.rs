use std::collections::BTreeMap;

/// Merges `additional` onto `base`.
///
/// Keys only in `base` are preserved, keys only in `additional` are added, and for
/// keys present in both the value from `additional` wins.
pub fn merge_maps<V: Clone>(base: &BTreeMap<String, V>, additional: &BTreeMap<String, V>) -> BTreeMap<String, V> {
	let mut merged = base.clone();
	merged.extend(additional.iter().map(|(k, v)| (k.clone(), v.clone())));
	merged
}
