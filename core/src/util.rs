pub type FastHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

pub type FastHashSet<K> = rustc_hash::FxHashSet<K>;

/// Deduplicate while keeping the first occurrence of each value in order.
pub fn uniqify(values: Vec<String>) -> Vec<String> {
    let mut seen: FastHashSet<String> = FastHashSet::default();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
