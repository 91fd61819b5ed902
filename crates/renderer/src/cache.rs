use std::collections::hash_map::Entry;
use std::collections::HashMap;

use plasma::{EffectError, ProgramKey};

/// Per-context cache of compiled programs, keyed by [`ProgramKey`].
///
/// Insertion is at-most-once per key for the context lifetime; failed
/// builds are not cached, so a later draw may retry compilation.
/// Eviction is owned by whoever owns the context, not by this table.
#[derive(Debug, Default)]
pub struct ProgramCache<P> {
    entries: HashMap<ProgramKey, P>,
}

impl<P> ProgramCache<P> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: ProgramKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the cached program for `key`, building it on first use.
    pub fn get_or_insert_with(
        &mut self,
        key: ProgramKey,
        build: impl FnOnce() -> Result<P, EffectError>,
    ) -> Result<&P, EffectError> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                tracing::debug!(key = key.value(), "program cache miss, compiling");
                Ok(slot.insert(build()?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Affine;
    use plasma::PlasmaEffect;

    fn key(alpha: u8) -> ProgramKey {
        PlasmaEffect::new(Affine::IDENTITY, alpha, 0.0).program_key()
    }

    #[test]
    fn builds_at_most_once_per_key() {
        let mut cache: ProgramCache<String> = ProgramCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            let program = cache
                .get_or_insert_with(key(200), || {
                    builds += 1;
                    Ok("program".to_string())
                })
                .expect("build");
            assert_eq!(program, "program");
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_build_distinct_entries() {
        let mut cache: ProgramCache<u8> = ProgramCache::new();
        cache.get_or_insert_with(key(1), || Ok(1)).expect("build");
        cache.get_or_insert_with(key(2), || Ok(2)).expect("build");
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(key(1)));
        assert!(!cache.contains(key(3)));
    }

    #[test]
    fn failed_builds_are_not_cached() {
        let mut cache: ProgramCache<u8> = ProgramCache::new();
        let result = cache.get_or_insert_with(key(9), || {
            Err(EffectError::ShaderCompile {
                diagnostics: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(cache.is_empty());

        cache.get_or_insert_with(key(9), || Ok(7)).expect("retry succeeds");
        assert_eq!(cache.len(), 1);
    }
}
