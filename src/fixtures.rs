#[cfg(test)]
pub mod test {
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};

    use crate::access::{self, AccessScope};
    use crate::error::DotmacosError;
    use crate::prefs::PreferenceMap;
    use crate::store::PrefStore;
    use crate::types::Section;
    use crate::value::{Dictionary, Value};

    /// Build a dictionary value from literal pairs.
    pub fn dict(pairs: &[(&str, Value)]) -> Value {
        Value::Dictionary(entries(pairs))
    }

    /// Build a preference map from literal pairs.
    pub fn prefs(pairs: &[(&str, Value)]) -> PreferenceMap {
        PreferenceMap::new(entries(pairs), "test").unwrap()
    }

    fn entries(pairs: &[(&str, Value)]) -> Dictionary {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    /// In-memory [`PrefStore`] that records every call.
    #[derive(Debug)]
    pub struct MemoryStore {
        scope: AccessScope,
        domains: BTreeMap<(Section, String), PreferenceMap>,
        pub reads: RefCell<Vec<(Section, String)>>,
        pub listings: RefCell<Vec<Section>>,
        pub writes: Vec<(Section, String, PreferenceMap)>,
    }

    impl MemoryStore {
        pub fn new(scope: AccessScope) -> Self {
            Self {
                scope,
                domains: BTreeMap::new(),
                reads: RefCell::new(Vec::new()),
                listings: RefCell::new(Vec::new()),
                writes: Vec::new(),
            }
        }

        /// Seed a domain with existing preferences.
        pub fn with(mut self, section: Section, domain: &str, prefs: PreferenceMap) -> Self {
            self.domains.insert((section, domain.to_string()), prefs);
            self
        }

        pub fn stored(&self, section: Section, domain: &str) -> Option<&PreferenceMap> {
            self.domains.get(&(section, domain.to_string()))
        }

        /// Number of store calls of any kind.
        pub fn calls(&self) -> usize {
            self.reads.borrow().len() + self.listings.borrow().len() + self.writes.len()
        }

        fn check_scope(&self, section: Section) -> Result<(), DotmacosError> {
            if self.scope.allows(section) {
                Ok(())
            } else {
                Err(DotmacosError::AccessDenied {
                    section,
                    uid: access::effective_uid(),
                })
            }
        }
    }

    impl PrefStore for MemoryStore {
        fn read(
            &self,
            section: Section,
            domain: &str,
            keys: Option<&BTreeSet<String>>,
        ) -> Result<Option<PreferenceMap>, DotmacosError> {
            self.reads.borrow_mut().push((section, domain.to_string()));
            self.check_scope(section)?;
            let stored = self.stored(section, domain).cloned();
            Ok(match keys {
                Some(keys) => stored.map(|prefs| prefs.restricted_to(keys)),
                None => stored,
            })
        }

        fn write(
            &mut self,
            section: Section,
            domain: &str,
            prefs: &PreferenceMap,
        ) -> Result<(), DotmacosError> {
            self.check_scope(section)?;
            self.writes
                .push((section, domain.to_string(), prefs.clone()));
            self.domains
                .insert((section, domain.to_string()), prefs.clone());
            Ok(())
        }

        fn domains(&self, section: Section) -> Result<BTreeSet<String>, DotmacosError> {
            self.listings.borrow_mut().push(section);
            self.check_scope(section)?;
            Ok(self
                .domains
                .keys()
                .filter(|(s, _)| *s == section)
                .map(|(_, domain)| domain.clone())
                .collect())
        }
    }

    // -- Sample documents ------------------------------------------------------

    pub const FINDER_JSON5: &str = r#"{
  // Finder tweaks
  user: {
    "com.apple.finder": { ShowPreviewPane: true },
  },
}
"#;

    pub const FINDER_TOML: &str = r#"# Finder tweaks
[user."com.apple.finder"]
ShowPreviewPane = true
"#;

    #[test]
    fn memory_store_restricts_reads_to_keys() {
        let store = MemoryStore::new(AccessScope::new(access::Privilege::User)).with(
            Section::User,
            "d",
            prefs(&[("a", Value::from(1i64)), ("b", Value::from(2i64))]),
        );
        let keys: BTreeSet<String> = ["a".to_string()].into();
        let read = store.read(Section::User, "d", Some(&keys)).unwrap().unwrap();
        assert_eq!(read, prefs(&[("a", Value::from(1i64))]));
        assert_eq!(store.calls(), 1);
    }

    #[test]
    fn memory_store_counts_listings_outside_scope() {
        let store = MemoryStore::new(AccessScope::new(access::Privilege::User));
        assert!(store.domains(Section::System).is_err());
        assert_eq!(*store.listings.borrow(), [Section::System]);
        assert_eq!(store.calls(), 1);
    }
}
