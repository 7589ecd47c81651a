//! Mapper resolution by standard key or country code.

use std::collections::HashMap;
use std::sync::Arc;

use crate::en16931::En16931Mapper;
use crate::mapper::StandardMapper;
use crate::peppol::PeppolBisMapper;
use crate::us::UsStandardMapper;
use crate::xrechnung::XRechnungMapper;

/// ISO 3166-1 alpha-2 country → standard key.
const COUNTRY_STANDARDS: &[(&str, &str)] = &[
    ("DE", "xrechnung"),
    ("AT", "peppol-bis"),
    ("BE", "peppol-bis"),
    ("DK", "peppol-bis"),
    ("FI", "peppol-bis"),
    ("IE", "peppol-bis"),
    ("NL", "peppol-bis"),
    ("NO", "peppol-bis"),
    ("PL", "peppol-bis"),
    ("SE", "peppol-bis"),
    ("FR", "en16931"),
    ("ES", "en16931"),
    ("IT", "en16931"),
    ("PT", "en16931"),
    ("US", "us"),
];

/// Registry of standard mappers.
///
/// Constructed once at process start and passed by reference — there is no
/// hidden global table. Resolution never fails: unknown standards and
/// countries fall back to the EN 16931 mapper (logged).
pub struct MapperRegistry {
    mappers: HashMap<&'static str, Arc<dyn StandardMapper>>,
    fallback: Arc<dyn StandardMapper>,
}

impl MapperRegistry {
    /// An empty registry with only the EN 16931 fallback.
    pub fn new() -> Self {
        let fallback: Arc<dyn StandardMapper> = Arc::new(En16931Mapper::new());
        let mut mappers: HashMap<&'static str, Arc<dyn StandardMapper>> = HashMap::new();
        mappers.insert(fallback.standard(), Arc::clone(&fallback));
        Self { mappers, fallback }
    }

    /// The registry with all built-in mappers registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PeppolBisMapper::new()));
        registry.register(Arc::new(XRechnungMapper::new()));
        registry.register(Arc::new(UsStandardMapper::new()));
        registry
    }

    /// Register a mapper under its own standard key (last one wins).
    pub fn register(&mut self, mapper: Arc<dyn StandardMapper>) {
        self.mappers.insert(mapper.standard(), mapper);
    }

    /// Keys of every registered standard.
    pub fn standards(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.mappers.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Resolve by explicit standard key; unknown keys get the EN 16931
    /// fallback (logged, not fatal).
    pub fn by_standard(&self, key: &str) -> &dyn StandardMapper {
        match self.mappers.get(key) {
            Some(mapper) => mapper.as_ref(),
            None => {
                tracing::warn!(standard = key, "no mapper registered, using en16931");
                self.fallback.as_ref()
            }
        }
    }

    /// Resolve by ISO country code via the static table; countries without
    /// an entry get the EN 16931 fallback (logged, not fatal).
    pub fn by_country(&self, country_code: &str) -> &dyn StandardMapper {
        let code = country_code.to_ascii_uppercase();
        match COUNTRY_STANDARDS.iter().find(|(country, _)| *country == code) {
            Some((_, standard)) => self.by_standard(standard),
            None => {
                tracing::debug!(country = %code, "no standard mapped for country, using en16931");
                self.fallback.as_ref()
            }
        }
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_all_built_ins() {
        let registry = MapperRegistry::with_defaults();
        assert_eq!(registry.standards(), vec!["en16931", "peppol-bis", "us", "xrechnung"]);
    }

    #[test]
    fn resolution_by_country_uses_the_static_table() {
        let registry = MapperRegistry::with_defaults();
        assert_eq!(registry.by_country("DE").standard(), "xrechnung");
        assert_eq!(registry.by_country("nl").standard(), "peppol-bis");
        assert_eq!(registry.by_country("US").standard(), "us");
        assert_eq!(registry.by_country("FR").standard(), "en16931");
    }

    #[test]
    fn unknown_keys_and_countries_fall_back_to_en16931() {
        let registry = MapperRegistry::with_defaults();
        assert_eq!(registry.by_standard("fatoora").standard(), "en16931");
        assert_eq!(registry.by_country("BR").standard(), "en16931");
    }
}
