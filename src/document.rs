//! The three-level config document: section → domain → preferences.

use indexmap::IndexMap;

use crate::error::DotmacosError;
use crate::prefs::PreferenceMap;
use crate::types::Section;
use crate::validate;
use crate::value::{Dictionary, Value};

/// Domains of one section, keyed by domain name.
pub type Domains = IndexMap<String, PreferenceMap>;

/// A validated config document.
///
/// Top-level keys are [`Section`]s, second-level keys are non-empty domain
/// names, leaves are [`PreferenceMap`]s. Documents are never edited in
/// place; reconciliation builds new ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionsDocument {
    sections: IndexMap<Section, Domains>,
}

impl SectionsDocument {
    /// Validate a decoded document tree.
    ///
    /// Unknown section names are all reported together. Any other violation
    /// fails on the first offending entry.
    pub fn from_value(root: Value) -> Result<Self, DotmacosError> {
        let Value::Dictionary(root) = root else {
            return Err(DotmacosError::NotAMapping {
                context: "sections".into(),
            });
        };

        let mut unknown = Vec::new();
        let mut known = Vec::new();
        for (name, domains) in root {
            match name.parse::<Section>() {
                Ok(section) => known.push((section, domains)),
                Err(_) => unknown.push(name),
            }
        }
        if !unknown.is_empty() {
            return Err(DotmacosError::InvalidSections(unknown));
        }

        let mut sections = IndexMap::new();
        for (section, domains) in known {
            sections.insert(section, domains_from_value(section, domains)?);
        }
        Ok(Self { sections })
    }

    /// Build a document from already validated parts.
    pub fn from_sections(
        sections: impl IntoIterator<Item = (Section, Domains)>,
    ) -> Result<Self, DotmacosError> {
        let sections: IndexMap<Section, Domains> = sections.into_iter().collect();
        for (section, domains) in &sections {
            for domain in domains.keys() {
                validate::check_key(domain, &format!("section {section}"))?;
            }
        }
        Ok(Self { sections })
    }

    pub fn get(&self, section: Section) -> Option<&Domains> {
        self.sections.get(&section)
    }

    pub fn prefs(&self, section: Section, domain: &str) -> Option<&PreferenceMap> {
        self.sections.get(&section)?.get(domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &Domains)> {
        self.sections.iter().map(|(section, domains)| (*section, domains))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Drop every section not listed in `include`.
    pub fn retain_sections(mut self, include: &[Section]) -> Self {
        self.sections.retain(|section, _| include.contains(section));
        self
    }

    /// Render the document back into a value tree for encoding.
    pub fn to_value(&self) -> Value {
        let root: Dictionary = self
            .sections
            .iter()
            .map(|(section, domains)| {
                let domains: Dictionary = domains
                    .iter()
                    .map(|(domain, prefs)| {
                        (domain.clone(), Value::Dictionary(prefs.as_dictionary().clone()))
                    })
                    .collect();
                (section.name().to_string(), Value::Dictionary(domains))
            })
            .collect();
        Value::Dictionary(root)
    }
}

fn domains_from_value(section: Section, value: Value) -> Result<Domains, DotmacosError> {
    let Value::Dictionary(raw) = value else {
        return Err(DotmacosError::NotAMapping {
            context: format!("domains in section {section}"),
        });
    };
    let mut domains = Domains::new();
    for (domain, prefs) in raw {
        validate::check_key(&domain, &format!("section {section}"))?;
        let prefs = PreferenceMap::from_value(prefs, &validate::child(section.name(), &domain))?;
        domains.insert(domain, prefs);
    }
    Ok(domains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::dict;

    fn finder_doc() -> Value {
        dict(&[(
            "user",
            dict(&[("com.apple.finder", dict(&[("ShowPreviewPane", Value::from(true))]))]),
        )])
    }

    #[test]
    fn builds_from_valid_tree() {
        let doc = SectionsDocument::from_value(finder_doc()).unwrap();
        let prefs = doc.prefs(Section::User, "com.apple.finder").unwrap();
        assert_eq!(prefs.get("ShowPreviewPane"), Some(&Value::from(true)));
        assert!(doc.get(Section::System).is_none());
    }

    #[test]
    fn rejects_unknown_sections_listing_all() {
        let tree = dict(&[
            ("user", dict(&[])),
            ("global", dict(&[])),
            ("host", dict(&[])),
        ]);
        match SectionsDocument::from_value(tree).unwrap_err() {
            DotmacosError::InvalidSections(names) => assert_eq!(names, ["global", "host"]),
            other => panic!("Expected InvalidSections, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_mapping_root() {
        let err = SectionsDocument::from_value(Value::from(vec![1i64])).unwrap_err();
        assert!(matches!(err, DotmacosError::NotAMapping { .. }));
    }

    #[test]
    fn rejects_non_mapping_domains() {
        let tree = dict(&[("local", Value::from("nope"))]);
        let err = SectionsDocument::from_value(tree).unwrap_err();
        assert!(err.to_string().contains("domains in section local"));
    }

    #[test]
    fn rejects_non_mapping_prefs() {
        let tree = dict(&[("user", dict(&[("com.apple.dock", Value::from(3i64))]))]);
        let err = SectionsDocument::from_value(tree).unwrap_err();
        assert!(err.to_string().contains("user.com.apple.dock"));
    }

    #[test]
    fn rejects_empty_domain_name() {
        let tree = dict(&[("user", dict(&[("", dict(&[]))]))]);
        let err = SectionsDocument::from_value(tree).unwrap_err();
        assert!(matches!(err, DotmacosError::InvalidKey { .. }));
    }

    #[test]
    fn to_value_round_trips() {
        let doc = SectionsDocument::from_value(finder_doc()).unwrap();
        assert_eq!(doc.to_value(), finder_doc());
    }

    #[test]
    fn retain_sections_filters() {
        let tree = dict(&[("user", dict(&[])), ("system", dict(&[]))]);
        let doc = SectionsDocument::from_value(tree)
            .unwrap()
            .retain_sections(&[Section::System]);
        assert!(doc.get(Section::User).is_none());
        assert!(doc.get(Section::System).is_some());
    }
}
