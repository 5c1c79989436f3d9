use crate::models::PropertyInfo;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("duplicate slug '{0}'")]
    DuplicateSlug(String),
    #[error("duplicate external id {0}")]
    DuplicateExternalId(u64),
    #[error("alias '{slug}' points at unknown external id {external_id}")]
    UnknownExternalId { slug: String, external_id: u64 },
}

/// The villas that can be booked, plus historical slug aliases.
///
/// Aliases resolve to a canonical property but never appear in
/// `properties()`, so a villa is counted once when fanning out.
#[derive(Debug, Clone)]
pub struct PropertyRegistry {
    properties: Vec<PropertyInfo>,
    aliases: HashMap<String, u64>,
}

impl PropertyRegistry {
    pub fn new(properties: Vec<PropertyInfo>) -> Result<Self, RegistryError> {
        let mut aliases = HashMap::new();
        for (idx, property) in properties.iter().enumerate() {
            if aliases.contains_key(&property.slug) {
                return Err(RegistryError::DuplicateSlug(property.slug.clone()));
            }
            if properties[..idx]
                .iter()
                .any(|other| other.external_id == property.external_id)
            {
                return Err(RegistryError::DuplicateExternalId(property.external_id));
            }
            aliases.insert(property.slug.clone(), property.external_id);
        }

        Ok(Self {
            properties,
            aliases,
        })
    }

    /// Register an extra slug for an existing property
    pub fn with_alias(mut self, slug: &str, external_id: u64) -> Result<Self, RegistryError> {
        if self.aliases.contains_key(slug) {
            return Err(RegistryError::DuplicateSlug(slug.to_string()));
        }
        if self.by_external_id(external_id).is_none() {
            return Err(RegistryError::UnknownExternalId {
                slug: slug.to_string(),
                external_id,
            });
        }
        self.aliases.insert(slug.to_string(), external_id);
        Ok(self)
    }

    /// The three villas currently listed on the site
    pub fn default_fleet() -> Self {
        let properties = vec![
            villa(
                "2-bedroom-villa",
                2900836,
                "2 Bedroom Villa West",
                "2BR West",
                2,
                4,
                "Private pool, rice field views, modern kitchen",
            ),
            villa(
                "2-bedroom-villa-east",
                2900841,
                "2 Bedroom Villa East",
                "2BR East",
                2,
                4,
                "Private pool, garden setting, peaceful retreat",
            ),
            villa(
                "3-bedroom-villa",
                2900846,
                "3 Bedroom Villa",
                "3BR",
                3,
                6,
                "Wavy pool, cinema projectors, sunken gazebo",
            ),
        ];

        let mut aliases: HashMap<String, u64> = properties
            .iter()
            .map(|p| (p.slug.clone(), p.external_id))
            .collect();
        aliases.insert("2-bedroom-villa-west".to_string(), 2900836);

        Self {
            properties,
            aliases,
        }
    }

    /// Canonical properties, in display order
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn external_id_for(&self, slug: &str) -> Option<u64> {
        self.aliases.get(slug).copied()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&PropertyInfo> {
        self.external_id_for(slug)
            .and_then(|id| self.by_external_id(id))
    }

    pub fn by_external_id(&self, external_id: u64) -> Option<&PropertyInfo> {
        self.properties
            .iter()
            .find(|p| p.external_id == external_id)
    }

    /// Every canonical property other than the one `slug` resolves to
    pub fn siblings_of(&self, slug: &str) -> Vec<PropertyInfo> {
        let own_id = self.external_id_for(slug);
        self.properties
            .iter()
            .filter(|p| Some(p.external_id) != own_id)
            .cloned()
            .collect()
    }
}

fn villa(
    slug: &str,
    external_id: u64,
    display_name: &str,
    short_name: &str,
    bedroom_count: u8,
    max_guests: u8,
    short_description: &str,
) -> PropertyInfo {
    PropertyInfo {
        slug: slug.to_string(),
        external_id,
        display_name: display_name.to_string(),
        short_name: short_name.to_string(),
        bedroom_count,
        max_guests,
        short_description: short_description.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn test_villa(slug: &str, external_id: u64) -> PropertyInfo {
    villa(slug, external_id, slug, slug, 2, 4, "test villa")
}
