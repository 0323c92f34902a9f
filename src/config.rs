use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

use crate::authz::roles::{ADMIN, CORE_HUB_MEMBER, PROF_SERVICES_MEMBER};
use crate::errors::AppError;

const DEFAULT_GROUP_ROLES: [(&str, &str); 5] = [
    ("profservices-team@alphaus.cloud", PROF_SERVICES_MEMBER),
    ("corehub-team@alphaus.cloud", CORE_HUB_MEMBER),
    ("admin@alphaus.cloud", ADMIN),
    ("uni-one@alphaus.cloud", CORE_HUB_MEMBER),
    ("all@alphaus.cloud", ADMIN),
];

/// Lookup table from identity-provider group name to internal role name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct GroupRoleMapping {
    entries: HashMap<String, String>,
}

impl Default for GroupRoleMapping {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_ROLES)
    }
}

impl GroupRoleMapping {
    pub fn new<G, R>(entries: impl IntoIterator<Item = (G, R)>) -> Self
    where
        G: Into<String>,
        R: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(group, role)| (group.into(), role.into()))
                .collect(),
        }
    }

    /// Parses a JSON object of `{"group": "Role"}` pairs.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw)
            .map_err(|err| AppError::configuration(format!("GROUP_ROLE_MAPPING must be a JSON object of strings: {err}")))
    }

    /// `GROUP_ROLE_MAPPING` when set, the built-in table otherwise.
    pub fn from_env() -> Result<Self, AppError> {
        match std::env::var("GROUP_ROLE_MAPPING") {
            Ok(raw) if !raw.trim().is_empty() => Self::from_json(&raw),
            _ => Ok(Self::default()),
        }
    }

    pub fn role_for(&self, group: &str) -> Option<&str> {
        self.entries.get(group).map(String::as_str)
    }

    /// Distinct role names the given groups map to. Unmapped groups are dropped.
    pub fn map_groups<S: AsRef<str>>(&self, groups: &[S]) -> BTreeSet<String> {
        groups
            .iter()
            .filter_map(|group| self.role_for(group.as_ref()))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub group_role_mapping: GroupRoleMapping,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| AppError::configuration("DATABASE_URL not set"))?;

        Ok(Self {
            database_url,
            group_role_mapping: GroupRoleMapping::from_env()?,
        })
    }
}
