//! Identity shapes produced by the strategy and the normalisation from raw
//! OpenAM attributes into them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker preceding a role DN in the OpenAM attributes document.
pub const ROLE_MARKER: &str = "userdetails.role=id=";

/// A single attribute value. OpenAM attributes may be multi-valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Single(String),
    Multi(Vec<String>),
}

impl AttributeValue {
    /// First value, for fields that are treated as scalars.
    pub fn first(&self) -> Option<&str> {
        match self {
            AttributeValue::Single(v) => Some(v.as_str()),
            AttributeValue::Multi(vs) => vs.first().map(String::as_str),
        }
    }

    /// Append a value, promoting a single value to a list.
    pub fn push(&mut self, value: String) {
        match self {
            AttributeValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = AttributeValue::Multi(vec![first, value]);
            }
            AttributeValue::Multi(vs) => vs.push(value),
        }
    }
}

/// Attribute map as returned by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAttributes(pub BTreeMap<String, AttributeValue>);

impl RawAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(AttributeValue::first)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0
            .insert(key.into(), AttributeValue::Single(value.into()));
    }

    /// Add a value under `key`, keeping earlier values.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            std::collections::btree_map::Entry::Occupied(mut e) => e.get_mut().push(value),
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(AttributeValue::Single(value));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Portable-contacts style profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProfile {
    pub id: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub name: ProfileName,
    pub email: Option<String>,
    #[serde(rename = "_raw")]
    pub raw: RawAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
    pub family_name: Option<String>,
    pub given_name: Option<String>,
}

impl NormalizedProfile {
    /// Map provider fields verbatim. Missing fields stay `None`.
    pub fn from_attributes(raw: RawAttributes) -> Self {
        let field = |key: &str| raw.get_str(key).map(String::from);
        Self {
            id: field("tokenid"),
            username: field("uid"),
            display_name: field("cn"),
            name: ProfileName {
                family_name: field("sn"),
                given_name: field("givenname"),
            },
            email: field("mail"),
            raw,
        }
    }
}

/// Raw attributes plus the groups derived from the roles document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    #[serde(flatten)]
    pub attributes: RawAttributes,
    pub groups: Vec<String>,
}

impl ResolvedIdentity {
    /// Attach groups when a roles document was retrieved; none otherwise.
    pub fn new(attributes: RawAttributes, roles: Option<&str>) -> Self {
        let groups = roles.map(extract_groups).unwrap_or_default();
        Self { attributes, groups }
    }
}

/// Identity handed to the application's verify callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "identity", rename_all = "snake_case")]
pub enum Identity {
    /// Loading disabled; only the token's validity is known.
    Empty,
    Profile(NormalizedProfile),
    Attributes(ResolvedIdentity),
}

impl Identity {
    pub fn email(&self) -> Option<&str> {
        match self {
            Identity::Empty => None,
            Identity::Profile(p) => p.email.as_deref(),
            Identity::Attributes(a) => a.attributes.get_str("mail"),
        }
    }
}

/// Anything that carries resolved group memberships.
pub trait HasGroups {
    fn groups(&self) -> &[String];
}

impl HasGroups for ResolvedIdentity {
    fn groups(&self) -> &[String] {
        &self.groups
    }
}

impl HasGroups for Identity {
    fn groups(&self) -> &[String] {
        match self {
            Identity::Attributes(a) => &a.groups,
            Identity::Empty | Identity::Profile(_) => &[],
        }
    }
}

/// Extract group names from a newline-delimited roles document.
///
/// For each line containing [`ROLE_MARKER`] followed somewhere by a comma,
/// the group is the text between the rightmost `=` and that comma. Order
/// follows the document and duplicates are kept.
pub fn extract_groups(document: &str) -> Vec<String> {
    document
        .lines()
        .filter_map(|line| {
            let start = line.find(ROLE_MARKER)?;
            let rest = &line[start..];
            let dn_head = &rest[..rest.find(',')?];
            let (_, group) = dn_head.rsplit_once('=')?;
            Some(group.to_string())
        })
        .collect()
}
