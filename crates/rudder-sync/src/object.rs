//! Configuration objects as exchanged with the API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ObjectError;

/// The object kinds that are synchronized, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Directives,
    Groups,
    Rules,
}

impl ObjectKind {
    /// Creation order. Deletion walks this backwards so rules go before the
    /// groups and directives they reference.
    pub const SYNC_ORDER: [ObjectKind; 3] =
        [ObjectKind::Directives, ObjectKind::Groups, ObjectKind::Rules];

    /// Collection path segment, also the list name inside the `data` envelope.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Directives => "directives",
            Self::Groups => "groups",
            Self::Rules => "rules",
        }
    }

    /// Path of a single object. The id is always one escaped segment, so
    /// `?`, `#` or `/` inside it can never address another resource.
    pub fn object_path(self, id: &str) -> String {
        format!("{}/{}", self.collection(), path_segment(id))
    }

    pub fn deletion_order() -> impl Iterator<Item = ObjectKind> {
        Self::SYNC_ORDER.into_iter().rev()
    }
}

/// Percent-encode `raw` for use as one URL path segment.
pub fn path_segment(raw: &str) -> String {
    // form encoding writes spaces as `+`; a literal `+` is already `%2B`.
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directives" => Ok(Self::Directives),
            "groups" => Ok(Self::Groups),
            "rules" => Ok(Self::Rules),
            other => Err(format!(
                "Unknown object type: {other}. Valid types: directives, groups, rules"
            )),
        }
    }
}

/// A directive, group or rule record. Identity is the `id` field only.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigObject {
    id: String,
    fields: Map<String, Value>,
}

impl ConfigObject {
    pub fn from_value(value: Value) -> Result<Self, ObjectError> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            _ => Err(ObjectError::NotAnObject),
        }
    }

    pub fn from_map(fields: Map<String, Value>) -> Result<Self, ObjectError> {
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .ok_or(ObjectError::MissingId)?
            .to_string();
        Ok(Self { id, fields })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Best-effort human label (`displayName`, then `name`).
    pub fn display_name(&self) -> Option<&str> {
        self.get("displayName")
            .or_else(|| self.get("name"))
            .and_then(Value::as_str)
    }

    /// Objects the API marks as built-in.
    pub fn is_system(&self) -> bool {
        self.get("system").and_then(Value::as_bool).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requires_string_id() {
        assert_eq!(
            ConfigObject::from_value(json!({"name": "x"})),
            Err(ObjectError::MissingId)
        );
        assert_eq!(
            ConfigObject::from_value(json!({"id": 7})),
            Err(ObjectError::MissingId)
        );
        assert_eq!(
            ConfigObject::from_value(json!(["id"])),
            Err(ObjectError::NotAnObject)
        );

        let obj = ConfigObject::from_value(json!({"id": "r1", "displayName": "Rule 1"})).unwrap();
        assert_eq!(obj.id(), "r1");
        assert_eq!(obj.display_name(), Some("Rule 1"));
        assert!(!obj.is_system());
    }

    #[test]
    fn deletion_order_is_reverse_of_sync_order() {
        let order: Vec<_> = ObjectKind::deletion_order().collect();
        assert_eq!(
            order,
            vec![ObjectKind::Rules, ObjectKind::Groups, ObjectKind::Directives]
        );
    }

    #[test]
    fn object_ids_stay_in_one_segment() {
        assert_eq!(ObjectKind::Rules.object_path("r1"), "rules/r1");
        assert_eq!(
            ObjectKind::Rules.object_path("r1?force=true"),
            "rules/r1%3Fforce%3Dtrue"
        );
        assert_eq!(ObjectKind::Groups.object_path("a/b#c"), "groups/a%2Fb%23c");
        assert_eq!(path_segment("web servers+db"), "web%20servers%2Bdb");
        assert_eq!(path_segment("32377fd7-02fd-43d0"), "32377fd7-02fd-43d0");
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("groups".parse::<ObjectKind>(), Ok(ObjectKind::Groups));
        assert!("nodes".parse::<ObjectKind>().is_err());
    }
}
