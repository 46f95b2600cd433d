//! Records exchanged with the backend
//!
//! The backend owns these shapes. Each record keeps its id, the fields the
//! client reads, and everything else in `extra` so nothing is dropped on the
//! way through. Field names are camelCase on the wire.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Opaque JSON object describing the signed-in user
pub type User = Map<String, Value>;

/// Opaque record identifier
///
/// The backend sends ids as either JSON strings or numbers; both are kept as
/// their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => Id(s),
            Raw::Int(n) => Id(n.to_string()),
            Raw::Uint(n) => Id(n.to_string()),
        })
    }
}

/// Response of register/login: `{ token, user }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// A stored file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Id,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub folder_id: Option<Id>,
    #[serde(default)]
    pub is_starred: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A folder; `parent_id` is absent for top-level folders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: Id,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Id>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A shareable link to a file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub id: Id,
    #[serde(default)]
    pub file_id: Option<Id>,
    #[serde(default)]
    pub share_type: Option<String>,
    #[serde(default)]
    pub permissions: Option<String>,
    #[serde(default)]
    pub expiry_epoch_ms: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A pass-share room; `code` is what other participants join with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassShareSession {
    pub id: Id,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A file offered inside a pass-share session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub id: Id,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A member of a pass-share session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shallow merge: top-level keys of `patch` overwrite those of `base`
pub fn merge_user(base: Option<&User>, patch: &User) -> User {
    let mut merged = base.cloned().unwrap_or_default();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_from_string_or_number() {
        let a: Id = serde_json::from_value(json!("f-1")).unwrap();
        let b: Id = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(a.as_str(), "f-1");
        assert_eq!(b.to_string(), "42");
        assert_eq!(serde_json::to_value(&b).unwrap(), json!("42"));
    }

    #[test]
    fn test_file_record_keeps_unknown_fields() {
        let file: FileRecord = serde_json::from_value(json!({
            "id": 7,
            "name": "report.pdf",
            "contentType": "application/pdf",
            "isStarred": true,
            "ownerId": 3,
        }))
        .unwrap();

        assert_eq!(file.id, Id::from(7));
        assert_eq!(file.name.as_deref(), Some("report.pdf"));
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(file.is_starred, Some(true));
        assert_eq!(file.extra.get("ownerId"), Some(&json!(3)));
    }

    #[test]
    fn test_auth_response_without_token() {
        let resp: AuthResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.token.is_none());
        assert!(resp.user.is_none());
    }

    #[test]
    fn test_merge_user_is_shallow() {
        let base = json!({"name": "Ada", "prefs": {"theme": "dark"}});
        let patch = json!({"prefs": {"lang": "en"}, "email": "ada@example.com"});

        let merged = merge_user(base.as_object(), patch.as_object().unwrap());
        assert_eq!(
            Value::Object(merged),
            json!({"name": "Ada", "prefs": {"lang": "en"}, "email": "ada@example.com"})
        );

        let from_nothing = merge_user(None, patch.as_object().unwrap());
        assert_eq!(from_nothing.len(), 2);
    }
}
