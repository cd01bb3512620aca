//! Read-only, path-addressed view over a structured personal-data profile.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::models::ProfilePath;
use crate::traits::ValueDecryptor;

/// Immutable personal-data profile backed by a nested JSON tree.
///
/// Shared read-only across sessions behind an `Arc`; nothing in the core
/// ever writes through it. Sensitive values are stored encrypted and are
/// only reachable through [`ProfileAccessor::get_decrypted`].
#[derive(Debug, Clone)]
pub struct Profile {
    data: JsonValue,
}

impl Profile {
    /// Wrap a JSON tree. The root must be an object.
    pub fn new(data: JsonValue) -> Result<Self> {
        if !data.is_object() {
            return Err(Error::InvalidInput("profile root must be an object".into()));
        }
        Ok(Self { data })
    }

    /// Parse a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Resolve a dotted path to a scalar value.
    ///
    /// Objects, arrays, null, and empty strings resolve to `None`: an empty
    /// string is not a usable fill value.
    pub fn get(&self, path: &ProfilePath) -> Option<String> {
        let mut node = &self.data;
        for segment in path.segments() {
            node = node.as_object()?.get(segment)?;
        }
        match node {
            JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
            JsonValue::String(_) | JsonValue::Null => None,
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            JsonValue::Object(_) | JsonValue::Array(_) => None,
        }
    }

    /// Whether the path resolves to any node at all, scalar or not.
    pub fn contains(&self, path: &ProfilePath) -> bool {
        let mut node = &self.data;
        for segment in path.segments() {
            match node.as_object().and_then(|o| o.get(segment)) {
                Some(next) => node = next,
                None => return false,
            }
        }
        true
    }
}

/// Path-addressed accessor combining the plain profile with the external
/// decryption capability for sensitive values.
///
/// The accessor never decides *whether* a sensitive value may be read;
/// that is the disclosure gate's job, consulted before any call here.
#[derive(Clone)]
pub struct ProfileAccessor {
    profile: Arc<Profile>,
    decryptor: Arc<dyn ValueDecryptor>,
}

impl ProfileAccessor {
    pub fn new(profile: Arc<Profile>, decryptor: Arc<dyn ValueDecryptor>) -> Self {
        Self { profile, decryptor }
    }

    /// Plain (non-sensitive) read.
    pub fn get(&self, path: &ProfilePath) -> Option<String> {
        self.profile.get(path)
    }

    /// Sensitive read via the decrypting capability.
    ///
    /// An empty decrypted value resolves to `None`, same as the plain path.
    pub async fn get_decrypted(&self, path: &ProfilePath) -> Result<Option<String>> {
        let value = self.decryptor.decrypt(path).await?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedDecryptor;

    #[async_trait]
    impl ValueDecryptor for FixedDecryptor {
        async fn decrypt(&self, path: &ProfilePath) -> Result<Option<String>> {
            Ok(match path.as_str() {
                "identity.ssn" => Some("123-45-6789".to_string()),
                "identity.empty" => Some(String::new()),
                _ => None,
            })
        }
    }

    fn sample_profile() -> Profile {
        Profile::new(json!({
            "identity": {
                "full_name": "Jane Doe",
                "date_of_birth": "1990-01-01",
                "age": 36,
                "ssn": "enc:opaque"
            },
            "contact": {
                "address": { "city": "Portland", "zip": "97201" },
                "email": ""
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_get_nested_scalar() {
        let profile = sample_profile();
        assert_eq!(
            profile.get(&ProfilePath::new("contact.address.city")),
            Some("Portland".to_string())
        );
    }

    #[test]
    fn test_get_number_renders_to_string() {
        let profile = sample_profile();
        assert_eq!(profile.get(&ProfilePath::new("identity.age")), Some("36".to_string()));
    }

    #[test]
    fn test_get_absent_path() {
        let profile = sample_profile();
        assert_eq!(profile.get(&ProfilePath::new("identity.nope")), None);
        assert_eq!(profile.get(&ProfilePath::new("nope.deeper")), None);
    }

    #[test]
    fn test_get_object_is_absent() {
        let profile = sample_profile();
        assert_eq!(profile.get(&ProfilePath::new("contact.address")), None);
    }

    #[test]
    fn test_get_empty_string_is_absent() {
        let profile = sample_profile();
        assert_eq!(profile.get(&ProfilePath::new("contact.email")), None);
    }

    #[test]
    fn test_contains() {
        let profile = sample_profile();
        assert!(profile.contains(&ProfilePath::new("contact.address")));
        assert!(!profile.contains(&ProfilePath::new("contact.phone")));
    }

    #[test]
    fn test_profile_root_must_be_object() {
        assert!(Profile::new(json!([1, 2, 3])).is_err());
        assert!(Profile::new(json!("scalar")).is_err());
    }

    #[tokio::test]
    async fn test_accessor_decrypted_read() {
        let accessor = ProfileAccessor::new(Arc::new(sample_profile()), Arc::new(FixedDecryptor));

        let value = accessor
            .get_decrypted(&ProfilePath::new("identity.ssn"))
            .await
            .unwrap();
        assert_eq!(value, Some("123-45-6789".to_string()));
    }

    #[tokio::test]
    async fn test_accessor_decrypted_empty_is_absent() {
        let accessor = ProfileAccessor::new(Arc::new(sample_profile()), Arc::new(FixedDecryptor));

        let value = accessor
            .get_decrypted(&ProfilePath::new("identity.empty"))
            .await
            .unwrap();
        assert_eq!(value, None);
    }
}
