//! Custom serde helpers for BingX's loosely typed payloads.
//!
//! Several BingX endpoints change shape depending on the request, or return
//! placeholder values instead of nulls. These modules absorb the variations.

use serde::{Deserialize, Deserializer};

/// Deserialize to `None` instead of failing on invalid/unexpected data.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use bingx_api_client::types::serde_helpers::default_on_error;
///
/// #[derive(Deserialize, Debug)]
/// struct Contract {
///     #[serde(deserialize_with = "default_on_error::deserialize", default)]
///     launch_time: Option<i64>,
/// }
///
/// let json = r#"{"launch_time":"soon"}"#;
/// let contract: Contract = serde_json::from_str(json).unwrap();
/// assert!(contract.launch_time.is_none());
/// ```
pub mod default_on_error {
    use super::*;

    /// Deserialize a value, returning None if deserialization fails.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(T::deserialize(value).ok())
    }
}

/// Helper for empty strings that should be deserialized as None.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use bingx_api_client::types::serde_helpers::empty_string_as_none;
///
/// #[derive(Deserialize, Debug)]
/// struct Permissions {
///     #[serde(deserialize_with = "empty_string_as_none::deserialize", default)]
///     note: Option<String>,
/// }
///
/// let json = r#"{"note":""}"#;
/// let permissions: Permissions = serde_json::from_str(json).unwrap();
/// assert!(permissions.note.is_none());
/// ```
pub mod empty_string_as_none {
    use super::*;

    /// Deserialize a string, returning None if empty.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.filter(|s| !s.is_empty()))
    }
}

/// Accept either a single object or a list of them.
///
/// BingX returns one object when a request names a symbol and a list when it
/// does not.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use bingx_api_client::types::serde_helpers::one_or_many;
///
/// #[derive(Deserialize, Debug)]
/// struct Response {
///     #[serde(deserialize_with = "one_or_many::deserialize")]
///     data: Vec<u32>,
/// }
///
/// let one: Response = serde_json::from_str(r#"{"data":1}"#).unwrap();
/// assert_eq!(one.data, vec![1]);
///
/// let many: Response = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
/// assert_eq!(many.data, vec![1, 2]);
/// ```
pub mod one_or_many {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    /// Deserialize one `T` or a list of `T` into a `Vec<T>`.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        })
    }
}

/// Accept a boolean or its string form (`"true"`/`"false"`).
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use bingx_api_client::types::serde_helpers::lenient_bool;
///
/// #[derive(Deserialize, Debug)]
/// struct Contract {
///     #[serde(deserialize_with = "lenient_bool::deserialize")]
///     api_state_open: bool,
/// }
///
/// let contract: Contract = serde_json::from_str(r#"{"api_state_open":"true"}"#).unwrap();
/// assert!(contract.api_state_open);
/// ```
pub mod lenient_bool {
    use super::*;
    use serde::de;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    /// Deserialize `true`, `false`, `"true"` or `"false"`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match BoolOrString::deserialize(deserializer)? {
            BoolOrString::Bool(b) => Ok(b),
            BoolOrString::String(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(de::Error::custom(format!("expected a boolean, got {other:?}"))),
            },
        }
    }
}
