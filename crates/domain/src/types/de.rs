//! Tolerant deserializers for backend fields

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// `null` decodes as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Parsed(T),
    Unreadable(IgnoredAny),
}

/// Optional nested object that is informational only. A value that does
/// not decode becomes `None` instead of failing the enclosing response.
pub(crate) fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Parsed(value)) => Some(value),
        Some(Lenient::Unreadable(IgnoredAny)) | None => None,
    })
}
