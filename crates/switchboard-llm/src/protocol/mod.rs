//! Wire format types for vendor-specific APIs
//!
//! Each module contains pure serde structs matching the respective vendor's
//! JSON format. They only exist at the boundary; everything else works with
//! the canonical types.

pub mod anthropic;
pub mod google;
pub mod openai;

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
