//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod employee;
pub mod module;
pub mod role;
pub mod role_module;
pub mod ticket;

use serde::{Deserialize, Deserializer};

/// Serde helper for partial updates of nullable columns.
///
/// * field absent  => `None`          (leave unchanged)
/// * field `null`  => `Some(None)`    (set to NULL)
/// * field value   => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        parent: Option<Option<i64>>,
    }

    #[test]
    fn absent_null_and_value_are_distinguished() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"parent": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"parent": 6}"#).unwrap();

        assert_eq!(absent.parent, None);
        assert_eq!(null.parent, Some(None));
        assert_eq!(value.parent, Some(Some(6)));
    }
}
