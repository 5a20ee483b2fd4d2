//! Unique identifiers for geocat entities.
//!
//! Strongly-typed UUID identifiers built on
//! [`domain-key`](https://crates.io/crates/domain-key) `Uuid<D>` wrappers.
//! Each identifier is parameterized by its own domain marker so an
//! [`ExecutionId`] can never be passed where another id is expected.
//!
//! All ID types are `Copy` (16 bytes) and support `v4()`, `nil()`,
//! `parse(&str)`, serde (as a UUID string), `Display`, `FromStr`, `Ord` and
//! `Hash`.

use domain_key::define_uuid;

// Re-export for downstream parse error handling
pub use domain_key::UuidParseError;

// The external handle of an ExecutionRequest.
define_uuid!(pub ExecutionIdDomain => ExecutionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_id_v4_creates_non_nil_uuid() {
        let id = ExecutionId::v4();
        assert!(!id.is_nil());
    }

    #[test]
    fn execution_ids_are_unique() {
        assert_ne!(ExecutionId::v4(), ExecutionId::v4());
    }

    #[test]
    fn id_parse_valid_uuid_string_succeeds() {
        let id = ExecutionId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn id_parse_invalid_string_returns_error() {
        assert!(ExecutionId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn id_serde_json_roundtrip() {
        let id = ExecutionId::v4();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ExecutionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
