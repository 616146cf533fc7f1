//! Identifiers minted by the notification service.

use std::fmt;

use ulid::Ulid;

/// Prefix of event stream connection ids.
pub const SSE_CLIENT_PREFIX: &str = "sse";

/// Id of one open event stream, e.g. `sse_01HV4Z...`.
///
/// Issued per connection, so a user with two dashboard tabs holds two ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn generate() -> Self {
        Self(format!("{SSE_CLIENT_PREFIX}_{}", Ulid::new()))
    }

    /// Accepts only `sse_<ulid>`.
    pub fn parse(value: &str) -> Option<Self> {
        let ulid = value.strip_prefix(SSE_CLIENT_PREFIX)?.strip_prefix('_')?;
        Ulid::from_string(ulid).ok()?;
        Some(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = ClientId::generate();
        let b = ClientId::generate();
        assert!(a.as_str().starts_with("sse_"));
        assert_eq!(a.as_str().len(), 4 + 26);
        assert_ne!(a, b);
    }

    #[test]
    fn parse_round_trips_generated_id() {
        let id = ClientId::generate();
        assert_eq!(ClientId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn parse_rejects_foreign_ids() {
        assert!(ClientId::parse("usr_01ARZ3NDEKTSV4RRFFQ69G5FAV").is_none());
        assert!(ClientId::parse("sse_not-a-ulid").is_none());
        assert!(ClientId::parse("sse01ARZ3NDEKTSV4RRFFQ69G5FAV").is_none());
    }
}
