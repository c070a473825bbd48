//! PublicId Value Object
//!
//! Opaque identifier shown to clients instead of the internal UUID.
//! A 21 character nanoid.

use std::fmt;
use std::str::FromStr;

use kernel::error::app_error::{AppError, AppResult};
use nid::Nanoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Nanoid);

impl PublicId {
    pub fn new() -> Self {
        Self(Nanoid::new())
    }

    pub fn parse_str(s: &str) -> AppResult<Self> {
        Nanoid::from_str(s)
            .map(Self)
            .map_err(|e| AppError::bad_request(format!("Invalid public id: {e}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for PublicId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::parse_str(s)
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_parse() {
        let id = PublicId::new();
        assert_eq!(id.as_str().len(), 21);
        let parsed: PublicId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!(PublicId::parse_str("not a nanoid!").is_err());
    }
}
