//! Recipient Entity

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use kernel::id::{RecipientId, UserId};

use crate::error::VaultResult;

const MAX_NAME_CHARS: usize = 200;
const MAX_EMAIL_CHARS: usize = 254;
const MAX_PHONE_CHARS: usize = 32;

#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: RecipientId,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated recipient fields
#[derive(Debug, Clone)]
pub struct RecipientFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl RecipientFields {
    pub fn parse(name: &str, email: &str, phone: Option<&str>) -> VaultResult<Self> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::bad_request("Recipient name must be 1 to 200 characters").into());
        }

        let email = email.trim().to_lowercase();
        let valid_email = email.len() <= MAX_EMAIL_CHARS
            && email
                .split_once('@')
                .is_some_and(|(local, domain)| {
                    !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
                        && !domain.ends_with('.')
                })
            && !email.chars().any(char::is_whitespace);
        if !valid_email {
            return Err(AppError::bad_request("Invalid recipient email")
                .with_action("Enter an address like name@example.com")
                .into());
        }

        let phone = phone.map(str::trim).filter(|p| !p.is_empty());
        if let Some(p) = phone {
            let valid_phone = p.chars().count() <= MAX_PHONE_CHARS
                && p.chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
            if !valid_phone {
                return Err(AppError::bad_request("Invalid recipient phone number").into());
            }
        }

        Ok(Self {
            name: name.to_string(),
            email,
            phone: phone.map(str::to_string),
        })
    }
}

impl Recipient {
    pub fn new(user_id: UserId, fields: RecipientFields) -> Self {
        let now = Utc::now();
        Self {
            id: RecipientId::new(),
            user_id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: RecipientFields) {
        self.name = fields.name;
        self.email = fields.email;
        self.phone = fields.phone;
        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        let fields =
            RecipientFields::parse(" Ada ", " Ada@Example.COM ", Some(" +44 20 7946 0958 ")).unwrap();
        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.email, "ada@example.com");
        assert_eq!(fields.phone.as_deref(), Some("+44 20 7946 0958"));

        let fields = RecipientFields::parse("Ada", "ada@example.com", Some("  ")).unwrap();
        assert!(fields.phone.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(RecipientFields::parse("", "ada@example.com", None).is_err());
        assert!(RecipientFields::parse("Ada", "ada.example.com", None).is_err());
        assert!(RecipientFields::parse("Ada", "ada@localhost", None).is_err());
        assert!(RecipientFields::parse("Ada", "ada@example.com", Some("call me")).is_err());
    }
}
