use serde::{Deserialize, Serialize};

use greengrocer_core::{DomainError, DomainResult, Entity, UserId};

/// Maximum phone number length accepted at registration.
pub const MAX_PHONE_LEN: usize = 10;

/// A registered customer. Orders and reviews point at users by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone_no: String,
    pub address: String,
}

impl User {
    pub fn from_new(id: UserId, new: NewUser) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            email: normalize_email(&new.email),
            phone_no: new.phone_no.trim().to_string(),
            address: new.address,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone_no: String,
    pub address: String,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !is_valid_email(&self.email) {
            return Err(DomainError::validation("invalid email format"));
        }
        if self.phone_no.trim().chars().count() > MAX_PHONE_LEN {
            return Err(DomainError::validation(format!(
                "phone number cannot exceed {MAX_PHONE_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Email in the form used for uniqueness checks.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Email format check: the address must contain an `@`.
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@')
}

fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Asha".to_string(),
            email: email.to_string(),
            phone_no: "9876543210".to_string(),
            address: "12 Market Road".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(new_user("asha@example.com").validate().is_ok());
    }

    #[test]
    fn rejects_email_without_at_sign() {
        match new_user("asha.example.com").validate() {
            Err(DomainError::Validation(msg)) if msg.contains("email") => {}
            other => panic!("expected email validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_long_phone_number() {
        let mut input = new_user("asha@example.com");
        input.phone_no = "98765432100".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn from_new_trims_identity_fields() {
        let mut input = new_user(" asha@example.com ");
        input.name = " Asha ".to_string();
        let user = User::from_new(UserId::new(7), input);
        assert_eq!(user.name, "Asha");
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.id(), UserId::new(7));
    }

    proptest! {
        /// Property: any string without '@' is not an email.
        #[test]
        fn strings_without_at_are_rejected(s in "[^@]{0,40}") {
            prop_assert!(!is_valid_email(&s));
        }
    }
}
