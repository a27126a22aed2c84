use serde::{Deserialize, Serialize};

use greengrocer_core::{CategoryId, DomainError, DomainResult, Entity};

/// A named grouping of items ("Leafy greens", "Roots", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Normalize a category name for storage.
    pub fn normalize_name(name: &str) -> DomainResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        Ok(trimmed.to_string())
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(Category::normalize_name("  Roots ").unwrap(), "Roots");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            Category::normalize_name("   "),
            Err(DomainError::Validation(_))
        ));
    }
}
