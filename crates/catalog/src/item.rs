use core::str::FromStr;

use serde::{Deserialize, Serialize};

use greengrocer_core::{CategoryId, DomainError, DomainResult, Entity, ItemId};

/// Item lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Active,
    Deactive,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Deactive => "deactive",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ItemStatus::Active),
            "deactive" => Ok(ItemStatus::Deactive),
            other => Err(DomainError::validation(format!(
                "unknown item status '{other}' (expected active or deactive)"
            ))),
        }
    }
}

/// A catalog item and its currently available quantity.
///
/// `quantity` is a real number (produce is sold by weight) and never negative
/// once persisted. The order workflow only ever touches `quantity`; every other
/// field belongs to catalog management.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub category_id: CategoryId,
    pub status: ItemStatus,
}

impl Item {
    /// Build a freshly created item; new items always start `Active`.
    pub fn from_new(id: ItemId, new: NewItem) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            description: new.description,
            quantity: new.quantity,
            category_id: new.category_id,
            status: ItemStatus::Active,
        }
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Input for creating an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub category_id: CategoryId,
}

impl NewItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_quantity(self.quantity)
    }
}

/// Full replacement of an item's management fields.
///
/// `status` is only changed when supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub category_id: CategoryId,
    #[serde(default)]
    pub status: Option<ItemStatus>,
}

impl ItemUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_quantity(self.quantity)
    }

    pub fn apply_to(&self, item: &mut Item) {
        item.name = self.name.trim().to_string();
        item.description = self.description.clone();
        item.quantity = self.quantity;
        item.category_id = self.category_id;
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}

/// Item joined with the name of its category, as returned by catalog listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemListing {
    #[serde(flatten)]
    pub item: Item,
    /// `None` when the category row is gone.
    pub category_name: Option<String>,
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("item name cannot be empty"));
    }
    Ok(())
}

fn validate_quantity(quantity: f64) -> DomainResult<()> {
    if !quantity.is_finite() {
        return Err(DomainError::validation("quantity must be a finite number"));
    }
    if quantity < 0.0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}
