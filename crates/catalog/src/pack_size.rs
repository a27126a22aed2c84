use serde::{Deserialize, Serialize};

use greengrocer_core::{Entity, ItemId, PackSizeId};

/// A sellable pack of an item (e.g. 0.5 kg for 40.0).
///
/// Informational only: order lines carry their own caller-supplied unit price
/// and never consult pack definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSize {
    pub id: PackSizeId,
    pub size: f64,
    pub price: f64,
    pub item_id: ItemId,
}

impl Entity for PackSize {
    type Id = PackSizeId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
