use serde::{Deserialize, Serialize};

use greengrocer_core::{AdminId, Entity};

/// Back-office account. Credentials are not modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub email: String,
}

impl Entity for Admin {
    type Id = AdminId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
