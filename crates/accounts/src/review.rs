use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use greengrocer_core::{Entity, ReviewId, UserId};

/// Free-text feedback left by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Review {
    type Id = ReviewId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
