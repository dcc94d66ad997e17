//! Extension action badge: "ON" once at least one mapping is known.

use serde::{Deserialize, Serialize};

pub const BADGE_COLOR: &str = "#5468ff";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Badge {
    pub fn for_mapping_count(count: usize) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            text: "ON".to_string(),
            color: Some(BADGE_COLOR.to_string()),
        }
    }

    pub fn is_on(&self) -> bool {
        !self.text.is_empty()
    }
}
