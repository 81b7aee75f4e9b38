use serde::{Deserialize, Serialize};

/// Gamified reward state shown to a tenant.
///
/// `current_discount` mirrors the owning unit's discount only after an
/// explicit reward sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardState {
    pub current_discount: f64,
    /// Estimated rent saved at the current discount (USD).
    pub lifetime_saved_estimate: f64,
    pub streak_days: u32,
    pub badges: Vec<String>,
}

/// A tenant occupying at most one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub unit_id: String,
    pub display_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub reward_state: RewardState,
    #[serde(default)]
    pub acknowledged_suggestion_ids: Vec<String>,
}

impl Tenant {
    pub fn new(
        id: impl Into<String>,
        unit_id: impl Into<String>,
        display_name: impl Into<String>,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            unit_id: unit_id.into(),
            display_name: display_name.into(),
            contact_email: contact_email.into(),
            reward_state: RewardState::default(),
            acknowledged_suggestion_ids: Vec::new(),
        }
    }

    /// Records a suggestion as acknowledged. Returns `false` if it already was.
    pub fn acknowledge(&mut self, suggestion_id: &str) -> bool {
        if self
            .acknowledged_suggestion_ids
            .iter()
            .any(|id| id == suggestion_id)
        {
            return false;
        }
        self.acknowledged_suggestion_ids
            .push(suggestion_id.to_string());
        true
    }
}
