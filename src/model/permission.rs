use serde::{Deserialize, Serialize};

use super::dto::StudyUserRight;

/// Roles of the signed-in user, resolved once by the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub system_admin: bool,
    #[serde(default)]
    pub expert: bool,
}

impl Session {
    /// Whether the user may administer a study they hold `rights` on.
    ///
    /// Computed once per root; the result is passed unchanged into every mapping call that
    /// builds the subtree below it.
    pub fn can_admin(&self, rights: &[StudyUserRight]) -> bool {
        self.system_admin || (self.expert && rights.contains(&StudyUserRight::CanAdministrate))
    }
}
