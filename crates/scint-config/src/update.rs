//! Whole-object update transactions for [`SimConfig`].

use scint_core::errors::SimError;

use crate::schema::SimConfig;

/// Collects proposed edits against a base configuration and revalidates the
/// result as one unit. The base value is never modified, and no caller ever
/// observes a partially updated configuration.
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
    draft: SimConfig,
}

impl ConfigUpdate {
    /// Starts a transaction from the given base configuration.
    pub fn new(base: &SimConfig) -> Self {
        Self {
            draft: base.clone(),
        }
    }

    /// Applies an edit closure to the draft. Edits accumulate; nothing is
    /// checked until [`ConfigUpdate::commit`].
    pub fn apply(mut self, edit: impl FnOnce(&mut SimConfig)) -> Self {
        edit(&mut self.draft);
        self
    }

    /// Validates the edited draft and returns it, or the first violated
    /// invariant.
    pub fn commit(self) -> Result<SimConfig, SimError> {
        self.draft.validate()?;
        Ok(self.draft)
    }
}
