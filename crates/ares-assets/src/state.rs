//! Asset lifecycle states.

use std::fmt;
use std::sync::Arc;

use ares_events::AssetData;

use crate::error::AssetError;

/// Where a record is in its lifecycle.
///
/// ```text
/// Unstaged -> Staged -> Loading -> Loaded -> Unloaded -> Unstaged
///                          |                    |
///                          +-> Failed ----------+
/// ```
///
/// `Failed` may also go back to `Loading` (retry), `Unloaded` may be staged
/// again, and `Loaded` may be replaced in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AssetState {
    /// Not known to the manager.
    #[default]
    Unstaged,
    Staged,
    Loading,
    Loaded,
    Failed,
    Unloaded,
}

impl AssetState {
    pub const fn name(self) -> &'static str {
        match self {
            AssetState::Unstaged => "Unstaged",
            AssetState::Staged => "Staged",
            AssetState::Loading => "Loading",
            AssetState::Loaded => "Loaded",
            AssetState::Failed => "Failed",
            AssetState::Unloaded => "Unloaded",
        }
    }

    /// Whether the lifecycle graph has an edge from `self` to `next`.
    pub const fn can_transition_to(self, next: AssetState) -> bool {
        use AssetState::*;
        matches!(
            (self, next),
            (Unstaged, Staged)
                | (Staged, Loading)
                | (Staged, Unstaged)
                | (Loading, Loaded)
                | (Loading, Failed)
                | (Loaded, Loaded)
                | (Loaded, Unloaded)
                | (Failed, Loading)
                | (Failed, Unloaded)
                | (Unloaded, Staged)
                | (Unloaded, Unstaged)
        )
    }

    pub fn is_loaded(self) -> bool {
        self == AssetState::Loaded
    }
}

impl fmt::Display for AssetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State plus whatever the state owns.
///
/// Data exists only in `Loaded` and an error only in `Failed`.
#[derive(Debug, Clone, Default)]
pub(crate) enum AssetStatus {
    #[default]
    Unstaged,
    Staged,
    Loading,
    Loaded(AssetData),
    Failed(Arc<AssetError>),
    Unloaded,
}

impl AssetStatus {
    pub fn state(&self) -> AssetState {
        match self {
            AssetStatus::Unstaged => AssetState::Unstaged,
            AssetStatus::Staged => AssetState::Staged,
            AssetStatus::Loading => AssetState::Loading,
            AssetStatus::Loaded(_) => AssetState::Loaded,
            AssetStatus::Failed(_) => AssetState::Failed,
            AssetStatus::Unloaded => AssetState::Unloaded,
        }
    }

    pub fn data(&self) -> Option<&AssetData> {
        match self {
            AssetStatus::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<AssetError>> {
        match self {
            AssetStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Move to `next`, dropping whatever the current status owns.
    pub fn transition(&mut self, next: AssetStatus) {
        debug_assert!(
            self.state().can_transition_to(next.state()),
            "illegal asset transition {} -> {}",
            self.state(),
            next.state()
        );
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_edges() {
        use AssetState::*;
        let cycle = [Unstaged, Staged, Loading, Loaded, Unloaded, Unstaged];
        for pair in cycle.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }

        assert!(Loading.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Loading));
        assert!(Unloaded.can_transition_to(Staged));
    }

    #[test]
    fn test_no_skipping_loading() {
        use AssetState::*;
        assert!(!Staged.can_transition_to(Loaded));
        assert!(!Staged.can_transition_to(Failed));
        assert!(!Unstaged.can_transition_to(Loading));
        assert!(!Loading.can_transition_to(Unloaded));
        assert!(!Loaded.can_transition_to(Unstaged));
    }

    #[test]
    fn test_status_owns_data_only_when_loaded() {
        let mut status = AssetStatus::Staged;
        assert!(status.data().is_none());

        status.transition(AssetStatus::Loading);
        status.transition(AssetStatus::Loaded(AssetData::new(1u8)));
        assert_eq!(status.state(), AssetState::Loaded);
        assert!(status.data().is_some());
        assert!(status.error().is_none());

        status.transition(AssetStatus::Unloaded);
        assert!(status.data().is_none());
    }
}
