use std::path::PathBuf;

use crate::config::ConfigError;

/// Reasons an action cannot be carried out. These are expected outcomes:
/// the turn is not spent and the text is shown to the player as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionFailure {
    #[error("That way is blocked.")]
    Blocked,
    #[error("There is nothing there to attack.")]
    NothingToAttack,
    #[error("There is nothing here to pick up.")]
    NothingToPickUp,
    #[error("Your inventory is full.")]
    InventoryFull,
    #[error("You are not carrying that.")]
    NotCarried,
    #[error("That cannot be used.")]
    NotUsable,
    #[error("That cannot be equipped.")]
    NotEquippable,
    #[error("Your health is already full.")]
    AlreadyFullHealth,
    #[error("You cannot target an area that you cannot see.")]
    TargetNotVisible,
    #[error("You must select an enemy to target.")]
    NoTargetSelected,
    #[error("You cannot confuse yourself!")]
    CannotTargetSelf,
    #[error("There are no targets in the radius.")]
    NoTargetsInRadius,
    #[error("No enemy is close enough to strike.")]
    NoTargetInRange,
    #[error("There are no stairs here.")]
    NoStairsHere,
    #[error("Only the living can act.")]
    CannotAct,
}

/// Errors that end or corrupt a session rather than a single action.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("entity {entity} is missing its {component} component")]
    MissingComponent {
        entity: u32,
        component: &'static str,
    },

    #[error("snapshot references unknown entity index {0}")]
    UnknownEntity(u32),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },

    #[error("failed to access save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GameError {
    pub(crate) fn missing(entity: specs::Entity, component: &'static str) -> Self {
        Self::MissingComponent {
            entity: entity.id(),
            component,
        }
    }
}
