use super::{GameController, GameError, GameResult};
use crate::protocol::Action;
use crate::types::*;

pub const MAX_GROUPS: usize = 3;

/// One team as entered on the setup screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSetup {
    pub name: String,
    pub players: Vec<String>,
}

impl GroupSetup {
    pub fn new<I, S>(name: impl Into<String>, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            players: players.into_iter().map(Into::into).collect(),
        }
    }
}

/// Check group count and that every group and player has a name
pub fn validate_setup(setups: &[GroupSetup]) -> Result<(), String> {
    if setups.is_empty() {
        return Err("At least one group is required".to_string());
    }
    if setups.len() > MAX_GROUPS {
        return Err(format!(
            "At most {} groups can play, got {}",
            MAX_GROUPS,
            setups.len()
        ));
    }

    for (i, setup) in setups.iter().enumerate() {
        if setup.name.trim().is_empty() {
            return Err(format!("Group {} needs a name", i + 1));
        }
        if setup.players.is_empty() {
            return Err(format!("Group '{}' needs at least one player", setup.name.trim()));
        }
        if setup.players.iter().any(|p| p.trim().is_empty()) {
            return Err(format!(
                "Every player in group '{}' needs a name",
                setup.name.trim()
            ));
        }
    }

    Ok(())
}

fn build_group(setup: GroupSetup, jokers: u32) -> Group {
    let players = setup
        .players
        .into_iter()
        .map(|name| Player {
            id: ulid::Ulid::new().to_string(),
            name: name.trim().to_string(),
        })
        .collect();

    Group::new(
        ulid::Ulid::new().to_string(),
        setup.name.trim(),
        players,
        jokers,
    )
}

impl GameController {
    /// Validate the setup and start a new game, replacing any previous one
    pub async fn start_game(&self, setups: Vec<GroupSetup>) -> GameResult<GameState> {
        validate_setup(&setups).map_err(GameError::InvalidSetup)?;

        let jokers = self.config.starting_jokers;
        let groups: Vec<Group> = setups
            .into_iter()
            .map(|setup| build_group(setup, jokers))
            .collect();

        tracing::info!(
            "Starting game with groups: {}",
            groups
                .iter()
                .map(|g| g.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(self.dispatch(Action::StartGame { groups }).await)
    }
}
