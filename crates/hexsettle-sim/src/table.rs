//! A table of bots playing one game.

use hexsettle_core::{
    Bot, BotDifficulty, ConfigError, GameConfig, GameError, GameEvent, GameSnapshot, GameState,
    PlayerId,
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Invalid game config: {0}")]
    Config(#[from] ConfigError),

    #[error("Rejected action: {0}")]
    Game(#[from] GameError),

    #[error("Player {0} has no move")]
    Stalled(PlayerId),
}

/// One game with a bot in every seat
pub struct Table {
    game: GameState,
    bots: Vec<Bot>,
    /// Completed turns of regular play
    turns_played: u32,
    max_turns: u32,
}

impl Table {
    pub fn new(
        config: GameConfig,
        difficulty: BotDifficulty,
        max_turns: u32,
    ) -> Result<Self, TableError> {
        let seed = config.seed;
        let players = config.players;
        let game = GameState::new(config)?;

        let bots = (0..players)
            .map(|seat| match seed {
                Some(seed) => {
                    Bot::with_seed(seat, difficulty, seed.wrapping_add(u64::from(seat) + 1))
                }
                None => Bot::new(seat, difficulty),
            })
            .collect();

        info!(players, ?difficulty, max_turns, "table ready");
        Ok(Self {
            game,
            bots,
            turns_played: 0,
            max_turns,
        })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn is_finished(&self) -> bool {
        self.turns_played >= self.max_turns
    }

    /// Let the active bot make one move
    pub fn step(&mut self) -> Result<Vec<GameEvent>, TableError> {
        let seat = self.game.active_player();
        let bot = self
            .bots
            .get_mut(seat as usize)
            .ok_or(TableError::Stalled(seat))?;
        let action = bot
            .choose_action(&self.game)
            .ok_or(TableError::Stalled(seat))?;

        let events = self.game.apply_action(action)?;
        for event in &events {
            match event {
                GameEvent::DiceRolled { player, total, .. } => {
                    info!(player, total, "dice rolled");
                }
                GameEvent::TurnEnded {
                    player,
                    next_player,
                } => {
                    self.turns_played += 1;
                    info!(player, next_player, turn = self.turns_played, "turn ended");
                }
                GameEvent::PhaseChanged { phase } => {
                    debug!(?phase, "phase changed");
                }
                other => debug!(event = ?other, "event"),
            }
        }
        Ok(events)
    }

    /// Play until the turn limit and return the final state
    pub fn run(&mut self) -> Result<GameSnapshot, TableError> {
        while !self.is_finished() {
            self.step()?;
        }
        Ok(self.game.snapshot())
    }
}
