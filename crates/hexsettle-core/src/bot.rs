//! Computer-controlled players.
//!
//! Two difficulty levels:
//! - Easy: Random valid moves
//! - Medium: Basic heuristics (production pips, build before ending, rob the leader)

use crate::actions::GameAction;
use crate::board::PlayerId;
use crate::game::GameState;
use crate::topology::NodeId;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
}

/// Production weight of a number token: how many of the 36 dice
/// combinations roll it.
pub fn pips(number: u8) -> u32 {
    match number {
        2..=12 if number != 7 => 6 - u32::from(number.abs_diff(7)),
        _ => 0,
    }
}

/// A bot player that can decide on actions
#[derive(Debug, Clone)]
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose an action, or None when it is not this bot's move
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        if game.active_player() != self.player_id {
            return None;
        }
        let valid_actions = game.valid_actions();
        if valid_actions.is_empty() {
            return None;
        }

        match self.difficulty {
            BotDifficulty::Easy => self.choose_easy(&valid_actions),
            BotDifficulty::Medium => self.choose_medium(game, &valid_actions),
        }
    }

    /// Easy: Just pick a random valid action
    fn choose_easy(&mut self, actions: &[GameAction]) -> Option<GameAction> {
        actions.choose(&mut self.rng).copied()
    }

    /// Medium: Use basic heuristics
    fn choose_medium(&mut self, game: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        if actions.contains(&GameAction::RollDice) {
            return Some(GameAction::RollDice);
        }

        if actions
            .iter()
            .any(|a| matches!(a, GameAction::DiscardCard(_)))
        {
            let hand = game.get_player(self.player_id)?.resources;
            return hand.most_plentiful().map(GameAction::DiscardCard);
        }

        let robber_moves: Vec<_> = actions
            .iter()
            .filter(|a| matches!(a, GameAction::MoveRobber(_)))
            .collect();
        if !robber_moves.is_empty() {
            return robber_moves
                .into_iter()
                .max_by_key(|action| match action {
                    GameAction::MoveRobber(tile) => self.score_robber_spot(game, *tile),
                    _ => i64::MIN,
                })
                .copied();
        }

        let victims: Vec<PlayerId> = actions
            .iter()
            .filter_map(|a| match a {
                GameAction::ChooseVictim(victim) => Some(*victim),
                _ => None,
            })
            .collect();
        if !victims.is_empty() {
            return self.choose_victim(game, &victims);
        }

        // Settlements first, in setup and regular play alike
        let settlement_spots: Vec<NodeId> = actions
            .iter()
            .filter_map(|a| match a {
                GameAction::PlaceSettlement(node) => Some(*node),
                _ => None,
            })
            .collect();
        if !settlement_spots.is_empty() {
            return self
                .rank_settlement_spots(game, &settlement_spots)
                .map(GameAction::PlaceSettlement);
        }

        let cities: Vec<_> = actions
            .iter()
            .filter(|a| matches!(a, GameAction::PlaceCity(_)))
            .collect();
        if let Some(city) = cities.into_iter().max_by_key(|a| match a {
            GameAction::PlaceCity(node) => self.score_node(game, *node),
            _ => 0,
        }) {
            return Some(*city);
        }

        let roads: Vec<_> = actions
            .iter()
            .filter(|a| matches!(a, GameAction::PlaceRoad(_)))
            .collect();
        let must_place = !actions.contains(&GameAction::EndTurn);
        if !roads.is_empty() && (must_place || self.rng.gen_bool(0.3)) {
            return roads.choose(&mut self.rng).map(|a| **a);
        }

        if actions.contains(&GameAction::EndTurn) {
            return Some(GameAction::EndTurn);
        }

        // Fallback to random
        actions.choose(&mut self.rng).copied()
    }

    /// Pick among the three best spots by production
    fn rank_settlement_spots(&mut self, game: &GameState, spots: &[NodeId]) -> Option<NodeId> {
        let mut scored: Vec<_> = spots
            .iter()
            .map(|&node| (node, self.score_node(game, node)))
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let top = scored.iter().take(3).collect::<Vec<_>>();
        top.choose(&mut self.rng).map(|(node, _)| *node)
    }

    /// Sum of pips of the productive tiles around a node
    fn score_node(&self, game: &GameState, node: NodeId) -> u32 {
        game.board
            .tiles_at_node(node)
            .filter_map(|tile| tile.number)
            .map(pips)
            .sum()
    }

    /// Prefer productive tiles next to rich opponents, never our own
    fn score_robber_spot(&self, game: &GameState, tile: usize) -> i64 {
        let Some(target) = game.board.tile(tile) else {
            return i64::MIN;
        };

        let mut score = target.number.map_or(0, |n| i64::from(pips(n)));
        for player_id in game.board.players_adjacent_to_tile(tile) {
            if player_id == self.player_id {
                score -= 20;
            } else if let Some(player) = game.get_player(player_id) {
                score += 5 + i64::from(player.resources.total());
            }
        }

        score
    }

    /// Steal from the victim holding the most cards
    fn choose_victim(&self, game: &GameState, victims: &[PlayerId]) -> Option<GameAction> {
        victims
            .iter()
            .copied()
            .max_by_key(|&victim| {
                game.get_player(victim)
                    .map_or(0, |player| player.resources.total())
            })
            .map(GameAction::ChooseVictim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Resource;
    use crate::config::GameConfig;
    use crate::game::GamePhase;
    use crate::player::ResourceHand;

    fn complete_setup(game: &mut GameState) {
        while matches!(game.phase, GamePhase::Setup { .. }) {
            let action = game.valid_actions()[0];
            game.apply_action(action).unwrap();
        }
    }

    #[test]
    fn test_pips() {
        assert_eq!(pips(2), 1);
        assert_eq!(pips(6), 5);
        assert_eq!(pips(8), 5);
        assert_eq!(pips(12), 1);
        assert_eq!(pips(7), 0);
    }

    #[test]
    fn test_bot_creation() {
        let bot = Bot::with_seed(0, BotDifficulty::Easy, 1);
        assert_eq!(bot.player_id, 0);
        assert_eq!(bot.difficulty, BotDifficulty::Easy);
    }

    #[test]
    fn test_easy_bot_chooses_valid_action() {
        let game = GameState::new(GameConfig::seeded(2, 3)).unwrap();
        let mut bot = Bot::with_seed(0, BotDifficulty::Easy, 3);

        let action = bot.choose_action(&game).unwrap();
        assert!(game.valid_actions().contains(&action));
    }

    #[test]
    fn test_bot_waits_for_its_turn() {
        let game = GameState::new(GameConfig::seeded(2, 3)).unwrap();
        let mut bot = Bot::with_seed(1, BotDifficulty::Medium, 3);
        assert_eq!(bot.choose_action(&game), None);
    }

    #[test]
    fn test_medium_bot_prioritizes_roll() {
        let mut game = GameState::new(GameConfig::seeded(2, 5)).unwrap();
        complete_setup(&mut game);

        let mut bot = Bot::with_seed(game.current_player, BotDifficulty::Medium, 5);
        assert_eq!(bot.choose_action(&game), Some(GameAction::RollDice));
    }

    #[test]
    fn test_medium_bot_discards_most_plentiful() {
        let mut game = GameState::new(GameConfig::seeded(2, 5)).unwrap();
        complete_setup(&mut game);
        game.players[1].resources = ResourceHand::with_amounts(1, 6, 1, 1, 1);
        game.resolve_roll(3, 4).unwrap();

        let mut bot = Bot::with_seed(1, BotDifficulty::Medium, 5);
        assert_eq!(
            bot.choose_action(&game),
            Some(GameAction::DiscardCard(Resource::Sheep))
        );
    }

    #[test]
    fn test_medium_bot_ends_turn_when_broke() {
        let mut game = GameState::new(GameConfig::seeded(2, 5)).unwrap();
        complete_setup(&mut game);
        game.resolve_roll(1, 1).unwrap();
        game.players[0].resources = ResourceHand::new();

        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 5);
        assert_eq!(bot.choose_action(&game), Some(GameAction::EndTurn));
    }

    #[test]
    fn test_medium_bot_moves_robber_off_own_buildings() {
        let mut game = GameState::new(GameConfig::seeded(2, 5)).unwrap();
        complete_setup(&mut game);
        game.phase = GamePhase::Robber;

        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 5);
        let action = bot.choose_action(&game).unwrap();
        assert!(game.valid_actions().contains(&action));
        let GameAction::MoveRobber(tile) = action else {
            panic!("expected a robber move, got {action:?}");
        };
        assert!(!game.board.players_adjacent_to_tile(tile).contains(&0));
    }

    #[test]
    fn test_medium_bot_upgrades_to_city() {
        let mut game = GameState::new(GameConfig::seeded(2, 5)).unwrap();
        complete_setup(&mut game);
        game.resolve_roll(1, 1).unwrap();
        game.players[0].resources = ResourceHand::with_amounts(0, 0, 2, 0, 3);

        let mut bot = Bot::with_seed(0, BotDifficulty::Medium, 5);
        let action = bot.choose_action(&game).unwrap();
        let GameAction::PlaceCity(node) = action else {
            panic!("expected a city, got {action:?}");
        };
        assert!(game.players[0].nodes.contains(&node));
        game.apply_action(action).unwrap();
    }
}
