use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::EnumIs)]
pub enum Outcome {
    #[serde(rename = "draw")]
    Draw,
    #[serde(rename = "win")]
    PlayerWin,
    #[serde(rename = "lose")]
    ComputerWin,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Draw => "It's a Draw!",
            Self::PlayerWin => "You Win!",
            Self::ComputerWin => "Computer Wins!",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub fn resolve(player: Move, computer: Move) -> Outcome {
    use Move::*;

    match (player, computer) {
        _ if player == computer => Outcome::Draw,
        (Rock, Scissors) | (Paper, Rock) | (Scissors, Paper) => Outcome::PlayerWin,
        _ => Outcome::ComputerWin,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub player: u32,
    pub computer: u32,
}

impl Score {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::PlayerWin => self.player = self.player.saturating_add(1),
            Outcome::ComputerWin => self.computer = self.computer.saturating_add(1),
            Outcome::Draw => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_move_draws() {
        for m in Move::ALL {
            assert_eq!(resolve(m, m), Outcome::Draw);
        }
    }

    #[test]
    fn resolve_is_antisymmetric() {
        for a in Move::ALL {
            for b in Move::ALL.into_iter().filter(|b| *b != a) {
                let forward = resolve(a, b);
                let backward = resolve(b, a);
                assert!(!forward.is_draw());
                assert_eq!(forward.is_player_win(), backward.is_computer_win(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn classic_rules() {
        assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::PlayerWin);
        assert_eq!(resolve(Move::Paper, Move::Rock), Outcome::PlayerWin);
        assert_eq!(resolve(Move::Scissors, Move::Paper), Outcome::PlayerWin);
        assert_eq!(resolve(Move::Rock, Move::Paper), Outcome::ComputerWin);
    }

    #[test]
    fn draw_leaves_score_alone() {
        let mut score = Score::default();
        score.record(Outcome::Draw);
        assert_eq!(score, Score::default());

        score.record(Outcome::PlayerWin);
        score.record(Outcome::ComputerWin);
        score.record(Outcome::ComputerWin);
        assert_eq!(score, Score { player: 1, computer: 2 });
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&Outcome::PlayerWin).unwrap(), r#""win""#);
        assert_eq!(serde_json::to_string(&Outcome::ComputerWin).unwrap(), r#""lose""#);
        assert_eq!(Outcome::Draw.to_string(), "It's a Draw!");
    }
}
