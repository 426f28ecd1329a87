use log::{debug, warn};

use crate::config::*;

impl Bracket {
    /// Records the winner of a matchup and advances it into the next round.
    ///
    /// A decided matchup keeps its winner: recording the same winner again does nothing, and
    /// a different winner is refused.
    pub fn record_winner(&mut self, round: u32, position: u32, winner: &str) -> Result<(), BracketErrors> {
        let m = self
            .matchup_mut(round, position)
            .ok_or(BracketErrors::MissingMatchup { round, position })?;
        if !m.has_occupant(winner) {
            return Err(BracketErrors::InvalidWinner {
                round,
                position,
                winner: winner.to_string(),
            });
        }
        match m.winner.as_deref() {
            Some(w) if w == winner => return Ok(()),
            Some(_) => return Err(BracketErrors::AlreadyDecided { round, position }),
            None => {}
        }
        m.winner = Some(winner.to_string());
        debug!(
            "record_winner: round {} position {} won by {:?}",
            round, position, winner
        );
        self.advance(round, position)
    }

    /// Moves the winner of a decided matchup into its slot of the next round.
    ///
    /// If the destination cell can never receive an opponent, it is decided on the spot and
    /// the winner keeps moving up. Advancing the same matchup twice has no further effect.
    pub fn advance(&mut self, round: u32, position: u32) -> Result<(), BracketErrors> {
        let mut current = (round, position);
        loop {
            let (round, position) = current;
            let source = self
                .matchup(round, position)
                .ok_or(BracketErrors::MissingMatchup { round, position })?;
            let winner = match source.winner.clone() {
                Some(w) => w,
                None => {
                    warn!(
                        "advance: matchup at round {} position {} has no winner, nothing to advance",
                        round, position
                    );
                    return Ok(());
                }
            };
            if round >= self.total_rounds {
                return Ok(());
            }

            let next_round = round + 1;
            let next_position = position / 2;
            let slot = Slot::for_position(position);
            let opponent_is_bye = self.is_dead(round, position ^ 1);

            let dest = self
                .matchup_mut(next_round, next_position)
                .ok_or(BracketErrors::MissingMatchup {
                    round: next_round,
                    position: next_position,
                })?;
            dest.set_slot(slot, winner.clone());
            debug!(
                "advance: {:?} moves to round {} position {} slot {:?}",
                winner, next_round, next_position, slot
            );

            if opponent_is_bye && dest.occupants().len() == 1 {
                debug!(
                    "advance: round {} position {} is a bye for {:?}",
                    next_round, next_position, winner
                );
                dest.winner = Some(winner);
                current = (next_round, next_position);
            } else {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Option<ItemId> {
        Some(s.to_string())
    }

    // A B C D in the first round of a 4 item bracket.
    fn four() -> Bracket {
        Bracket {
            total_rounds: 2,
            matchups: vec![
                Matchup {
                    item_a: id("A"),
                    item_b: id("B"),
                    ..Matchup::new(1, 0)
                },
                Matchup {
                    item_a: id("C"),
                    item_b: id("D"),
                    ..Matchup::new(1, 1)
                },
                Matchup::new(2, 0),
            ],
        }
    }

    #[test]
    fn winners_land_in_the_parity_slot() {
        let mut b = four();
        b.record_winner(1, 1, "D").unwrap();
        assert_eq!(b.matchup(2, 0).unwrap().item_b, id("D"));
        assert_eq!(b.matchup(2, 0).unwrap().item_a, None);
        assert!(!b.matchup(2, 0).unwrap().is_decided());

        b.record_winner(1, 0, "A").unwrap();
        assert_eq!(b.matchup(2, 0).unwrap().item_a, id("A"));
        assert_eq!(b.matchup(2, 0).unwrap().status(), MatchupStatus::Voting);
    }

    #[test]
    fn advancing_twice_is_idempotent() {
        let mut b = four();
        b.record_winner(1, 0, "B").unwrap();
        let once = b.clone();
        b.advance(1, 0).unwrap();
        assert_eq!(b, once);
    }

    #[test]
    fn advancing_the_final_does_nothing() {
        let mut b = four();
        b.record_winner(1, 0, "A").unwrap();
        b.record_winner(1, 1, "C").unwrap();
        b.record_winner(2, 0, "C").unwrap();
        let done = b.clone();
        b.advance(2, 0).unwrap();
        assert_eq!(b, done);
        assert_eq!(b.champion(), id("C").as_ref());
    }

    #[test]
    fn rejects_a_winner_that_is_not_playing() {
        let mut b = four();
        assert_eq!(
            b.record_winner(1, 0, "C"),
            Err(BracketErrors::InvalidWinner {
                round: 1,
                position: 0,
                winner: "C".to_string()
            })
        );
        assert!(!b.matchup(1, 0).unwrap().is_decided());
    }

    #[test]
    fn a_decided_matchup_keeps_its_winner() {
        let mut b = four();
        b.record_winner(1, 0, "A").unwrap();
        b.record_winner(1, 1, "C").unwrap();
        b.record_winner(2, 0, "A").unwrap();
        let done = b.clone();

        assert_eq!(
            b.record_winner(1, 0, "B"),
            Err(BracketErrors::AlreadyDecided {
                round: 1,
                position: 0
            })
        );
        assert_eq!(b, done);
        let fin = b.final_matchup().unwrap();
        assert_eq!(fin.item_a, id("A"));
        assert!(fin.has_occupant(fin.winner.as_ref().unwrap()));

        b.record_winner(1, 0, "A").unwrap();
        b.record_winner(2, 0, "A").unwrap();
        assert_eq!(b, done);
    }

    #[test]
    fn missing_destination_is_reported() {
        let mut b = four();
        b.matchups.retain(|m| m.round == 1);
        assert_eq!(
            b.record_winner(1, 0, "A"),
            Err(BracketErrors::MissingMatchup {
                round: 2,
                position: 0
            })
        );
        assert_eq!(
            b.advance(3, 0),
            Err(BracketErrors::MissingMatchup {
                round: 3,
                position: 0
            })
        );
    }

    #[test]
    fn cascades_through_consecutive_byes() {
        // Five items seated in an eight slot bracket: E has no opponent for two rounds.
        let mut b = Bracket {
            total_rounds: 3,
            matchups: vec![
                Matchup {
                    item_a: id("A"),
                    item_b: id("B"),
                    ..Matchup::new(1, 0)
                },
                Matchup {
                    item_a: id("C"),
                    item_b: id("D"),
                    ..Matchup::new(1, 1)
                },
                Matchup {
                    item_a: id("E"),
                    ..Matchup::new(1, 2)
                },
                Matchup::new(1, 3),
                Matchup::new(2, 0),
                Matchup::new(2, 1),
                Matchup::new(3, 0),
            ],
        };
        b.record_winner(1, 2, "E").unwrap();
        assert_eq!(b.matchup(2, 1).unwrap().winner, id("E"));
        assert_eq!(b.matchup(3, 0).unwrap().item_b, id("E"));
        assert!(!b.matchup(3, 0).unwrap().is_decided());

        // A regular winner does not trigger the cascade.
        b.record_winner(1, 0, "A").unwrap();
        assert_eq!(b.matchup(2, 0).unwrap().item_a, id("A"));
        assert!(!b.matchup(2, 0).unwrap().is_decided());
    }
}
