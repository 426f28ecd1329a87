pub use crate::config::*;

use log::debug;
use std::collections::BTreeMap;

/// A collection of votes, keyed by matchup.
///
/// Each participant holds at most one vote per matchup: voting again replaces the
/// previous choice.
///
/// ```
/// use bracket_ranking::builder::VoteBook;
/// use bracket_ranking::*;
/// # use rand::SeedableRng;
///
/// let items = vec!["Anna".to_string(), "Bob".to_string()];
/// let bracket = Bracket::create(&items, &mut rand::rngs::StdRng::seed_from_u64(1))?;
///
/// let mut book = VoteBook::new();
/// book.cast(&bracket, 1, 0, "alice", "Anna")?;
/// book.cast(&bracket, 1, 0, "alice", "Bob")?;
/// assert_eq!(book.votes_for(1, 0).len(), 1);
///
/// # Ok::<(), BracketErrors>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoteBook {
    votes: BTreeMap<(u32, u32), Vec<Vote>>,
}

impl VoteBook {
    pub fn new() -> VoteBook {
        VoteBook::default()
    }

    /// Casts a vote after checking that the matchup is open and the choice is one of its items.
    pub fn cast(
        &mut self,
        bracket: &Bracket,
        round: u32,
        position: u32,
        participant: &str,
        chosen: &str,
    ) -> Result<(), BracketErrors> {
        let m = bracket
            .matchup(round, position)
            .ok_or(BracketErrors::MissingMatchup { round, position })?;
        if m.is_decided() {
            return Err(BracketErrors::AlreadyDecided { round, position });
        }
        if !m.is_populated() {
            return Err(BracketErrors::NotPopulated { round, position });
        }
        if !m.has_occupant(chosen) {
            return Err(BracketErrors::InvalidChoice {
                round,
                position,
                chosen: chosen.to_string(),
            });
        }
        self.record(
            round,
            position,
            Vote {
                participant: participant.to_string(),
                chosen: chosen.to_string(),
            },
        );
        Ok(())
    }

    /// Stores a vote without any check. Used when loading votes that were validated earlier.
    pub fn record(&mut self, round: u32, position: u32, vote: Vote) {
        let votes = self.votes.entry((round, position)).or_insert_with(Vec::new);
        if let Some(existing) = votes.iter_mut().find(|v| v.participant == vote.participant) {
            debug!(
                "record: {} changes vote at round {} position {}: {:?} -> {:?}",
                vote.participant, round, position, existing.chosen, vote.chosen
            );
            existing.chosen = vote.chosen;
        } else {
            votes.push(vote);
        }
    }

    pub fn votes_for(&self, round: u32, position: u32) -> &[Vote] {
        self.votes
            .get(&(round, position))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All the votes, ordered by round then position.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &Vote)> {
        self.votes
            .iter()
            .flat_map(|((round, position), votes)| votes.iter().map(move |v| (*round, *position, v)))
    }

    pub fn len(&self) -> usize {
        self.votes.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Option<ItemId> {
        Some(s.to_string())
    }

    fn bracket() -> Bracket {
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
                    winner: id("C"),
                    ..Matchup::new(1, 1)
                },
                Matchup {
                    item_b: id("C"),
                    ..Matchup::new(2, 0)
                },
            ],
        }
    }

    #[test]
    fn revote_overwrites() {
        let b = bracket();
        let mut book = VoteBook::new();
        book.cast(&b, 1, 0, "p1", "A").unwrap();
        book.cast(&b, 1, 0, "p2", "A").unwrap();
        book.cast(&b, 1, 0, "p1", "B").unwrap();
        assert_eq!(book.len(), 2);
        let votes = book.votes_for(1, 0);
        assert_eq!(votes[0].participant, "p1");
        assert_eq!(votes[0].chosen, "B");
        assert_eq!(votes[1].chosen, "A");
    }

    #[test]
    fn rejects_votes_on_closed_or_unknown_matchups() {
        let b = bracket();
        let mut book = VoteBook::new();
        assert_eq!(
            book.cast(&b, 1, 0, "p1", "C"),
            Err(BracketErrors::InvalidChoice {
                round: 1,
                position: 0,
                chosen: "C".to_string()
            })
        );
        assert_eq!(
            book.cast(&b, 1, 1, "p1", "C"),
            Err(BracketErrors::AlreadyDecided {
                round: 1,
                position: 1
            })
        );
        assert_eq!(
            book.cast(&b, 2, 0, "p1", "C"),
            Err(BracketErrors::NotPopulated {
                round: 2,
                position: 0
            })
        );
        assert_eq!(
            book.cast(&b, 4, 0, "p1", "C"),
            Err(BracketErrors::MissingMatchup {
                round: 4,
                position: 0
            })
        );
        assert!(book.is_empty());
        assert!(book.votes_for(1, 0).is_empty());
    }

    #[test]
    fn iterates_in_bracket_order() {
        let mut book = VoteBook::new();
        let vote = |p: &str, c: &str| Vote {
            participant: p.to_string(),
            chosen: c.to_string(),
        };
        book.record(2, 0, vote("p1", "C"));
        book.record(1, 1, vote("p1", "D"));
        book.record(1, 0, vote("p1", "A"));
        let coords: Vec<(u32, u32)> = book.iter().map(|(r, p, _)| (r, p)).collect();
        assert_eq!(coords, vec![(1, 0), (1, 1), (2, 0)]);
    }
}
