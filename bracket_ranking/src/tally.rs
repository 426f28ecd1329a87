use log::{debug, info};
use rand::Rng;
use std::collections::HashMap;

use crate::builder::VoteBook;
use crate::config::*;

/// Counts the votes for each side of a matchup.
///
/// Only the last vote of each participant counts. Votes for an item that is not playing
/// are ignored.
pub fn count_votes(matchup: &Matchup, votes: &[Vote]) -> (u64, u64) {
    let mut latest: HashMap<&str, &str> = HashMap::new();
    for v in votes.iter() {
        latest.insert(v.participant.as_str(), v.chosen.as_str());
    }
    let a = matchup.item_a.as_deref();
    let b = matchup.item_b.as_deref();
    let mut counts = (0, 0);
    for chosen in latest.values() {
        if Some(*chosen) == a {
            counts.0 += 1;
        } else if Some(*chosen) == b {
            counts.1 += 1;
        }
    }
    counts
}

/// Picks the winner of a matchup: the majority, or a coin flip on a tie.
pub fn decide<R: Rng + ?Sized>(
    matchup: &Matchup,
    votes: &[Vote],
    rng: &mut R,
) -> Result<ItemId, BracketErrors> {
    let (round, position) = (matchup.round, matchup.position);
    if matchup.is_decided() {
        return Err(BracketErrors::AlreadyDecided { round, position });
    }
    let (a, b) = match (&matchup.item_a, &matchup.item_b) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(BracketErrors::NotPopulated { round, position }),
    };
    let (count_a, count_b) = count_votes(matchup, votes);
    let winner = if count_a > count_b {
        a
    } else if count_b > count_a {
        b
    } else if rng.gen_bool(0.5) {
        debug!("decide: tie {}-{} broken for {:?}", count_a, count_b, a);
        a
    } else {
        debug!("decide: tie {}-{} broken for {:?}", count_a, count_b, b);
        b
    };
    info!(
        "Round {} position {}: {:?} {} - {} {:?} -> {:?}",
        round, position, a, count_a, count_b, b, winner
    );
    Ok(winner.clone())
}

impl Bracket {
    /// The earliest round that still has a matchup waiting for a tally.
    pub fn current_round(&self) -> Option<u32> {
        (1..=self.total_rounds).find(|r| self.round(*r).any(|m| m.status() == MatchupStatus::Voting))
    }

    /// Tallies every open matchup of the current round and advances the winners.
    ///
    /// Either the whole round is applied or nothing is.
    pub fn tally_and_advance_round<R: Rng + ?Sized>(
        &mut self,
        book: &VoteBook,
        rng: &mut R,
    ) -> Result<RoundOutcome, BracketErrors> {
        let round = match self.current_round() {
            Some(r) => r,
            None => {
                info!("tally_and_advance_round: no open matchup, the bracket is complete");
                return Ok(RoundOutcome::Complete);
            }
        };
        let open: Vec<Matchup> = self
            .round(round)
            .filter(|m| m.status() == MatchupStatus::Voting)
            .cloned()
            .collect();
        info!("Tallying round {} ({} open matchups)", round, open.len());

        let mut working = self.clone();
        let mut decided: Vec<(u32, ItemId)> = Vec::new();
        for m in open.iter() {
            let winner = decide(m, book.votes_for(m.round, m.position), rng)?;
            working.record_winner(m.round, m.position, &winner)?;
            decided.push((m.position, winner));
        }
        *self = working;
        Ok(RoundOutcome::Advanced { round, decided })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn id(s: &str) -> Option<ItemId> {
        Some(s.to_string())
    }

    fn vote(p: &str, c: &str) -> Vote {
        Vote {
            participant: p.to_string(),
            chosen: c.to_string(),
        }
    }

    fn open(a: &str, b: &str) -> Matchup {
        Matchup {
            item_a: id(a),
            item_b: id(b),
            ..Matchup::new(1, 0)
        }
    }

    #[test]
    fn majority_wins() {
        let mut rng = StdRng::seed_from_u64(0);
        let m = open("A", "B");
        let votes = vec![vote("p1", "B"), vote("p2", "A"), vote("p3", "B")];
        assert_eq!(count_votes(&m, &votes), (1, 2));
        assert_eq!(decide(&m, &votes, &mut rng).unwrap(), "B");
    }

    #[test]
    fn only_the_last_vote_of_a_participant_counts() {
        let m = open("A", "B");
        let votes = vec![
            vote("p1", "A"),
            vote("p1", "A"),
            vote("p2", "B"),
            vote("p1", "B"),
            vote("p3", "Z"),
        ];
        assert_eq!(count_votes(&m, &votes), (0, 2));
    }

    #[test]
    fn ties_pick_one_of_the_two_items() {
        let m = open("A", "B");
        let tied = vec![vote("p1", "A"), vote("p2", "B")];
        let none: Vec<Vote> = Vec::new();
        let mut seen_a = false;
        let mut seen_b = false;
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for votes in [&tied, &none] {
                match decide(&m, votes, &mut rng).unwrap().as_str() {
                    "A" => seen_a = true,
                    "B" => seen_b = true,
                    other => panic!("unexpected winner {}", other),
                }
            }
        }
        assert!(seen_a && seen_b);
    }

    #[test]
    fn refuses_closed_matchups() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut m = open("A", "B");
        m.item_b = None;
        assert_eq!(
            decide(&m, &[], &mut rng),
            Err(BracketErrors::NotPopulated {
                round: 1,
                position: 0
            })
        );
        let mut m = open("A", "B");
        m.winner = id("A");
        assert_eq!(
            decide(&m, &[], &mut rng),
            Err(BracketErrors::AlreadyDecided {
                round: 1,
                position: 0
            })
        );
    }

    #[test]
    fn rounds_advance_in_order_until_complete() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = StdRng::seed_from_u64(17);
        for n in 2..=12 {
            let items: Vec<ItemId> = (0..n).map(|i| format!("i{}", i)).collect();
            let mut b = Bracket::create(&items, &mut rng).unwrap();
            let book = VoteBook::new();
            let mut rounds = Vec::new();
            while let RoundOutcome::Advanced { round, decided } =
                b.tally_and_advance_round(&book, &mut rng).unwrap()
            {
                assert!(!decided.is_empty());
                rounds.push(round);
            }
            let expected: Vec<u32> = (1..=b.total_rounds).collect();
            assert_eq!(rounds, expected, "n = {}", n);
            assert!(b.is_complete());
            assert_eq!(
                b.tally_and_advance_round(&book, &mut rng).unwrap(),
                RoundOutcome::Complete
            );
        }
    }

    #[test]
    fn votes_decide_the_round() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut b = Bracket {
            total_rounds: 2,
            matchups: vec![
                open("A", "B"),
                Matchup {
                    item_a: id("C"),
                    item_b: id("D"),
                    ..Matchup::new(1, 1)
                },
                Matchup::new(2, 0),
            ],
        };
        let mut book = VoteBook::new();
        book.cast(&b, 1, 0, "p1", "B").unwrap();
        book.cast(&b, 1, 1, "p1", "C").unwrap();
        book.cast(&b, 1, 1, "p2", "C").unwrap();
        assert_eq!(b.current_round(), Some(1));

        let outcome = b.tally_and_advance_round(&book, &mut rng).unwrap();
        assert_eq!(
            outcome,
            RoundOutcome::Advanced {
                round: 1,
                decided: vec![(0, "B".to_string()), (1, "C".to_string())]
            }
        );
        let last = b.final_matchup().unwrap();
        assert_eq!((last.item_a.clone(), last.item_b.clone()), (id("B"), id("C")));
        assert_eq!(b.current_round(), Some(2));
    }

    #[test]
    fn a_corrupted_bracket_is_left_untouched() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut b = Bracket {
            total_rounds: 2,
            matchups: vec![
                open("A", "B"),
                Matchup {
                    item_a: id("C"),
                    item_b: id("D"),
                    ..Matchup::new(1, 1)
                },
            ],
        };
        let before = b.clone();
        assert_eq!(
            b.tally_and_advance_round(&VoteBook::new(), &mut rng),
            Err(BracketErrors::MissingMatchup {
                round: 2,
                position: 0
            })
        );
        assert_eq!(b, before);
    }
}
