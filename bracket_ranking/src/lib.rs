/*!
Single-elimination brackets for collaborative tier lists.

A bracket is generated from a list of items, participants vote on each head-to-head
matchup, winners advance round after round, and the finished (or partially finished)
bracket is turned back into a total order over the items.

```
use bracket_ranking::*;
use bracket_ranking::builder::VoteBook;
use rand::SeedableRng;

let items: Vec<ItemId> = ["Apple", "Banana", "Cherry"].iter().map(|s| s.to_string()).collect();
let mut rng = rand::rngs::StdRng::seed_from_u64(7);
let mut bracket = Bracket::create(&items, &mut rng)?;

let book = VoteBook::new();
while let RoundOutcome::Advanced { .. } = bracket.tally_and_advance_round(&book, &mut rng)? {}

let ranking = bracket.rank(&items);
assert_eq!(ranking.len(), 3);
assert_eq!(Some(&ranking[0]), bracket.champion());
# Ok::<(), BracketErrors>(())
```
*/

mod advancer;
pub mod builder;
mod config;
mod generator;
pub mod manual;
mod ranker;
mod seed;
mod tally;
mod tiers;

pub use crate::config::*;
pub use crate::generator::{bracket_size, generate, matchups_in_round, total_rounds_for};
pub use crate::ranker::rank;
pub use crate::seed::{rng_for, seed_from_join_code};
pub use crate::tally::{count_votes, decide};
pub use crate::tiers::{assign_tiers, default_tier_labels};

impl Bracket {
    pub fn matchup(&self, round: u32, position: u32) -> Option<&Matchup> {
        self.matchups
            .iter()
            .find(|m| m.round == round && m.position == position)
    }

    pub(crate) fn matchup_mut(&mut self, round: u32, position: u32) -> Option<&mut Matchup> {
        self.matchups
            .iter_mut()
            .find(|m| m.round == round && m.position == position)
    }

    /// All the cells of a round, in storage order.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Matchup> {
        self.matchups.iter().filter(move |m| m.round == round)
    }

    pub fn final_matchup(&self) -> Option<&Matchup> {
        self.matchup(self.total_rounds, 0)
    }

    pub fn champion(&self) -> Option<&ItemId> {
        self.final_matchup().and_then(|m| m.winner.as_ref())
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    /// The items seeded in the first round, by position.
    pub fn items(&self) -> Vec<ItemId> {
        let mut first: Vec<&Matchup> = self.round(1).collect();
        first.sort_by_key(|m| m.position);
        first
            .iter()
            .flat_map(|m| m.occupants())
            .cloned()
            .collect()
    }

    /// True if no first round item can ever reach this cell.
    ///
    /// A slot fed by a dead cell stays empty forever, which turns its sibling into a bye.
    pub(crate) fn is_dead(&self, round: u32, position: u32) -> bool {
        if round == 0 {
            return true;
        }
        let span = 1u64 << (round - 1);
        let lo = position as u64 * span;
        let hi = lo + span;
        self.round(1)
            .filter(|m| (m.position as u64) >= lo && (m.position as u64) < hi)
            .all(|m| m.occupants().is_empty())
    }
}
