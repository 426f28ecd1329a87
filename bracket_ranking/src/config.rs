// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The identifier of an item being ranked.
///
/// Items are opaque to the bracket: only their identity matters.
pub type ItemId = String;

/// One side of a matchup.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// The slot fed by the matchup at the given position of the previous round.
    pub fn for_position(position: u32) -> Slot {
        if position % 2 == 0 {
            Slot::A
        } else {
            Slot::B
        }
    }
}

/// One cell of the bracket.
///
/// A cell is identified by its round (1 is the first round, the highest round is the final)
/// and its zero-based position inside the round.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Matchup {
    pub round: u32,
    pub position: u32,
    pub item_a: Option<ItemId>,
    pub item_b: Option<ItemId>,
    pub winner: Option<ItemId>,
}

/// The state of a single matchup.
///
/// `Pending -> ByeResolved` when only one item ever reaches the cell,
/// `Pending -> Voting -> Decided` when two items meet.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum MatchupStatus {
    /// A first round cell that received no item at all. It never produces a winner.
    Empty,
    /// Still waiting for at least one item.
    Pending,
    /// Both items are present, no winner yet.
    Voting,
    /// Decided without a vote because the opponent slot can never be filled.
    ByeResolved,
    /// Decided by a tally.
    Decided,
}

impl Matchup {
    pub fn new(round: u32, position: u32) -> Matchup {
        Matchup {
            round,
            position,
            item_a: None,
            item_b: None,
            winner: None,
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<&ItemId> {
        match slot {
            Slot::A => self.item_a.as_ref(),
            Slot::B => self.item_b.as_ref(),
        }
    }

    pub(crate) fn set_slot(&mut self, slot: Slot, item: ItemId) {
        match slot {
            Slot::A => self.item_a = Some(item),
            Slot::B => self.item_b = Some(item),
        }
    }

    /// The items currently sitting in this cell, A first.
    pub fn occupants(&self) -> Vec<&ItemId> {
        self.item_a.iter().chain(self.item_b.iter()).collect()
    }

    pub fn has_occupant(&self, item: &str) -> bool {
        self.occupants().iter().any(|o| o.as_str() == item)
    }

    /// Both slots are filled.
    pub fn is_populated(&self) -> bool {
        self.item_a.is_some() && self.item_b.is_some()
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// The occupant that did not win. None for byes and undecided cells.
    pub fn loser(&self) -> Option<&ItemId> {
        let winner = self.winner.as_ref()?;
        self.occupants().into_iter().find(|o| *o != winner)
    }

    pub fn status(&self) -> MatchupStatus {
        match (self.occupants().len(), self.is_decided()) {
            (2, true) => MatchupStatus::Decided,
            (2, false) => MatchupStatus::Voting,
            (1, true) => MatchupStatus::ByeResolved,
            (0, false) if self.round == 1 => MatchupStatus::Empty,
            _ => MatchupStatus::Pending,
        }
    }
}

/// A ballot for one matchup.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Vote {
    pub participant: String,
    pub chosen: ItemId,
}

/// A generated bracket: the number of rounds and every cell, sorted by round then position.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Bracket {
    pub total_rounds: u32,
    pub matchups: Vec<Matchup>,
}

// ******** Output data structures *********

/// What happened when tallying a round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RoundOutcome {
    /// The given round was tallied. `decided` lists the (position, winner) pairs.
    Advanced {
        round: u32,
        decided: Vec<(u32, ItemId)>,
    },
    /// No matchup is waiting for a tally: the bracket is complete.
    Complete,
}

/// Errors that prevent the bracket operations from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BracketErrors {
    TooFewItems {
        count: usize,
    },
    DuplicateItem(ItemId),
    /// The bracket has no cell at this coordinate. This indicates a corrupted bracket.
    MissingMatchup {
        round: u32,
        position: u32,
    },
    NotPopulated {
        round: u32,
        position: u32,
    },
    AlreadyDecided {
        round: u32,
        position: u32,
    },
    InvalidChoice {
        round: u32,
        position: u32,
        chosen: ItemId,
    },
    InvalidWinner {
        round: u32,
        position: u32,
        winner: ItemId,
    },
    InvalidTierCount,
}

impl Error for BracketErrors {}

impl Display for BracketErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketErrors::TooFewItems { count } => {
                write!(f, "a bracket needs at least 2 items, got {}", count)
            }
            BracketErrors::DuplicateItem(id) => write!(f, "item {:?} appears more than once", id),
            BracketErrors::MissingMatchup { round, position } => write!(
                f,
                "no matchup at round {} position {}: the bracket is corrupted",
                round, position
            ),
            BracketErrors::NotPopulated { round, position } => write!(
                f,
                "matchup at round {} position {} does not have two items yet",
                round, position
            ),
            BracketErrors::AlreadyDecided { round, position } => write!(
                f,
                "matchup at round {} position {} is already decided",
                round, position
            ),
            BracketErrors::InvalidChoice {
                round,
                position,
                chosen,
            } => write!(
                f,
                "item {:?} is not playing in matchup at round {} position {}",
                chosen, round, position
            ),
            BracketErrors::InvalidWinner {
                round,
                position,
                winner,
            } => write!(
                f,
                "item {:?} cannot win matchup at round {} position {}",
                winner, round, position
            ),
            BracketErrors::InvalidTierCount => write!(f, "the number of tiers must be positive"),
        }
    }
}

// ********* Configuration **********

/// The source of randomness for the seeding shuffle and for tied tallies.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Seeded from the operating system. Every run differs.
    Random,
    /// Reproducible runs.
    Seeded(u64),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BracketRules {
    pub tiebreak_mode: TieBreakMode,
    /// Number of tiers the final ranking is split into.
    pub tier_count: u32,
}

impl BracketRules {
    pub const DEFAULT_RULES: BracketRules = BracketRules {
        tiebreak_mode: TieBreakMode::Random,
        tier_count: 5,
    };
}
