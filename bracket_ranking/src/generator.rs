use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::config::*;

/// The smallest power of two that can seat all the items.
pub fn bracket_size(num_items: usize) -> usize {
    num_items.max(1).next_power_of_two()
}

pub fn total_rounds_for(num_items: usize) -> u32 {
    bracket_size(num_items).trailing_zeros()
}

pub fn matchups_in_round(bracket_size: usize, round: u32) -> usize {
    bracket_size >> round
}

/// Generates the skeleton of a single-elimination bracket.
///
/// The items are shuffled before being seated, so the byes land on random items. Byes are
/// left unresolved: see [`Bracket::create`] for a bracket ready to be voted on.
pub fn generate<R: Rng + ?Sized>(item_ids: &[ItemId], rng: &mut R) -> Result<Bracket, BracketErrors> {
    if item_ids.len() < 2 {
        return Err(BracketErrors::TooFewItems {
            count: item_ids.len(),
        });
    }
    let mut seen: HashSet<&ItemId> = HashSet::new();
    for id in item_ids.iter() {
        if !seen.insert(id) {
            return Err(BracketErrors::DuplicateItem(id.clone()));
        }
    }

    let mut seeding: Vec<ItemId> = item_ids.to_vec();
    seeding.shuffle(rng);
    debug!("generate: seeding order: {:?}", seeding);

    let size = bracket_size(seeding.len());
    let total_rounds = total_rounds_for(seeding.len());
    info!(
        "Generating bracket for {} items: size {}, {} rounds, {} byes",
        seeding.len(),
        size,
        total_rounds,
        size - seeding.len()
    );

    let mut matchups: Vec<Matchup> = Vec::with_capacity(size - 1);
    for idx in 0..matchups_in_round(size, 1) {
        let mut m = Matchup::new(1, idx as u32);
        m.item_a = seeding.get(2 * idx).cloned();
        m.item_b = seeding.get(2 * idx + 1).cloned();
        matchups.push(m);
    }
    for round in 2..=total_rounds {
        for position in 0..matchups_in_round(size, round) {
            matchups.push(Matchup::new(round, position as u32));
        }
    }

    Ok(Bracket {
        total_rounds,
        matchups,
    })
}

impl Bracket {
    /// Generates a bracket and resolves all its byes.
    pub fn create<R: Rng + ?Sized>(item_ids: &[ItemId], rng: &mut R) -> Result<Bracket, BracketErrors> {
        let mut bracket = generate(item_ids, rng)?;
        bracket.resolve_byes()?;
        Ok(bracket)
    }

    /// Decides every first round cell that holds a single item, and advances it.
    pub fn resolve_byes(&mut self) -> Result<(), BracketErrors> {
        let byes: Vec<(u32, ItemId)> = self
            .round(1)
            .filter(|m| !m.is_decided())
            .filter_map(|m| match m.occupants().as_slice() {
                [only] => Some((m.position, (*only).clone())),
                _ => None,
            })
            .collect();
        for (position, item) in byes {
            debug!("resolve_byes: {:?} gets a bye at position {}", item, position);
            self.record_winner(1, position, &item)?;
        }
        Ok(())
    }
}
