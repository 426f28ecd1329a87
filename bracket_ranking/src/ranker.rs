use log::{debug, info};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::*;

/// Orders all the items of a bracket, most preferred first.
///
/// When the final is decided, the order is reconstructed by backtracking: every item is
/// placed behind the item that eliminated it, opponents knocked out in later rounds first.
/// Otherwise the items are ordered by how far they went in the bracket.
///
/// The output is a permutation of `all_item_ids`. Items that never faced a real
/// opponent come last, in input order.
pub fn rank(matchups: &[Matchup], total_rounds: u32, all_item_ids: &[ItemId]) -> Vec<ItemId> {
    let final_matchup = matchups
        .iter()
        .find(|m| m.round == total_rounds && m.position == 0);
    match final_matchup {
        Some(fm) if fm.is_decided() => backtracking_rank(matchups, fm, all_item_ids),
        _ => {
            info!("rank: the final is not decided, ranking by elimination round");
            elimination_round_rank(matchups, all_item_ids)
        }
    }
}

fn backtracking_rank(matchups: &[Matchup], final_matchup: &Matchup, all_item_ids: &[ItemId]) -> Vec<ItemId> {
    // For each winner, the opponents it knocked out and the round it happened in.
    let mut defeated: HashMap<&str, Vec<(&str, u32)>> = HashMap::new();
    for m in matchups.iter() {
        if let (Some(winner), Some(loser)) = (m.winner.as_ref(), m.loser()) {
            defeated
                .entry(winner.as_str())
                .or_insert_with(Vec::new)
                .push((loser.as_str(), m.round));
        }
    }

    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.extend(final_matchup.winner.as_deref());
    queue.extend(final_matchup.loser().map(|s| s.as_str()));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut order: Vec<&str> = Vec::new();
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(losers) = defeated.get(id) {
            let mut next: Vec<(&str, u32)> = losers
                .iter()
                .filter(|(loser, _)| !seen.contains(loser))
                .cloned()
                .collect();
            // Stable: opponents from the same round keep their bracket order.
            next.sort_by(|x, y| y.1.cmp(&x.1));
            queue.extend(next.iter().map(|(loser, _)| *loser));
        }
    }
    debug!("backtracking_rank: traversal order: {:?}", order);

    complete_ranking(order, all_item_ids)
}

/// Ranking for a bracket that is still being played.
///
/// Each item is scored by the furthest round it reached. Winners of a decided cell count as
/// having reached the next round, so the champion scores `total_rounds + 1`. Items absent
/// from the bracket score 0.
fn elimination_round_rank(matchups: &[Matchup], all_item_ids: &[ItemId]) -> Vec<ItemId> {
    let mut reached: HashMap<&str, u32> = HashMap::new();
    for m in matchups.iter() {
        for item in m.occupants() {
            let e = reached.entry(item.as_str()).or_insert(0);
            *e = (*e).max(m.round);
        }
        if let Some(w) = m.winner.as_ref() {
            let e = reached.entry(w.as_str()).or_insert(0);
            *e = (*e).max(m.round + 1);
        }
    }

    let mut order: Vec<&str> = Vec::new();
    let mut emitted: HashSet<&str> = HashSet::new();
    for id in all_item_ids.iter() {
        if emitted.insert(id.as_str()) {
            order.push(id.as_str());
        }
    }
    order.sort_by_key(|id| std::cmp::Reverse(reached.get(id).cloned().unwrap_or(0)));
    debug!("elimination_round_rank: {:?}", order);
    order.iter().map(|s| s.to_string()).collect()
}

// Keeps only the requested items, and appends the ones never reached by the traversal.
fn complete_ranking<'a>(order: Vec<&'a str>, all_item_ids: &'a [ItemId]) -> Vec<ItemId> {
    let wanted: HashSet<&str> = all_item_ids.iter().map(|s| s.as_str()).collect();
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut res: Vec<ItemId> = Vec::with_capacity(wanted.len());
    let traversed = order.len();
    for (idx, id) in order
        .into_iter()
        .chain(all_item_ids.iter().map(|s| s.as_str()))
        .enumerate()
    {
        if wanted.contains(id) && emitted.insert(id) {
            if idx >= traversed {
                debug!("complete_ranking: {:?} never played a decided match", id);
            }
            res.push(id.to_string());
        }
    }
    res
}

impl Bracket {
    pub fn rank(&self, all_item_ids: &[ItemId]) -> Vec<ItemId> {
        rank(&self.matchups, self.total_rounds, all_item_ids)
    }
}
