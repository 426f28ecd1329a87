use log::debug;

use crate::config::*;

/// Splits a ranking into consecutive tiers of (almost) equal size.
///
/// Every tier gets `N / tier_count` items and the first `N % tier_count` tiers get one
/// more. Tiers may be empty when there are fewer items than tiers.
pub fn assign_tiers(ranked: &[ItemId], tier_count: u32) -> Result<Vec<Vec<ItemId>>, BracketErrors> {
    if tier_count == 0 {
        return Err(BracketErrors::InvalidTierCount);
    }
    let tier_count = tier_count as usize;
    let base = ranked.len() / tier_count;
    let extra = ranked.len() % tier_count;

    let mut tiers: Vec<Vec<ItemId>> = Vec::with_capacity(tier_count);
    let mut rest = ranked;
    for idx in 0..tier_count {
        let size = if idx < extra { base + 1 } else { base };
        let (tier, tail) = rest.split_at(size);
        tiers.push(tier.to_vec());
        rest = tail;
    }
    debug!(
        "assign_tiers: {} items in {} tiers: {:?}",
        ranked.len(),
        tier_count,
        tiers.iter().map(|t| t.len()).collect::<Vec<usize>>()
    );
    Ok(tiers)
}

/// The usual tier names: S, then A, B, C and so on.
pub fn default_tier_labels(tier_count: u32) -> Vec<String> {
    (0..tier_count)
        .map(|idx| match idx {
            0 => "S".to_string(),
            i if i <= 26 => ((b'A' + (i - 1) as u8) as char).to_string(),
            i => format!("T{}", i + 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<ItemId> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn remainder_goes_to_the_first_tiers() {
        let tiers = assign_tiers(&ids(11), 4).unwrap();
        let sizes: Vec<usize> = tiers.iter().map(|t| t.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 2]);
        assert_eq!(tiers[0], vec!["0", "1", "2"]);
        assert_eq!(tiers[3], vec!["9", "10"]);
    }

    #[test]
    fn even_split() {
        let tiers = assign_tiers(&ids(10), 5).unwrap();
        assert!(tiers.iter().all(|t| t.len() == 2));
        let flat: Vec<ItemId> = tiers.into_iter().flatten().collect();
        assert_eq!(flat, ids(10));
    }

    #[test]
    fn fewer_items_than_tiers() {
        let tiers = assign_tiers(&ids(2), 5).unwrap();
        let sizes: Vec<usize> = tiers.iter().map(|t| t.len()).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn zero_tiers_is_an_error() {
        assert_eq!(assign_tiers(&ids(3), 0), Err(BracketErrors::InvalidTierCount));
    }

    #[test]
    fn labels() {
        assert_eq!(default_tier_labels(5), vec!["S", "A", "B", "C", "D"]);
        assert_eq!(default_tier_labels(0), Vec::<String>::new());
        let many = default_tier_labels(29);
        assert_eq!(many[26], "Z");
        assert_eq!(many[27], "T28");
    }
}
