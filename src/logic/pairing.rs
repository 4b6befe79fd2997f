//! Round-robin fixture list for one group.

/// Every unordered pair `(teams[i], teams[j])` with `i < j`, `i`-major.
pub fn round_robin_pairings<T: Clone>(teams: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);
    for (i, home) in teams.iter().enumerate() {
        for away in &teams[i + 1..] {
            pairs.push((home.clone(), away.clone()));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn order_is_i_major_j_minor() {
        let pairs = round_robin_pairings(&['a', 'b', 'c', 'd']);
        assert_eq!(
            pairs,
            vec![
                ('a', 'b'),
                ('a', 'c'),
                ('a', 'd'),
                ('b', 'c'),
                ('b', 'd'),
                ('c', 'd')
            ]
        );
    }

    #[test]
    fn n_teams_give_n_choose_2_distinct_pairs() {
        for n in 0..9u32 {
            let teams: Vec<u32> = (0..n).collect();
            let pairs = round_robin_pairings(&teams);
            assert_eq!(pairs.len() as u32, n * n.saturating_sub(1) / 2);
            let unordered: HashSet<(u32, u32)> =
                pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
            assert_eq!(unordered.len(), pairs.len());
            assert!(pairs.iter().all(|(a, b)| a != b));
        }
    }
}
