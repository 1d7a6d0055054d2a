//! Draws the members of a match group from the candidate pool.

use rand::Rng;
use roster_storage::UserId;

/// Draw up to `num_of_members - 1` distinct users from `candidates` and append `owner`.
///
/// Uses a partial Fisher–Yates shuffle: draw `i` swaps a uniformly chosen
/// element of `candidates[i..]` into slot `i`, so every index stays inside the
/// shrinking unsampled range. A pool smaller than requested is taken whole.
/// The owner and repeated IDs are dropped from the pool before drawing.
pub fn sample_group<R: Rng + ?Sized>(
    mut candidates: Vec<UserId>,
    owner: &UserId,
    num_of_members: usize,
    rng: &mut R,
) -> Vec<UserId> {
    candidates.retain(|id| id != owner);
    let mut seen = std::collections::HashSet::with_capacity(candidates.len());
    candidates.retain(|id| seen.insert(id.clone()));

    let draws = num_of_members.saturating_sub(1).min(candidates.len());
    for i in 0..draws {
        let j = rng.random_range(i..candidates.len());
        candidates.swap(i, j);
    }
    candidates.truncate(draws);
    candidates.push(owner.clone());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn users(n: usize) -> Vec<UserId> {
        (0..n).map(|_| UserId(Uuid::new_v4())).collect()
    }

    fn assert_well_formed(group: &[UserId], owner: &UserId, pool: &[UserId]) {
        assert_eq!(group.last(), Some(owner));
        assert_eq!(group.iter().filter(|id| *id == owner).count(), 1);
        let distinct: HashSet<_> = group.iter().collect();
        assert_eq!(distinct.len(), group.len());
        assert!(group[..group.len() - 1].iter().all(|id| pool.contains(id)));
    }

    #[test]
    fn test_pool_larger_than_group() {
        // pool = {u1,u2,u3}, three members: two drawn plus the owner
        let owner = UserId(Uuid::new_v4());
        let pool = users(3);
        let mut rng = StdRng::seed_from_u64(7);

        let group = sample_group(pool.clone(), &owner, 3, &mut rng);
        assert_eq!(group.len(), 3);
        assert_well_formed(&group, &owner, &pool);
    }

    #[test]
    fn test_empty_pool_yields_owner_only() {
        let owner = UserId(Uuid::new_v4());
        let mut rng = StdRng::seed_from_u64(7);

        let group = sample_group(vec![], &owner, 5, &mut rng);
        assert_eq!(group, vec![owner]);
    }

    #[test]
    fn test_pool_of_two_for_pair() {
        let owner = UserId(Uuid::new_v4());
        let pool = users(2);
        let mut rng = StdRng::seed_from_u64(11);

        let group = sample_group(pool.clone(), &owner, 2, &mut rng);
        assert_eq!(group.len(), 2);
        assert!(pool.contains(&group[0]));
        assert_eq!(group[1], owner);
    }

    #[test]
    fn test_pool_sizes_around_requested_size() {
        let owner = UserId(Uuid::new_v4());
        let requested = 5;
        let mut rng = StdRng::seed_from_u64(42);

        for pool_size in [0, 1, 3, 4, 5, 6, 20] {
            let pool = users(pool_size);
            for _ in 0..50 {
                let group = sample_group(pool.clone(), &owner, requested, &mut rng);
                assert_eq!(group.len(), requested.min(pool_size + 1));
                assert_well_formed(&group, &owner, &pool);
            }
        }
    }

    #[test]
    fn test_single_member_group_is_owner() {
        let owner = UserId(Uuid::new_v4());
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(sample_group(users(10), &owner, 1, &mut rng), vec![owner]);
    }

    #[test]
    fn test_owner_and_duplicates_in_pool_are_ignored() {
        let owner = UserId(Uuid::new_v4());
        let other = UserId(Uuid::new_v4());
        let pool = vec![owner.clone(), other.clone(), other.clone(), owner.clone()];
        let mut rng = StdRng::seed_from_u64(5);

        let group = sample_group(pool, &owner, 4, &mut rng);
        assert_eq!(group, vec![other, owner]);
    }

    #[test]
    fn test_every_candidate_can_be_drawn() {
        let owner = UserId(Uuid::new_v4());
        let pool = users(4);
        let mut rng = StdRng::seed_from_u64(1234);

        let mut drawn = HashSet::new();
        for _ in 0..200 {
            let group = sample_group(pool.clone(), &owner, 2, &mut rng);
            drawn.insert(group[0].clone());
        }
        assert_eq!(drawn.len(), pool.len());
    }

    #[test]
    fn test_same_seed_same_group() {
        let owner = UserId(Uuid::new_v4());
        let pool = users(12);

        let a = sample_group(pool.clone(), &owner, 4, &mut StdRng::seed_from_u64(99));
        let b = sample_group(pool, &owner, 4, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
