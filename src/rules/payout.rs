use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub earning_id: Uuid,
    pub amount: i64,
}

/// Greedy walk over `available` earnings in the given order, taking from each
/// until `amount` is covered. Returns `None` when the earnings cannot cover it.
///
/// Each touched earning is consumed whole by the caller even when only part
/// of it was needed; the allocation records the part applied to the request.
pub fn allocate(available: &[(Uuid, i64)], amount: i64) -> Option<Vec<Allocation>> {
    if amount <= 0 {
        return None;
    }
    let mut remaining = amount;
    let mut allocations = Vec::new();
    for &(earning_id, net) in available {
        if remaining == 0 {
            break;
        }
        if net <= 0 {
            continue;
        }
        let take = net.min(remaining);
        allocations.push(Allocation {
            earning_id,
            amount: take,
        });
        remaining -= take;
    }
    (remaining == 0).then_some(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn takes_earnings_in_order_until_covered() {
        let ids = ids(3);
        let earnings = vec![(ids[0], 1_000), (ids[1], 2_000), (ids[2], 3_000)];
        let allocations = allocate(&earnings, 2_500).expect("covered");
        assert_eq!(
            allocations,
            vec![
                Allocation {
                    earning_id: ids[0],
                    amount: 1_000
                },
                Allocation {
                    earning_id: ids[1],
                    amount: 1_500
                },
            ]
        );
    }

    #[test]
    fn exact_balance_uses_everything() {
        let ids = ids(2);
        let earnings = vec![(ids[0], 700), (ids[1], 300)];
        let allocations = allocate(&earnings, 1_000).expect("covered");
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations.iter().map(|a| a.amount).sum::<i64>(), 1_000);
    }

    #[test]
    fn insufficient_balance_allocates_nothing() {
        let ids = ids(1);
        assert_eq!(allocate(&[(ids[0], 500)], 501), None);
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let ids = ids(1);
        assert_eq!(allocate(&[(ids[0], 500)], 0), None);
    }

    #[test]
    fn skips_empty_earnings() {
        let ids = ids(2);
        let allocations = allocate(&[(ids[0], 0), (ids[1], 400)], 400).expect("covered");
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].earning_id, ids[1]);
    }
}
