use crate::models::{ProductRecord, Thresholds};

impl Thresholds {
    /// Kept iff a rating was read and both bounds are met. Price plays no part.
    pub fn keep(&self, record: &ProductRecord) -> bool {
        match record.rating {
            Some(rating) => rating >= self.min_rating && record.reviews >= self.min_reviews,
            None => false,
        }
    }
}

pub fn apply(records: Vec<ProductRecord>, thresholds: &Thresholds) -> Vec<ProductRecord> {
    records.into_iter().filter(|r| thresholds.keep(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(price: Option<u64>, rating: Option<f64>, reviews: u64) -> ProductRecord {
        ProductRecord {
            name: "상품".to_string(),
            price,
            rating,
            reviews,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let t = Thresholds::default();
        assert!(t.keep(&record(Some(1000), Some(4.9), 100)));
        assert!(!t.keep(&record(Some(1000), Some(4.89), 100)));
        assert!(!t.keep(&record(Some(1000), Some(4.9), 99)));
    }

    #[test]
    fn missing_rating_never_kept() {
        let t = Thresholds {
            min_rating: 0.0,
            min_reviews: 0,
        };
        assert!(!t.keep(&record(Some(1000), None, 10_000)));
    }

    #[test]
    fn price_does_not_matter() {
        let t = Thresholds::default();
        assert!(t.keep(&record(None, Some(4.95), 1234)));
        assert!(t.keep(&record(Some(0), Some(4.95), 1234)));
    }

    #[test]
    fn unreadable_reviews_pass_zero_threshold() {
        let t = Thresholds {
            min_rating: 4.5,
            min_reviews: 0,
        };
        assert!(t.keep(&record(None, Some(4.5), 0)));
    }

    #[test]
    fn apply_keeps_discovery_order() {
        let t = Thresholds::default();
        let kept = apply(
            vec![
                record(Some(3), Some(5.0), 500),
                record(Some(1), Some(3.0), 500),
                record(Some(2), Some(4.9), 100),
            ],
            &t,
        );
        let prices: Vec<_> = kept.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![Some(3), Some(2)]);
    }
}
