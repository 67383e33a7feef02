//! Property-based tests for exact k-NN search.
//!
//! Every search result is checked against a reference list built by scoring
//! the whole database and fully sorting it: ascending distance for L2,
//! descending score for inner product and cosine, ties on ascending id.

use flatknn::distance::renormalize;
use flatknn::{FlatIndex, FlatIndexError, IndexConfig, Metric, Neighbor};
use proptest::prelude::*;

/// Rank key where smaller is nearer; `+ 0.0` folds -0.0 into 0.0.
fn rank_key(metric: Metric, score: f32) -> f32 {
    if metric.is_similarity() {
        -score + 0.0
    } else {
        score + 0.0
    }
}

fn brute_force(metric: Metric, db: &[Vec<f32>], query: &[f32]) -> Vec<Neighbor> {
    let d = query.len();
    let mut query = query.to_vec();
    if metric.normalizes() {
        renormalize(&mut query, d);
    }

    let mut all: Vec<Neighbor> = db
        .iter()
        .enumerate()
        .map(|(id, v)| {
            let mut v = v.clone();
            if metric.normalizes() {
                renormalize(&mut v, d);
            }
            Neighbor::new(id, metric.score(&query, &v))
        })
        .collect();
    all.sort_by(|a, b| {
        rank_key(metric, a.distance)
            .total_cmp(&rank_key(metric, b.distance))
            .then(a.id.cmp(&b.id))
    });
    all
}

fn build(metric: Metric, d: usize, db: &[Vec<f32>]) -> FlatIndex {
    let mut index = FlatIndex::new(d, metric).unwrap();
    index.add(db).unwrap();
    index
}

fn arb_metric() -> impl Strategy<Value = Metric> {
    prop_oneof![
        Just(Metric::L2),
        Just(Metric::InnerProduct),
        Just(Metric::Cosine),
    ]
}

prop_compose! {
    fn arb_case()(d in 1usize..8)(
        metric in arb_metric(),
        d in Just(d),
        db in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, d), 0..40),
        query in prop::collection::vec(-10.0f32..10.0, d),
        k in 1usize..50,
    ) -> (Metric, usize, Vec<Vec<f32>>, Vec<f32>, usize) {
        (metric, d, db, query, k)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn singleton_finds_itself(v in prop::collection::vec(-100.0f32..100.0, 1..32)) {
        let mut index = FlatIndex::new(v.len(), Metric::L2).unwrap();
        index.add(&[v.clone()]).unwrap();
        let results = index.search(&[v], 1).unwrap();
        prop_assert_eq!(results[0].len(), 1);
        prop_assert_eq!(results[0][0].id, 0);
        prop_assert!(results[0][0].distance.abs() < 1e-6);
    }

    #[test]
    fn matches_full_sort((metric, d, db, query, k) in arb_case()) {
        let index = build(metric, d, &db);
        let results = index.search(&[query.clone()], k).unwrap();

        let mut expected = brute_force(metric, &db, &query);
        expected.truncate(k.min(db.len()));
        prop_assert_eq!(&results[0], &expected);
        if metric == Metric::L2 {
            prop_assert!(results[0].iter().all(|n| n.distance >= 0.0));
        }
    }

    #[test]
    fn duplicated_rows_tie_on_id((metric, d, db, query, k) in arb_case()) {
        let doubled: Vec<Vec<f32>> = db.iter().chain(db.iter()).cloned().collect();
        let index = build(metric, d, &doubled);
        let results = index.search(&[query.clone()], k).unwrap();

        let mut expected = brute_force(metric, &doubled, &query);
        expected.truncate(k.min(doubled.len()));
        prop_assert_eq!(&results[0], &expected);

        // every original row precedes its copy
        for pair in results[0].windows(2) {
            if pair[0].distance == pair[1].distance {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn larger_k_extends_smaller_k(
        (metric, d, db, query, k) in arb_case(),
        extra in 1usize..20,
    ) {
        let index = build(metric, d, &db);
        let small = index.search(&[query.clone()], k).unwrap();
        let large = index.search(&[query], k + extra).unwrap();
        prop_assert_eq!(&large[0][..small[0].len()], &small[0][..]);
    }

    #[test]
    fn k_equal_to_size_returns_everything((metric, d, db, query, _k) in arb_case()) {
        prop_assume!(!db.is_empty());
        let index = build(metric, d, &db);
        let results = index.search(&[query], db.len()).unwrap();

        let mut ids: Vec<usize> = results[0].iter().map(|n| n.id).collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..db.len()).collect::<Vec<_>>());
    }

    #[test]
    fn repeated_and_parallel_searches_agree(
        (metric, d, db, query, k) in arb_case(),
        threads in 2usize..5,
    ) {
        let serial = build(metric, d, &db);
        let config = IndexConfig::new(threads);
        let mut parallel = FlatIndex::with_config(d, metric, config).unwrap();
        parallel.add(&db).unwrap();

        let queries: Vec<Vec<f32>> = std::iter::once(query).chain(db.iter().cloned()).collect();
        let first = serial.search(&queries, k).unwrap();
        let second = serial.search(&queries, k).unwrap();
        let third = parallel.search(&queries, k).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &third);
    }

    #[test]
    fn range_search_matches_filter(
        (metric, d, db, query, _k) in arb_case(),
        radius in -200.0f32..200.0,
    ) {
        let index = build(metric, d, &db);
        let results = index.range_search(&[query.clone()], radius).unwrap();

        let expected: Vec<Neighbor> = brute_force(metric, &db, &query)
            .into_iter()
            .filter(|n| {
                if metric.is_similarity() {
                    n.distance > radius
                } else {
                    n.distance < radius
                }
            })
            .collect();
        prop_assert_eq!(&results[0], &expected);
    }

    #[test]
    fn bad_row_leaves_index_unchanged(
        (metric, d, db, _query, _k) in arb_case(),
        bad_at in 0usize..10,
    ) {
        let mut index = build(metric, d, &db);
        let mut batch: Vec<Vec<f32>> = vec![vec![0.5; d]; 10];
        batch[bad_at] = vec![0.5; d + 1];

        let err = index.add(&batch).unwrap_err();
        let expected = FlatIndexError::DimensionMismatch {
            row: bad_at,
            expected: d,
            actual: d + 1,
        };
        prop_assert_eq!(err, expected);
        prop_assert_eq!(index.len(), db.len());
    }
}
