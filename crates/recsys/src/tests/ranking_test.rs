//! Ranking invariants over randomized catalogs

use crate::assembler::{build_for_known_user, build_for_new_user};
use crate::catalog::RatingsIndex;
use crate::layout::FeatureLayout;
use crate::model::FnModel;
use crate::predictor::Predictor;
use crate::scaler::ScalerSet;
use crate::types::UserRatings;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;

const GENRES: usize = 4;

fn layout() -> Arc<FeatureLayout> {
    let mut users = vec!["user id".to_string(), "rating count".to_string(), "rating ave".to_string()];
    let mut items = vec!["movie id".to_string(), "year".to_string(), "ave rating".to_string()];
    for g in 0..GENRES {
        users.push(format!("genre {}", g));
        items.push(format!("genre {}", g));
    }
    Arc::new(FeatureLayout::new(users, items, 3, 3).unwrap())
}

fn random_items(rng: &mut StdRng, rows: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, 3 + GENRES), |(i, j)| match j {
        0 => (i as f64) + 1.0,
        1 => 1990.0 + rng.gen_range(0..30) as f64,
        2 => rng.gen_range(0.5..5.0),
        _ => {
            if rng.gen_bool(0.5) {
                1.0
            } else {
                0.0
            }
        }
    })
}

/// Scores each pair by the dot product of the model-input blocks
fn dot_predictor() -> Predictor {
    let model = FnModel::new(|users: ArrayView2<f64>, items: ArrayView2<f64>| {
        Ok((&users * &items).sum_axis(Axis(1)).insert_axis(Axis(1)))
    });
    Predictor::new(Arc::new(model), ScalerSet::identity(), layout(), true)
}

#[test]
fn test_order_is_descending_permutation_with_matching_rows() {
    let mut rng = StdRng::seed_from_u64(17);
    let predictor = dot_predictor();

    for _ in 0..25 {
        let rows = rng.gen_range(0..40);
        let items = random_items(&mut rng, rows);
        let user: Array1<f64> = (0..3 + GENRES).map(|_| rng.gen_range(0.0..5.0)).collect();
        let users = build_for_new_user(user.view(), rows);

        let prediction = predictor.predict(users.view(), items.view()).unwrap();

        let mut seen = prediction.order.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..rows).collect::<Vec<_>>());

        for pair in prediction.scores.as_slice().unwrap().windows(2) {
            assert!(pair[0] >= pair[1]);
        }

        for (k, &i) in prediction.order.iter().enumerate() {
            assert_eq!(prediction.items.row(k), items.row(i));
            assert_eq!(prediction.users.row(k), user.view());
        }

        // ties keep catalog order
        for k in 1..rows {
            if prediction.scores[k - 1] == prediction.scores[k] {
                assert!(prediction.order[k - 1] < prediction.order[k]);
            }
        }
    }
}

#[test]
fn test_truth_marks_exactly_the_rated_items() {
    let mut rng = StdRng::seed_from_u64(99);
    let items = random_items(&mut rng, 30);

    let rated: HashMap<i64, f64> = (1..=30)
        .filter_map(|id| {
            rng.gen_bool(0.3)
                .then(|| (id, rng.gen_range(1..=10) as f64 / 2.0))
        })
        .collect();
    let ratings = RatingsIndex::new(HashMap::from([(5, UserRatings::new(rated.clone()))]));

    let mut user_train = Array2::zeros((3, 3 + GENRES));
    for (row, id) in [4.0, 5.0, 6.0].into_iter().enumerate() {
        user_train[[row, 0]] = id;
        user_train[[row, 3]] = id;
    }

    let vectors = build_for_known_user(5, user_train.view(), items.view(), &ratings)
        .unwrap()
        .unwrap();

    for (i, truth) in vectors.truth.iter().enumerate() {
        let movie_id = items[[i, 0]] as i64;
        match rated.get(&movie_id) {
            Some(rating) => assert_eq!(truth, rating),
            None => assert_eq!(*truth, 0.0),
        }
    }
    for row in vectors.user_vecs.rows() {
        assert_eq!(row, user_train.row(1));
    }
}
