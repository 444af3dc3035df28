use approx::assert_relative_eq;
use rmst_interactions::{
    Cohort, Distributor, DistributorConfig, FeaturePair, KaplanMeierCurve, RmstError,
    SurvivalData, compute_interactions, io, rmst_difference,
};

fn create_synthetic_data(n_samples: usize, n_features: usize, seed: u64) -> SurvivalData {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);

    let columns: Vec<(String, Vec<f64>)> = (0..n_features)
        .map(|j| {
            let values = (0..n_samples).map(|_| rng.gen_range(-2.0..2.0)).collect();
            (format!("g{}", j), values)
        })
        .collect();

    // first feature drives hazard, the rest is noise
    let mut times = Vec::with_capacity(n_samples);
    let mut events = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let hazard = (0.8 * columns[0].1[i]).exp();
        let u: f64 = rng.gen_range(1e-6..1.0);
        let time = -u.ln() / (0.1 * hazard);
        let censoring_time = rng.gen_range(1.0..20.0);

        if time < censoring_time {
            times.push(time);
            events.push(true);
        } else {
            times.push(censoring_time);
            events.push(false);
        }
    }

    SurvivalData::from_columns(times, events, columns).unwrap()
}

fn fixture_even() -> SurvivalData {
    SurvivalData::from_columns(
        (1..=12).map(f64::from).collect(),
        vec![true, true, true, true, true, true, true, false, true, false, true, false],
        vec![
            // high values die early, low values late
            ("f1".to_string(), vec![9.0, 8.5, 8.0, 7.5, 7.0, 6.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]),
            ("f2".to_string(), vec![0.3, -1.2, 0.8, 0.1, -0.5, 1.1, -0.9, 0.6, -0.2, 1.4, -1.0, 0.2]),
        ],
    )
    .unwrap()
}

fn fixture_odd() -> SurvivalData {
    SurvivalData::from_columns(
        (1..=9).map(f64::from).collect(),
        vec![true, false, true, true, false, true, true, true, false],
        vec![
            ("g1".to_string(), vec![0.5, 2.0, 1.5, 3.0, 0.2, 2.5, 1.0, 0.8, 2.2]),
            ("g2".to_string(), vec![1.0, 0.4, 2.5, 0.3, 1.8, 0.9, 0.1, 2.0, 1.2]),
        ],
    )
    .unwrap()
}

fn score(data: &SurvivalData, a: &str, b: &str) -> rmst_interactions::Result<rmst_interactions::InteractionResult> {
    compute_interactions(
        data.feature(a)?,
        data.feature(b)?,
        data.times(),
        data.events(),
    )
}

#[test]
fn test_km_degenerate_fixture() {
    let events = [true, false, true, true];
    let split = rmst_interactions::split::MedianSplit::new(
        ndarray::Array1::from(vec![1.0, 1.0, 2.0, 2.0]).view(),
    )
    .unwrap();

    let above = KaplanMeierCurve::fit(&split.indicator(Cohort::Above), &events).unwrap();
    assert_eq!(above.survival().to_vec(), vec![1.0, 1.0, 1.0, 0.5, 0.0]);

    let below = KaplanMeierCurve::fit(&split.indicator(Cohort::AtOrBelow), &events).unwrap();
    let s = below.survival();
    assert_eq!(&s.to_vec()[..3], &[1.0, 0.5, 0.5]);
    assert!(s[3].is_nan());
    assert_eq!(below.exhausted_step(below.len()), Some(2));
}

#[test]
fn test_separating_feature_beats_noise() {
    let data = fixture_even();
    let result = score(&data, "f1", "f2").unwrap();

    assert_relative_eq!(result.feature1_rmst, 2.5, epsilon = 1e-10);
    assert_relative_eq!(result.feature2_rmst, 0.25, epsilon = 1e-10);
    assert!(result.feature1_rmst > result.feature2_rmst);

    assert_relative_eq!(result.additive_rmst, 2.5, epsilon = 1e-10);
    assert_relative_eq!(result.competing_rmst, 2.5, epsilon = 1e-10);
    assert_relative_eq!(result.xor_rmst, 1.5, epsilon = 1e-10);

    let rounded = result.rounded();
    assert_eq!(rounded.additive_interaction_score, 0.0);
    assert_eq!(rounded.competing_interaction_score, 0.0);
    assert_eq!(rounded.xor_interaction_score, -1.0);
}

#[test]
fn test_swap_even_fixture() {
    let data = fixture_even();
    let ab = score(&data, "f1", "f2").unwrap();
    let ba = score(&data, "f2", "f1").unwrap();

    assert_eq!(ab.feature1_rmst, ba.feature2_rmst);
    assert_eq!(ab.feature2_rmst, ba.feature1_rmst);
    assert_eq!(ab.additive_rmst, ba.additive_rmst);
    assert_eq!(ab.xor_rmst, ba.xor_rmst);

    // no sample sits on the median of f1 - f2 here, so negating it just
    // swaps the two cohorts and the separation is unchanged
    assert_relative_eq!(ab.competing_rmst, ba.competing_rmst, epsilon = 1e-12);
}

#[test]
fn test_swap_odd_fixture_competing_changes() {
    let data = fixture_odd();
    let ab = score(&data, "g1", "g2").unwrap();
    let ba = score(&data, "g2", "g1").unwrap();

    assert_eq!(ab.additive_rmst, ba.additive_rmst);
    assert_eq!(ab.xor_rmst, ba.xor_rmst);
    assert_relative_eq!(ab.feature1_rmst, 2.0 / 3.0, epsilon = 1e-10);
    assert_relative_eq!(ab.feature2_rmst, 1.9 / 1.5, epsilon = 1e-10);

    // odd n: the sample at the median of g1 - g2 stays in the at-or-below
    // cohort, and after negation it's the same sample, so the cohorts differ
    assert_relative_eq!(ab.competing_rmst, 2.0 / 3.0, epsilon = 1e-10);
    assert_relative_eq!(ba.competing_rmst, 1.5, epsilon = 1e-10);
    assert_relative_eq!(ba.competing_interaction_score, 1.5 - 1.9 / 1.5, epsilon = 1e-10);
}

#[test]
fn test_random_data_properties() {
    for seed in [1, 7, 42] {
        let data = create_synthetic_data(60, 3, seed);
        let events = data.events();

        for name in data.feature_names() {
            let split = rmst_interactions::split::MedianSplit::new(data.feature(name).unwrap()).unwrap();
            let above = KaplanMeierCurve::fit(&split.indicator(Cohort::Above), events).unwrap();
            let below = KaplanMeierCurve::fit(&split.indicator(Cohort::AtOrBelow), events).unwrap();

            for curve in [&above, &below] {
                assert_eq!(curve.len(), data.n_samples() + 1);
                assert_eq!(curve.survival()[0], 1.0);
            }

            let horizon = split.truncation_horizon(data.times(), data.time_limit(75.0).unwrap());
            let grid = rmst_interactions::split::evaluation_grid(data.times(), horizon);
            assert_eq!(
                rmst_difference(&above, &below, &grid).unwrap(),
                rmst_difference(&below, &above, &grid).unwrap()
            );

            // within the grid both curves are proper, non-increasing probabilities
            for curve in [&above, &below] {
                let prefix: Vec<f64> = curve.survival().iter().take(grid.len()).copied().collect();
                assert!(prefix.iter().all(|p| (0.0..=1.0).contains(p)));
                assert!(prefix.windows(2).all(|w| w[1] <= w[0]));
            }
        }

        let ab = score(&data, "g0", "g1").unwrap();
        let ba = score(&data, "g1", "g0").unwrap();
        assert_eq!(ab.additive_rmst, ba.additive_rmst);
        assert_eq!(ab.xor_rmst, ba.xor_rmst);
        assert_eq!(ab.feature1_rmst, ba.feature2_rmst);
        // 60 samples, continuous values: nothing sits on the median
        assert_relative_eq!(ab.competing_rmst, ba.competing_rmst, epsilon = 1e-9);
    }
}

#[test]
fn test_degenerate_pair_reported_not_fatal() {
    let data = SurvivalData::from_columns(
        vec![1.0, 2.0, 3.0, 4.0],
        vec![true, false, true, true],
        vec![
            ("on".to_string(), vec![1.0, 2.0, 3.0, 4.0]),
            ("off".to_string(), vec![5.0; 4]),
        ],
    )
    .unwrap();

    let result = score(&data, "off", "on").unwrap();
    let err = result.first_failure().unwrap();
    assert_eq!(err.status(), "degenerate_split");
    assert!(matches!(err, RmstError::Term { term: rmst_interactions::Term::Feature1, .. }));
    assert_eq!(result.failures.len(), 1);

    // the composites are just shifts/scalings of "on"
    assert!(result.feature1_rmst.is_nan());
    assert!(result.feature2_rmst.is_finite());
    assert_eq!(result.additive_rmst, result.feature2_rmst);
    assert!(result.additive_interaction_score.is_nan());
}

#[test]
fn test_pipeline_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("expression.tsv");
    let pairs_path = dir.path().join("pairs.csv");

    let data = fixture_even();
    let mut text = String::from("sample\ttime\tevent\tf1\tf2\n");
    // write rows in reverse time order to exercise the sort on load
    for i in (0..data.n_samples()).rev() {
        text.push_str(&format!(
            "s{}\t{}\t{}\t{}\t{}\n",
            i,
            data.times()[i],
            u8::from(data.events()[i]),
            data.feature("f1").unwrap()[i],
            data.feature("f2").unwrap()[i],
        ));
    }
    std::fs::write(&data_path, text).unwrap();
    std::fs::write(&pairs_path, "f1,f2\nf2,f1\nf1,missing\n").unwrap();

    let pairs = io::read_pairs(&pairs_path).unwrap();
    let mut rows = Vec::new();
    for worker in 0..2 {
        let distributor =
            Distributor::new(DistributorConfig::new().with_worker(worker, 2).with_threads(2)).unwrap();
        let mine = distributor.assigned(&pairs);
        let features: Vec<String> = mine
            .iter()
            .flat_map(|p| [p.feature1.clone(), p.feature2.clone()])
            .collect();
        let loaded = io::read_survival_data(&data_path, &features).unwrap();
        let outcomes = distributor.run(&loaded, mine).unwrap();

        let out = dir.path().join("results").join(format!("task_{}.csv", worker));
        io::write_results(&out, &outcomes).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        rows.extend(written.lines().skip(1).map(str::to_string));
    }

    assert_eq!(
        rows,
        vec![
            "f1,f2,2.5000,0.2500,2.5000,0.0000,2.5000,0.0000,1.5000,-1.0000,ok",
            "f2,f1,0.2500,2.5000,2.5000,0.0000,2.5000,0.0000,1.5000,-1.0000,ok",
            "f1,missing,NaN,NaN,NaN,NaN,NaN,NaN,NaN,NaN,feature_not_found",
        ]
    );

    assert_eq!(pairs[0], FeaturePair::new("f1", "f2"));
}
