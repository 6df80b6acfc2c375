//! End-to-end scoring against models exported by the training tool

use turtle::hashing::{interaction_hash, murmur3_32};
use turtle::{
    Feature, LoaderConfig, Model, Namespace, Request, StorageKind, TurtleError,
};

const QUADRATIC: &str = include_str!("fixtures/quadratic.readable");
const OAA: &str = include_str!("fixtures/oaa.readable");

fn load(text: &str, config: &LoaderConfig) -> Model {
    Model::load_with_config(text.as_bytes(), config).expect("fixture should load")
}

/// Fixture with its options line replaced
fn with_options(text: &str, options: &str) -> String {
    text.lines()
        .map(|line| {
            if line.starts_with("options:") {
                format!("options: {}", options)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quadratic_request() -> Request {
    Request::new(vec![
        Namespace::new("a", vec![Feature::text("x", 1.0), Feature::text("z", 1.0)]),
        Namespace::new("b", vec![Feature::text("x1", 1.0), Feature::text("z1", 1.0)]),
    ])
}

fn oaa_request() -> Request {
    Request::new(vec![Namespace::unnamed(
        (0..7).map(|_| Feature::text("pos", 1.0)).collect(),
    )])
}

#[test]
fn test_quadratic_header() {
    let model = load(QUADRATIC, &LoaderConfig::default());
    assert_eq!(model.weight_bits(), 18);
    assert_eq!(model.mask(), (1 << 18) - 1);
    assert_eq!(model.num_classes(), 1);
    assert_eq!(model.multi_class_bits(), 0);
    assert_eq!(model.min_label(), -1.0);
    assert_eq!(model.max_label(), 1.0);
    assert_eq!(model.interactions().len(), 1);
    assert!(model.interactions().contains(b'a', b'b'));
    assert_eq!(model.metadata().version.as_deref(), Some("8.6.1"));
    assert_eq!(model.metadata().checksum, Some(3_417_833_913));
    // 20 weights is far below 2^18 / 8
    assert_eq!(model.weights().storage(), StorageKind::Sparse);
    assert_eq!(model.weights().non_zero(), 20);
}

#[test]
fn test_quadratic_prediction() {
    let model = load(QUADRATIC, &LoaderConfig::default());
    let pred = model.predict(&quadratic_request());
    assert_eq!(pred, vec![-0.0656607]);
}

#[test]
fn test_quadratic_prediction_dense() {
    let model = load(QUADRATIC, &LoaderConfig::dense());
    assert_eq!(model.weights().storage(), StorageKind::Dense);
    assert_eq!(model.predict(&quadratic_request()), vec![-0.0656607]);
}

#[test]
fn test_quadratic_is_directional() {
    let linear = load(&with_options(QUADRATIC, "--hash_seed 0"), &LoaderConfig::default());
    assert_eq!(linear.predict(&quadratic_request()), vec![-0.1062707]);

    // only (b, a) pairs: none of them carry weight in this model
    let reversed = load(&with_options(QUADRATIC, "--hash_seed 0 --quadratic ba"), &LoaderConfig::default());
    assert_eq!(reversed.predict(&quadratic_request()), vec![-0.1062707]);

    let both = load(
        &with_options(QUADRATIC, "--hash_seed 0 --quadratic ab --quadratic ba"),
        &LoaderConfig::default(),
    );
    assert_eq!(both.predict(&quadratic_request()), vec![-0.0656607]);
}

#[test]
fn test_duplicate_quadratic_counts_twice() {
    let model = load(
        &with_options(QUADRATIC, "--hash_seed 0 --quadratic ab --quadratic ab"),
        &LoaderConfig::default(),
    );
    assert_eq!(model.interactions().len(), 2);
    assert_eq!(model.predict(&quadratic_request()), vec![-0.0250507]);
}

#[test]
fn test_quadratic_matches_manual_sum() {
    let model = load(QUADRATIC, &LoaderConfig::default());
    let weights = model.weights();
    let ns_a = murmur3_32(b"a", 0);
    let ns_b = murmur3_32(b"b", 0);
    let a: Vec<u32> = ["x", "z"].iter().map(|n| murmur3_32(n.as_bytes(), ns_a)).collect();
    let b: Vec<u32> = ["x1", "z1"].iter().map(|n| murmur3_32(n.as_bytes(), ns_b)).collect();

    let mut expected = 0.0f32;
    for hash in a.iter().chain(b.iter()) {
        expected += weights.get(model.bucket(*hash, 0));
    }
    for ha in &a {
        for hb in &b {
            expected += weights.get(model.bucket(interaction_hash(*ha, *hb), 0));
        }
    }
    expected += weights.get(model.bucket(turtle::constants::INTERCEPT_HASH, 0));

    assert_eq!(model.predict(&quadratic_request()), vec![expected]);
}

#[test]
fn test_oaa_header() {
    let model = load(OAA, &LoaderConfig::default());
    assert_eq!(model.num_classes(), 3);
    assert_eq!(model.multi_class_bits(), 2);
    assert!(model.interactions().is_empty());
    assert_eq!(model.weights().non_zero(), 12);
}

#[test]
fn test_oaa_raw_scores() {
    let model = load(OAA, &LoaderConfig::default());
    assert_eq!(model.predict(&oaa_request()), vec![-0.113007, -0.175926, -0.188205]);
}

#[test]
fn test_oaa_probabilities() {
    let model = load(OAA, &LoaderConfig::default());
    let pred = model.predict(&oaa_request().with_probabilities(true));
    assert_eq!(pred, vec![0.34162152, 0.3302915, 0.328087]);

    let sum: f32 = pred.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
}

#[test]
fn test_oaa_dense_and_sparse_agree() {
    let dense = load(OAA, &LoaderConfig::dense());
    let sparse = load(OAA, &LoaderConfig::sparse());
    assert!(!dense.weights().is_sparse());
    assert!(sparse.weights().is_sparse());

    for probabilities in [false, true] {
        let req = oaa_request().with_probabilities(probabilities);
        let lhs: Vec<u32> = dense.predict(&req).iter().map(|v| v.to_bits()).collect();
        let rhs: Vec<u32> = sparse.predict(&req).iter().map(|v| v.to_bits()).collect();
        assert_eq!(lhs, rhs);
    }
}

#[test]
fn test_repeated_prediction_is_bit_identical() {
    let model = load(QUADRATIC, &LoaderConfig::default());
    let req = quadratic_request();
    let hashed = model.hash_request(&req);
    let first = model.predict(&req);
    for _ in 0..10 {
        assert_eq!(model.predict(&req), first);
        assert_eq!(model.predict_hashed(&hashed).unwrap(), first);
    }
}

#[test]
fn test_hash_all_integer_features() {
    // weight under the decimal-string hash of id 42 in namespace "n"
    let ns = murmur3_32(b"n", 0);
    let hashed = murmur3_32(b"42", ns) & 0xFF;
    let offset = 42u32.wrapping_add(ns) & 0xFF;
    assert_ne!(hashed, offset);

    let text = |options: &str| {
        format!(
            "Min label:-5\nMax label:5\nbits:8\noptions: {}\n:0\n{}:1.5\n{}:-2.5\n",
            options, hashed, offset
        )
    };
    let req = Request::new(vec![Namespace::new("n", vec![Feature::id(42, 1.0)])]);

    let hash_all = load(&text("--hash all"), &LoaderConfig::dense());
    let fast_path = load(&text("--hash strings"), &LoaderConfig::dense());
    let intercept = hash_all.weights().get(hash_all.bucket(turtle::constants::INTERCEPT_HASH, 0));

    assert_eq!(hash_all.predict(&req), vec![1.5 + intercept]);
    assert_eq!(fast_path.predict(&req), vec![-2.5 + intercept]);
}

#[test]
fn test_empty_feature_name_uses_id_zero() {
    // id 0 in namespace "n" lands on the namespace hash itself
    let slot = murmur3_32(b"n", 0) & 0xFF;
    assert_eq!(slot, 172);
    let text = |options: &str| {
        format!(
            "Min label:-5\nMax label:5\nbits:8\noptions: {}\n:0\n{}:1.0\n{}:2.0\n",
            options,
            slot,
            murmur3_32(b"0", murmur3_32(b"n", 0)) & 0xFF
        )
    };
    let req = Request::new(vec![Namespace::new("n", vec![Feature::text("", 1.0)])]);

    assert_eq!(load(&text(""), &LoaderConfig::dense()).predict(&req), vec![1.0]);
    let hash_all = load(&text("--hash all"), &LoaderConfig::dense());
    assert_eq!(hash_all.predict(&req), vec![2.0]);
}

#[test]
fn test_concurrent_predictions_share_model() {
    let model = std::sync::Arc::new(load(OAA, &LoaderConfig::default()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = model.clone();
            std::thread::spawn(move || model.predict(&oaa_request()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![-0.113007, -0.175926, -0.188205]);
    }
}

#[test]
fn test_failed_load_yields_no_model() {
    let truncated = QUADRATIC.replace("221854:0.0624969", "221854:");
    let err = Model::load(truncated.as_bytes()).unwrap_err();
    assert!(matches!(err, TurtleError::MalformedNumber { .. }));

    let lenient = Model::load_with_config(truncated.as_bytes(), &LoaderConfig::lenient()).unwrap();
    assert_eq!(lenient.weights().non_zero(), 19);
}
