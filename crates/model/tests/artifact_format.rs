use soilscope_model::{
    BaggedForest, Classifier, FeatureSelector, ModelState, Node, PipelineMetadata, PipelineParams,
    RandomForest, SoilPipeline, StandardScaler, Tree, SCALE,
};
use soilscope_types::{IrrigationClass, SoilSample};

fn humidity_pipeline() -> SoilPipeline {
    let scaler = StandardScaler {
        mean: vec![0, 0, 0, 0, 70 * SCALE, 0, 0],
        std: vec![SCALE; 7],
    };
    let selector = FeatureSelector {
        percentile: 80,
        scores: vec![1, 2, 3, 4, 5, 6, 7],
        selected: vec![2, 3, 4, 5, 6],
    };
    let wet = Tree::new(vec![
        Node::internal(0, 2, 0, 1, 2),
        Node::leaf(1, 0),
        Node::leaf(2, SCALE),
    ]);
    let unsure = Tree::new(vec![Node::leaf(0, SCALE / 2)]);
    let classifier = BaggedForest::new(vec![
        RandomForest::new(vec![wet.clone(), wet]),
        RandomForest::new(vec![unsure]),
    ]);
    let metadata = PipelineMetadata {
        created_at: 1_700_000_000,
        train_samples: 1600,
        test_samples: 400,
        test_accuracy: 950_000,
        fingerprint: String::new(),
        params: PipelineParams {
            n_estimators: 2,
            trees_per_estimator: 2,
            max_depth: 1,
            min_samples_leaf: 1,
            min_samples_split: 2,
            max_features: 2,
            percentile: 80,
            test_percent: 20,
            seed: 7,
        },
    };
    SoilPipeline::new(scaler, selector, classifier, metadata).unwrap()
}

fn sample(humidity: f64) -> SoilSample {
    SoilSample {
        nitrogen: 50,
        phosphorus: 40,
        potassium: 30,
        temperature: 25.0,
        humidity,
        ph: 6.5,
        rainfall: 80.0,
    }
}

#[test]
fn canonical_artifact_has_documented_layout() {
    let json = humidity_pipeline().to_canonical_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["version"], 1);
    assert_eq!(value["scale"], SCALE);
    assert_eq!(value["feature_names"][6], "rainfall");
    assert_eq!(value["selector"]["selected"][0], 2);
    let root = &value["classifier"]["estimators"][0]["trees"][0]["nodes"][0];
    assert_eq!(root["feature_idx"], 2);
    assert!(root["leaf"].is_null());
    assert_eq!(value["metadata"]["params"]["seed"], 7);
    assert_eq!(value["metadata"]["fingerprint"].as_str().unwrap().len(), 64);

    assert!(json.starts_with(r#"{"classifier":"#));
    assert!(!json.contains(' '));
}

#[test]
fn bagged_probability_averages_forests() {
    let pipeline = humidity_pipeline();
    // humid: forest A -> SCALE, forest B -> SCALE/2
    assert_eq!(pipeline.predict_proba(&sample(90.0)), (SCALE + SCALE / 2) / 2);
    assert_eq!(pipeline.predict(&sample(90.0)), IrrigationClass::NotNeeded);
    // dry: forest A -> 0, forest B -> SCALE/2
    assert_eq!(pipeline.predict_proba(&sample(40.0)), SCALE / 4);
    assert_eq!(pipeline.predict(&sample(40.0)), IrrigationClass::Needed);
}

#[test]
fn model_state_loads_saved_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("soil_pipeline.json");
    let pipeline = humidity_pipeline();
    pipeline.save_json(&path).unwrap();

    let state = ModelState::load(&path);
    let classifier = state.classifier().expect("model should load");
    assert_eq!(classifier.predict(&sample(90.0)), pipeline.predict(&sample(90.0)));
}

#[test]
fn stale_sidecar_makes_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("soil_pipeline.json");
    humidity_pipeline().save_json(&path).unwrap();
    std::fs::write(path.with_extension("hash"), "00".repeat(32)).unwrap();

    let state = ModelState::load(&path);
    assert!(!state.is_loaded());
}
