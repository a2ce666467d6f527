use bgsim_core::common::load_view_config;
use bgsim_core::domain::{PrimaryChannel, Projection, QueryDescriptor, load_model};
use bgsim_core::modules::{
    CorpusConfig, JsonDirectoryCorpus, SimView, SimulationCorpus, component_livetime,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MODEL: &str = r#"{
  "name": "Detector",
  "children": [
    {
      "name": "Crystal",
      "specs": [
        {"name": "U238", "rate": 2.0, "neutronRate": 0.5},
        {"name": "lab background", "rate": 1.0}
      ]
    },
    {
      "name": "Shield",
      "specs": [{"name": "K-40", "rate": 10.0, "weight": 0.5}]
    }
  ]
}"#;

const VIEW: &str = r#"{
  "detectorMass": 1.0,
  "massUnit": "kg",
  "rateTimeUnit": "second",
  "bins": [0, 1, 2, 3],
  "values": [{"hit": "gammas", "low": 1, "high": 3}],
  "neutronExpansion": true
}"#;

const DOCUMENTS: [(&str, &str); 5] = [
    (
        "crystal_u238_a.json",
        r#"{"nprimaries": 2, "volume": "Crystal", "primary": "92-238",
            "hits": {"gammas": [10, 20, 30], "gammas_bins": [0, 1, 2, 3]}}"#,
    ),
    (
        "crystal_u238_b.json",
        r#"{"nprimaries": 2, "volume": "Crystal", "primary": "92-238",
            "hits": {"gammas": [10, 20, 30]}}"#,
    ),
    (
        "crystal_u238_neutron.json",
        r#"{"nprimaries": 1, "volume": "Crystal", "primary": "neutron", "spectrum": "92-238",
            "hits": {"gammas": [3, 0, 0], "gammas_bins": [0, 1, 2, 3]}}"#,
    ),
    (
        "shield_k40.json",
        r#"{"_id": "k40", "nprimaries": 10, "volume": "Shield", "primary": "19-40",
            "hits": {"gammas": [4, 6], "gammas_bins": [0, 2, 4]}}"#,
    ),
    (
        "shield_th232.json",
        r#"{"nprimaries": 99, "volume": "Shield", "primary": "90-232"}"#,
    ),
];

fn write_fixture(root: &Path) {
    let corpus = root.join("corpus");
    fs::create_dir(&corpus).expect("corpus directory should be created");
    for (name, content) in DOCUMENTS {
        fs::write(corpus.join(name), content).expect("document should be written");
    }
    fs::write(root.join("model.json"), MODEL).expect("model should be written");
    fs::write(root.join("view.json"), VIEW).expect("view should be written");
}

#[test]
fn model_resolves_and_evaluates_end_to_end() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_fixture(temp.path());

    let model = load_model(temp.path().join("model.json")).expect("model should load");
    let config = load_view_config(temp.path().join("view.json")).expect("view should load");
    let corpus =
        JsonDirectoryCorpus::load(&CorpusConfig::new(temp.path().join("corpus"))).expect("corpus");
    assert_eq!(corpus.len(), 5);

    let view = SimView::from_config(&config).expect("view should build");
    let requests = view
        .resolver()
        .resolve_component(&model, true, &corpus, &view.projection())
        .expect("resolution should succeed");

    let labels: Vec<(&str, PrimaryChannel)> = requests
        .iter()
        .map(|request| (request.spec.name.as_str(), request.channel))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("U238", PrimaryChannel::Gamma),
            ("U238", PrimaryChannel::Neutron),
            ("lab background", PrimaryChannel::Gamma),
            ("K-40", PrimaryChannel::Gamma),
        ]
    );

    let evaluations = requests
        .iter()
        .map(|request| view.evaluate_request(request))
        .collect::<Result<Vec<_>, _>>()
        .expect("evaluation should succeed");

    let gamma = &evaluations[0].matches[0];
    assert_eq!(gamma.documents, 2);
    assert_eq!(gamma.livetime, Some(2.0));
    assert_eq!(gamma.values[0].value, Some(50.0));
    assert_eq!(gamma.values[0].unit, "dru");

    let neutron = &evaluations[1].matches[0];
    assert_eq!(neutron.query.primary.as_deref(), Some("neutron"));
    assert_eq!(neutron.query.spectrum.as_deref(), Some("92-238"));
    assert_eq!(neutron.livetime, Some(2.0));
    assert_eq!(neutron.values[0].value, Some(0.0));
    let neutron_spectrum = neutron.spectra[0].spectrum.as_ref().expect("spectrum");
    assert_eq!(neutron_spectrum.values, vec![1.5, 0.0, 0.0]);

    assert!(evaluations[2].is_error());
    assert!(evaluations[2].matches.is_empty());

    let shield = &evaluations[3].matches[0];
    assert_eq!(shield.emission_rate, 5.0);
    assert_eq!(shield.livetime, Some(2.0));
    assert_eq!(shield.values[0].value, Some(5.0));

    assert_eq!(component_livetime(&requests, "92-238"), 2.0);
    assert_eq!(component_livetime(&requests, "neutron"), 2.0);
    assert_eq!(component_livetime(&requests, "19-40"), 2.0);
}

#[test]
fn livetime_projection_leaves_histograms_behind() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_fixture(temp.path());
    let corpus =
        JsonDirectoryCorpus::load(&CorpusConfig::new(temp.path().join("corpus"))).expect("corpus");

    let model = load_model(temp.path().join("model.json")).expect("model should load");
    let shield = model.find("Shield").expect("shield component");
    let requests = SimView::new()
        .resolver()
        .resolve_component(shield, false, &corpus, &Projection::livetime())
        .expect("resolution should succeed");

    assert_eq!(requests.len(), 1);
    let documents = &requests[0].matches[0].documents;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id.as_deref(), Some("k40"));
    assert!(documents[0].hits.is_empty());

    let summary = corpus.summary();
    assert_eq!(summary[0].id.as_deref(), Some("crystal_u238_a"));
    assert_eq!(summary.iter().map(|row| row.nprimaries).sum::<u64>(), 114);

    let vessel = QueryDescriptor::new("Vessel", None);
    let unmatched = corpus
        .fetch(&vessel, &Projection::livetime())
        .expect("fetch");
    assert!(unmatched.is_empty());
}
