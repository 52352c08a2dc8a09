//! End-to-end integration tests: CSV -> align/window search -> CSV/JSON -> read back.

use std::fs;
use std::path::{Path, PathBuf};

use sigwarp_dtw::{CostMethod, Dtw, LookFor, WindowConfig};
use sigwarp_io::{ExperimentName, PairCost, ResultWriter, SignalPair, SignalReader};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn pair(input: &str) -> SignalPair {
    input.parse().expect("valid pair")
}

#[test]
fn align_round_trip() {
    let table = SignalReader::new(&fixture_path("pair_12.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(table.n_rows(), 12);

    let dtw = Dtw::new();
    let pairs = [pair("ABP_SPO:CBFV_SPO"), pair("CBFV_SPO:CBFV_SPP")];
    let costs: Vec<PairCost> = pairs
        .iter()
        .map(|p| {
            let (x, y) = table.pair(p).unwrap();
            let cost = dtw
                .alignment_cost(x.as_slice(), y.as_slice(), CostMethod::Distance)
                .unwrap();
            PairCost { pair: p.clone(), cost }
        })
        .collect();

    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("align_rt".into()).unwrap()).unwrap();
    let path = writer.write_align(CostMethod::Distance, "standard", &costs).unwrap();

    let content: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(content["experiment"], "align_rt");
    assert_eq!(content["method"], "d-method");
    let entries = content["pairs"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["pair"], "ABP_SPO-CBFV_SPO");
    // identical columns align at zero cost
    assert_eq!(entries[1]["cost"].as_f64().unwrap(), 0.0);
}

#[test]
fn window_table_round_trip() {
    let table = SignalReader::new(&fixture_path("pair_12.csv")).read().unwrap();
    let config = WindowConfig::new(5, 5).unwrap();
    let dtw = Dtw::new();

    let columns: Vec<_> = [pair("ABP_SPO:CBFV_SPO"), pair("ABP_SPO:CBFV_SPP")]
        .into_iter()
        .map(|p| {
            let (x, y) = table.pair(&p).unwrap();
            let costs = dtw
                .sliding_window(x.as_slice(), y.as_slice(), &config, CostMethod::TimeDistance)
                .unwrap();
            (p, costs)
        })
        .collect();

    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("win_rt".into()).unwrap()).unwrap();
    let path = writer.write_window_costs(&columns).unwrap();

    let mut rdr = csv::ReaderBuilder::new().delimiter(b';').from_path(&path).unwrap();
    let header: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header, vec!["Window", "ABP_SPO-CBFV_SPO", "ABP_SPO-CBFV_SPP"]);

    let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "[0, 5]");
    assert_eq!(&rows[1][0], "[5, 10]");
    let first: f64 = rows[0][1].parse().unwrap();
    let second: f64 = rows[1][1].parse().unwrap();
    assert!((first - 3.4).abs() < 1e-12);
    assert!((second - 13.6).abs() < 1e-12);
}

#[test]
fn search_and_render_round_trip() {
    let table = SignalReader::new(&fixture_path("pair_12.csv")).read().unwrap();
    let p = pair("ABP_SPO:CBFV_SPO");
    let (x, y) = table.pair(&p).unwrap();
    let config = WindowConfig::new(5, 5).unwrap();
    let dtw = Dtw::new();

    let search = dtw
        .find_alignment_cost(x.as_slice(), y.as_slice(), &config, CostMethod::EditRatio, LookFor::Min)
        .unwrap();
    assert_eq!(search.extremal, vec![0, 1]);

    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("search_rt".into()).unwrap()).unwrap();
    let path = writer.write_search(&p, CostMethod::EditRatio, &search).unwrap();

    let content: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(content["look_for"], "MIN");
    assert_eq!(content["value"].as_f64().unwrap(), 0.0);
    assert_eq!(content["extremal"].as_array().unwrap().len(), 2);
    assert_eq!(content["costs"].as_array().unwrap().len(), 2);

    for (index, window) in search.extremal_windows() {
        let view = dtw.render_window(x.as_slice(), y.as_slice(), window).unwrap();
        let path = writer.write_alignment_view(&p, index, &view).unwrap();
        assert!(path.ends_with(format!("search_rt_ABP_SPO-CBFV_SPO_w{index}.json")));

        let content: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(content["start"].as_u64().unwrap() as usize, window.start);
        assert_eq!(content["cost_matrix"].as_array().unwrap().len(), 5);
        let steps = content["path"].as_array().unwrap();
        assert_eq!(steps.len(), 5);
        assert!(steps.iter().all(|s| s["step"] == "match"));
    }
}

#[test]
fn missing_column_is_reported() {
    let table = SignalReader::new(&fixture_path("pair_12.csv")).read().unwrap();
    let result = table.pair(&pair("ABP_SPO:Toxa"));
    assert!(matches!(result, Err(sigwarp_io::IoError::MissingColumn { .. })));
}
