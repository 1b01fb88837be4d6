//! End-to-end tests: load the fixture CSV, query it, and drive the binding
//! graph the way the GUI does.

use pokedash::bindings::{ChartSettings, InputId, InputValue, OutputId, Selections, build_dashboard};
use pokedash::config::DashboardConfig;
use pokedash::dataset::Dataset;
use pokedash::engine::{Subset, filter_by_types, mean_by_type, top_n_by_total};
use pokedash::error::DashboardError;
use pokedash::table::{TableColumn, TableQuery};
use std::path::Path;
use std::sync::Arc;

fn fixture() -> Dataset {
    Dataset::load(Path::new("testdata/pokedex.csv")).expect("fixture should load")
}

#[test]
fn test_load_fixture() {
    let dataset = fixture();

    assert_eq!(dataset.len(), 12);
    assert_eq!(
        dataset.statistic_columns(),
        ["HP", "Attack", "Defense", "Sp. Atk", "Sp. Def", "Speed"]
    );
    assert_eq!(
        dataset.all_types(),
        ["Electric", "Fire", "Ghost", "Grass", "Psychic", "Rock", "Water"]
    );
    assert_eq!(dataset.types_in_order().first().map(String::as_str), Some("Grass"));

    let charmander = dataset.get("Charmander").expect("Charmander is in the fixture");
    assert_eq!(charmander.bst, 309.0);
    assert_eq!(charmander.height, 0.6);
}

#[test]
fn test_loading_twice_gives_identical_rows() {
    assert_eq!(fixture().rows(), fixture().rows());
}

#[test]
fn test_missing_file_is_a_load_error() {
    let err = Dataset::load(Path::new("testdata/does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, DashboardError::Load(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_engine_queries_on_fixture() {
    let dataset = fixture();

    let means = mean_by_type(&filter_by_types(&dataset, &["Fire", "Water"]), "HP").expect("HP exists");
    assert_eq!(means.get("Fire"), Some(&48.5));
    assert_eq!(means.get("Water"), Some(&51.5));

    // three rows tie on 405 and keep file order
    let top: Vec<&str> = top_n_by_total(&Subset::all(&dataset), 4, false)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(top, ["Raichu", "Ivysaur", "Charmeleon", "Wartortle"]);
}

#[test]
fn test_table_query_on_fixture() {
    let dataset = fixture();
    let speed = dataset.statistic_index("Speed").expect("Speed exists");

    let mut query = TableQuery::default();
    query.set_filter(TableColumn::Statistic(speed), ">= 90");
    let page = query.apply(&dataset, 10);
    let names: Vec<&str> = page.rows.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Pikachu", "Raichu", "Abra"]);

    let page = TableQuery::default().apply(&dataset, 10);
    assert_eq!((page.rows.len(), page.page_count), (10, 2));
}

#[test]
fn test_dashboard_reacts_to_inputs() {
    let dataset = Arc::new(fixture());
    let config = DashboardConfig::default();
    let selections = Selections::defaults(&dataset, &config);
    assert_eq!(selections.selected_types, ["Electric", "Fire", "Ghost"]);
    assert_eq!(selections.selected_type, "Grass");

    let mut graph = build_dashboard(dataset, ChartSettings::from(&config), &selections)
        .expect("bindings register");

    let mean = graph.figure(OutputId::MeanByTypeChart).expect("mean chart");
    assert_eq!(mean.categories, ["Electric", "Fire", "Ghost"]);
    assert_eq!(mean.traces[0].marks[0].y, 47.5);

    let report = graph.set_input(InputId::Statistic, InputValue::Choice("Speed".to_owned()));
    assert_eq!(report.evaluated, ["mean_by_type"]);
    assert!(report.is_clean());

    // a bad statistic leaves the last good chart in place
    let report = graph.set_input(InputId::Statistic, InputValue::Choice("Nope".to_owned()));
    assert_eq!(report.failures.len(), 1);
    let mean = graph.figure(OutputId::MeanByTypeChart).expect("mean chart kept");
    assert_eq!(mean.title, "Mean Speed by type");
    assert!(graph.failure_for_output(OutputId::MeanByTypeChart).is_some());

    let report = graph.set_input(InputId::Statistic, InputValue::Choice("HP".to_owned()));
    assert!(report.is_clean());
    assert!(graph.failure("mean_by_type").is_none());

    let report = graph.set_input(InputId::SelectedTypes, InputValue::Types(Vec::new()));
    assert_eq!(report.evaluated, ["mean_by_type", "physical", "roster"]);
    assert!(graph
        .figure(OutputId::HeightWeightChart)
        .is_some_and(|f| f.is_empty()));
}
