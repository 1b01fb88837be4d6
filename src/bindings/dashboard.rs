//! The dashboard's concrete bindings.
//!
//! | binding         | inputs                               | outputs                              |
//! |-----------------|--------------------------------------|--------------------------------------|
//! | `mean_by_type`  | SelectedTypes, Statistic, Theme      | MeanByTypeChart                      |
//! | `physical`      | SelectedTypes, Theme                 | HeightWeightChart                    |
//! | `type_detail`   | SelectedType, Theme                  | AttackDefenseChart, SpeedHistogram   |
//! | `roster`        | SelectedTypes, RankOrder, Theme      | TypeCountChart, TopTotalChart        |
//! | `table_style`   | Theme                                | TableStyle                           |

use super::{Binding, BindingGraph, InputId, InputValue, OutputId, OutputValue};
use crate::config::DashboardConfig;
use crate::dataset::{Creature, Dataset, TOTAL_COLUMN};
use crate::engine::{self, Subset};
use crate::error::Result;
use crate::figure::{ChartKind, FigureSpec, Mark, TableStyle, Trace};
use crate::theme::{Rgb, Theme};
use crate::utils::fmt_number;
use std::collections::BTreeMap;
use std::sync::Arc;

const SPEED: &str = "Speed";

/// Chart parameters that come from configuration rather than UI inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartSettings {
    pub top_n: usize,
    pub page_size: usize,
    pub histogram_bins: Option<usize>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for ChartSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            top_n: config.top_n,
            page_size: config.page_size,
            histogram_bins: config.histogram_bins,
        }
    }
}

/// Current values of every UI control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selections {
    pub selected_types: Vec<String>,
    pub statistic: String,
    pub selected_type: String,
    pub theme: Theme,
    pub ascending: bool,
}

impl Selections {
    /// Startup selection: the first `default_type_count` sorted types, the
    /// configured statistic (or the first one), the first type by appearance.
    pub fn defaults(dataset: &Dataset, config: &DashboardConfig) -> Self {
        let statistic = if dataset.statistic_index(&config.default_statistic).is_some() {
            config.default_statistic.clone()
        } else {
            dataset
                .statistic_columns()
                .first()
                .cloned()
                .unwrap_or_default()
        };

        Self {
            selected_types: dataset
                .all_types()
                .iter()
                .take(config.default_type_count)
                .cloned()
                .collect(),
            statistic,
            selected_type: dataset.types_in_order().first().cloned().unwrap_or_default(),
            theme: config.theme,
            ascending: false,
        }
    }

    pub fn input_values(&self) -> [(InputId, InputValue); 5] {
        [
            (
                InputId::SelectedTypes,
                InputValue::Types(self.selected_types.clone()),
            ),
            (InputId::Statistic, InputValue::Choice(self.statistic.clone())),
            (
                InputId::SelectedType,
                InputValue::Choice(self.selected_type.clone()),
            ),
            (InputId::Theme, InputValue::Theme(self.theme)),
            (InputId::RankOrder, InputValue::Flag(self.ascending)),
        ]
    }
}

/// Registers the dashboard bindings, seeds the inputs from `selections` and
/// runs every binding once.
pub fn build_dashboard(
    dataset: Arc<Dataset>,
    settings: ChartSettings,
    selections: &Selections,
) -> Result<BindingGraph> {
    let mut graph = BindingGraph::new(dataset);

    graph.register(Binding::new(
        "mean_by_type",
        [InputId::SelectedTypes, InputId::Statistic, InputId::Theme],
        [OutputId::MeanByTypeChart],
        |dataset, inputs| {
            let figure = mean_by_type_chart(
                dataset,
                inputs.types(InputId::SelectedTypes)?,
                inputs.choice(InputId::Statistic)?,
                inputs.theme(InputId::Theme)?,
            )?;
            Ok(vec![OutputValue::Figure(figure)])
        },
    ))?;

    graph.register(Binding::new(
        "physical",
        [InputId::SelectedTypes, InputId::Theme],
        [OutputId::HeightWeightChart],
        |dataset, inputs| {
            let figure = height_weight_chart(
                dataset,
                inputs.types(InputId::SelectedTypes)?,
                inputs.theme(InputId::Theme)?,
            );
            Ok(vec![OutputValue::Figure(figure)])
        },
    ))?;

    graph.register(Binding::new(
        "type_detail",
        [InputId::SelectedType, InputId::Theme],
        [OutputId::AttackDefenseChart, OutputId::SpeedHistogram],
        move |dataset, inputs| {
            let type_name = inputs.choice(InputId::SelectedType)?;
            let theme = inputs.theme(InputId::Theme)?;
            let scatter = attack_defense_chart(dataset, type_name, theme)?;
            let histogram = speed_histogram(dataset, type_name, theme, settings.histogram_bins)?;
            Ok(vec![
                OutputValue::Figure(scatter),
                OutputValue::Figure(histogram),
            ])
        },
    ))?;

    graph.register(Binding::new(
        "roster",
        [InputId::SelectedTypes, InputId::RankOrder, InputId::Theme],
        [OutputId::TypeCountChart, OutputId::TopTotalChart],
        move |dataset, inputs| {
            let types = inputs.types(InputId::SelectedTypes)?;
            let ascending = inputs.flag(InputId::RankOrder)?;
            let theme = inputs.theme(InputId::Theme)?;
            Ok(vec![
                OutputValue::Figure(type_count_chart(dataset, types, theme)?),
                OutputValue::Figure(top_total_chart(
                    dataset,
                    types,
                    settings.top_n,
                    ascending,
                    theme,
                )),
            ])
        },
    ))?;

    graph.register(Binding::new(
        "table_style",
        [InputId::Theme],
        [OutputId::TableStyle],
        move |_, inputs| {
            let theme = inputs.theme(InputId::Theme)?;
            Ok(vec![OutputValue::Table(TableStyle::for_theme(
                theme,
                settings.page_size,
            ))])
        },
    ))?;

    for (id, value) in selections.input_values() {
        graph.seed_input(id, value);
    }
    let report = graph.evaluate_all();
    tracing::info!(
        bindings = report.evaluated.len(),
        failures = report.failures.len(),
        "Dashboard bindings evaluated"
    );
    Ok(graph)
}

fn type_color(dataset: &Dataset, theme: Theme, type_name: &str) -> Rgb {
    theme.series_color(dataset.type_index(type_name).unwrap_or(0))
}

/// One trace per type, in type order, each coloured by its type.
fn traces_by_type<'a>(
    dataset: &Dataset,
    theme: Theme,
    marks: impl IntoIterator<Item = (&'a str, Mark)>,
) -> Vec<Trace> {
    let mut grouped: BTreeMap<&str, Vec<Mark>> = BTreeMap::new();
    for (type_name, mark) in marks {
        grouped.entry(type_name).or_default().push(mark);
    }
    grouped
        .into_iter()
        .map(|(type_name, marks)| Trace {
            name: type_name.to_owned(),
            color: type_color(dataset, theme, type_name),
            marks,
        })
        .collect()
}

/// Adds `field: value` hover lines for each statistic the dataset has.
fn hover_stats(dataset: &Dataset, row: &Creature, mut mark: Mark, fields: &[&str]) -> Mark {
    for field in fields {
        if let Some(value) = dataset.statistic_index(field).and_then(|i| row.stat(i)) {
            mark = mark.with_hover(*field, fmt_number(value));
        }
    }
    mark
}

/// Bar chart of the mean of `statistic` for each selected type.
pub fn mean_by_type_chart(
    dataset: &Dataset,
    selected_types: &[String],
    statistic: &str,
    theme: Theme,
) -> Result<FigureSpec> {
    let subset = engine::filter_by_types(dataset, selected_types);
    let means = engine::mean_by_type(&subset, statistic)?;

    let mut figure = FigureSpec::new(ChartKind::Bar, format!("Mean {statistic} by type"), theme)
        .with_axes("Type", statistic);
    figure.value_decimals = Some(2);
    figure.categories = means.keys().cloned().collect();
    figure.traces = means
        .iter()
        .enumerate()
        .map(|(i, (type_name, mean))| Trace {
            name: type_name.clone(),
            color: type_color(dataset, theme, type_name),
            marks: vec![Mark::new(i as f64, *mean).with_text(format!("{mean:.2}"))],
        })
        .collect();
    Ok(figure)
}

/// Height against weight for every row of the selected types.
pub fn height_weight_chart(dataset: &Dataset, selected_types: &[String], theme: Theme) -> FigureSpec {
    let subset = engine::filter_by_types(dataset, selected_types);
    let points = engine::height_weight_pairs(&subset);

    let marks = subset.rows().zip(points).map(|(row, point)| {
        let mark = Mark::new(point.height, point.weight)
            .with_hover("Name", point.name)
            .with_hover("Type", point.type_name);
        (
            point.type_name,
            hover_stats(dataset, row, mark, &["HP", "Attack", "Defense"]),
        )
    });

    let mut figure = FigureSpec::new(ChartKind::Scatter, "Height vs weight", theme)
        .with_axes("Height (m)", "Weight (kg)");
    figure.traces = traces_by_type(dataset, theme, marks);
    figure
}

/// Attack against defense within one type, each point labelled with its name.
pub fn attack_defense_chart(dataset: &Dataset, type_name: &str, theme: Theme) -> Result<FigureSpec> {
    let subset = engine::filter_by_type(dataset, type_name);
    let pairs = engine::attack_defense_pairs(&subset)?;

    let marks = pairs
        .iter()
        .map(|pair| {
            let mark = Mark::new(pair.x, pair.y)
                .with_text(pair.creature.name.clone())
                .with_hover("Name", pair.creature.name.clone());
            hover_stats(dataset, pair.creature, mark, &["Attack", "Defense", "HP", SPEED])
        })
        .collect();

    let mut figure = FigureSpec::new(
        ChartKind::Scatter,
        format!("Attack vs defense: {type_name}"),
        theme,
    )
    .with_axes("Attack", "Defense");
    figure.traces = vec![Trace {
        name: type_name.to_owned(),
        color: type_color(dataset, theme, type_name),
        marks,
    }];
    Ok(figure)
}

/// Distribution of speed within one type.
pub fn speed_histogram(
    dataset: &Dataset,
    type_name: &str,
    theme: Theme,
    bins: Option<usize>,
) -> Result<FigureSpec> {
    let subset = engine::filter_by_type(dataset, type_name);
    let histogram = engine::histogram_buckets(&subset, SPEED, bins)?;

    let marks = histogram
        .buckets()
        .map(|(bucket, count)| {
            Mark::new(bucket.center(), count as f64)
                .with_hover(
                    SPEED,
                    format!("{}–{}", fmt_number(bucket.start), fmt_number(bucket.end)),
                )
                .with_hover("Count", count.to_string())
        })
        .collect();

    let mut figure = FigureSpec::new(
        ChartKind::Histogram,
        format!("Speed distribution: {type_name}"),
        theme,
    )
    .with_axes(SPEED, "Count");
    figure.bar_width = Some(histogram.bin_width);
    figure.value_decimals = Some(0);
    figure.traces = vec![Trace {
        name: type_name.to_owned(),
        color: type_color(dataset, theme, type_name),
        marks,
    }];
    Ok(figure)
}

/// Number of creatures per selected type, most common first.
pub fn type_count_chart(
    dataset: &Dataset,
    selected_types: &[String],
    theme: Theme,
) -> Result<FigureSpec> {
    let subset = engine::filter_by_types(dataset, selected_types);
    let counts = engine::count_by_type(&subset)?;
    let ranked = engine::ranked_counts(&counts);

    let mut figure = FigureSpec::new(ChartKind::Bar, "Creatures per type", theme)
        .with_axes("Type", "Count");
    figure.value_decimals = Some(0);
    figure.categories = ranked.iter().map(|(t, _)| (*t).to_owned()).collect();
    figure.traces = ranked
        .iter()
        .enumerate()
        .map(|(i, &(type_name, count))| Trace {
            name: type_name.to_owned(),
            color: type_color(dataset, theme, type_name),
            marks: vec![Mark::new(i as f64, count as f64).with_text(count.to_string())],
        })
        .collect();
    Ok(figure)
}

/// Rows of the selected types with the highest (or lowest) base stat total.
pub fn top_total_chart(
    dataset: &Dataset,
    selected_types: &[String],
    n: usize,
    ascending: bool,
    theme: Theme,
) -> FigureSpec {
    let subset: Subset<'_> = engine::filter_by_types(dataset, selected_types);
    let top = engine::top_n_by_total(&subset, n, ascending);

    let title = if ascending {
        format!("Bottom {n} by {TOTAL_COLUMN}")
    } else {
        format!("Top {n} by {TOTAL_COLUMN}")
    };
    let mut figure = FigureSpec::new(ChartKind::Bar, title, theme).with_axes("Name", TOTAL_COLUMN);
    figure.value_decimals = Some(0);
    figure.categories = top.iter().map(|row| row.name.clone()).collect();
    figure.traces = traces_by_type(
        dataset,
        theme,
        top.iter().enumerate().map(|(i, row)| {
            (
                row.type_name.as_str(),
                Mark::new(i as f64, row.bst)
                    .with_text(fmt_number(row.bst))
                    .with_hover("Name", row.name.clone())
                    .with_hover("Type", row.type_name.clone())
                    .with_hover(TOTAL_COLUMN, fmt_number(row.bst)),
            )
        }),
    );
    figure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::InputValue;

    fn dataset() -> Arc<Dataset> {
        let stats = ["HP", "Attack", "Defense", "Speed"]
            .map(str::to_owned)
            .to_vec();
        let row = |name: &str, t: &str, s: [f64; 4]| Creature::new(name, t, 1.0, 10.0, s.to_vec());
        Arc::new(
            Dataset::from_rows(
                stats,
                vec![
                    row("Charmander", "Fire", [39.0, 52.0, 43.0, 65.0]),
                    row("Squirtle", "Water", [44.0, 48.0, 65.0, 43.0]),
                    row("Vulpix", "Fire", [38.0, 41.0, 40.0, 65.0]),
                    row("Bulbasaur", "Grass", [45.0, 49.0, 49.0, 45.0]),
                    row("Psyduck", "Water", [50.0, 52.0, 48.0, 55.0]),
                    row("Abra", "Psychic", [25.0, 20.0, 15.0, 90.0]),
                ],
            )
            .expect("valid rows"),
        )
    }

    fn graph() -> BindingGraph {
        let ds = dataset();
        let selections = Selections::defaults(&ds, &DashboardConfig::default());
        build_dashboard(ds, ChartSettings::default(), &selections).expect("bindings register")
    }

    #[test]
    fn test_defaults() {
        let ds = dataset();
        let s = Selections::defaults(&ds, &DashboardConfig::default());
        assert_eq!(s.selected_types, ["Fire", "Grass", "Psychic"]);
        assert_eq!(s.statistic, "HP");
        assert_eq!(s.selected_type, "Fire");
        assert_eq!(s.theme, Theme::Light);
    }

    #[test]
    fn test_default_statistic_falls_back_to_first_column() {
        let ds = dataset();
        let config = DashboardConfig {
            default_statistic: "Luck".to_owned(),
            ..DashboardConfig::default()
        };
        assert_eq!(Selections::defaults(&ds, &config).statistic, "HP");
    }

    #[test]
    fn test_every_output_filled_at_startup() {
        let graph = graph();
        for id in [
            OutputId::MeanByTypeChart,
            OutputId::HeightWeightChart,
            OutputId::AttackDefenseChart,
            OutputId::SpeedHistogram,
            OutputId::TypeCountChart,
            OutputId::TopTotalChart,
            OutputId::TableStyle,
        ] {
            assert!(graph.output(id).is_some(), "{id:?} missing");
        }
    }

    #[test]
    fn test_mean_chart_values() {
        let ds = dataset();
        let fig = mean_by_type_chart(
            &ds,
            &["Fire".to_owned(), "Water".to_owned()],
            "Attack",
            Theme::Light,
        )
        .expect("valid statistic");
        assert_eq!(fig.categories, ["Fire", "Water"]);
        assert_eq!(fig.title, "Mean Attack by type");
        let ys: Vec<f64> = fig.traces.iter().map(|t| t.marks[0].y).collect();
        assert!((ys[0] - 46.5).abs() < 1e-9);
        assert!((ys[1] - 50.0).abs() < 1e-9);
        assert_eq!(fig.traces[0].marks[0].text.as_deref(), Some("46.50"));
    }

    #[test]
    fn test_statistic_change_updates_only_mean_chart() {
        let mut graph = graph();
        let before = graph.figure(OutputId::HeightWeightChart).cloned();
        let report = graph.set_input(InputId::Statistic, InputValue::Choice("Speed".to_owned()));
        assert_eq!(report.evaluated, ["mean_by_type"]);
        assert_eq!(
            graph.figure(OutputId::MeanByTypeChart).map(|f| f.y_label.as_str()),
            Some("Speed")
        );
        assert_eq!(graph.figure(OutputId::HeightWeightChart).cloned(), before);
    }

    #[test]
    fn test_invalid_statistic_surfaces_as_failure() {
        let mut graph = graph();
        let report = graph.set_input(
            InputId::Statistic,
            InputValue::Choice("NotAColumn".to_owned()),
        );
        assert_eq!(report.failures.len(), 1);
        assert!(graph.failure_for_output(OutputId::MeanByTypeChart).is_some());
        // last good chart still shown
        assert_eq!(
            graph.figure(OutputId::MeanByTypeChart).map(|f| f.y_label.as_str()),
            Some("HP")
        );
    }

    #[test]
    fn test_unknown_type_gives_empty_charts() {
        let mut graph = graph();
        let report = graph.set_input(
            InputId::SelectedTypes,
            InputValue::Types(vec!["Ghost".to_owned()]),
        );
        assert!(report.is_clean());
        assert_eq!(report.evaluated, ["mean_by_type", "physical", "roster"]);
        for id in [
            OutputId::MeanByTypeChart,
            OutputId::HeightWeightChart,
            OutputId::TypeCountChart,
            OutputId::TopTotalChart,
        ] {
            assert!(graph.figure(id).is_some_and(FigureSpec::is_empty), "{id:?}");
        }

        let report = graph.set_input(InputId::SelectedType, InputValue::Choice("Ghost".to_owned()));
        assert!(report.is_clean());
        assert!(graph
            .figure(OutputId::SpeedHistogram)
            .is_some_and(FigureSpec::is_empty));
    }

    #[test]
    fn test_type_detail_updates_both_outputs() {
        let mut graph = graph();
        let report = graph.set_input(InputId::SelectedType, InputValue::Choice("Water".to_owned()));
        assert_eq!(report.evaluated, ["type_detail"]);

        let scatter = graph.figure(OutputId::AttackDefenseChart).expect("scatter");
        assert_eq!(scatter.title, "Attack vs defense: Water");
        let labels: Vec<_> = scatter.traces[0]
            .marks
            .iter()
            .filter_map(|m| m.text.as_deref())
            .collect();
        assert_eq!(labels, ["Squirtle", "Psyduck"]);

        let histogram = graph.figure(OutputId::SpeedHistogram).expect("histogram");
        assert_eq!(histogram.title, "Speed distribution: Water");
        let total: f64 = histogram.traces[0].marks.iter().map(|m| m.y).sum();
        assert!((total - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_theme_change_reruns_everything() {
        let mut graph = graph();
        let report = graph.set_input(InputId::Theme, InputValue::Theme(Theme::Dark));
        assert_eq!(report.evaluated.len(), 5);
        assert_eq!(graph.table_style().map(|s| s.theme), Some(Theme::Dark));
        assert_eq!(
            graph.figure(OutputId::HeightWeightChart).map(|f| f.theme),
            Some(Theme::Dark)
        );
    }

    #[test]
    fn test_theme_change_keeps_figure_data() {
        const FIGURES: [OutputId; 6] = [
            OutputId::MeanByTypeChart,
            OutputId::HeightWeightChart,
            OutputId::AttackDefenseChart,
            OutputId::SpeedHistogram,
            OutputId::TypeCountChart,
            OutputId::TopTotalChart,
        ];
        type Data = (Vec<String>, Vec<(String, Vec<Mark>)>);
        let data = |graph: &BindingGraph| -> Vec<Data> {
            FIGURES
                .iter()
                .map(|&id| {
                    let figure = graph.figure(id).expect("figure output");
                    let traces = figure
                        .traces
                        .iter()
                        .map(|t| (t.name.clone(), t.marks.clone()))
                        .collect();
                    (figure.categories.clone(), traces)
                })
                .collect()
        };

        let mut graph = graph();
        let light = data(&graph);
        let light_color = graph
            .figure(OutputId::MeanByTypeChart)
            .and_then(|f| f.traces.first())
            .map(|t| t.color);

        let report = graph.set_input(InputId::Theme, InputValue::Theme(Theme::Dark));
        assert!(report.is_clean());
        assert_eq!(data(&graph), light);
        assert!(light.iter().any(|(_, traces)| !traces.is_empty()));

        for id in FIGURES {
            assert_eq!(graph.figure(id).map(|f| f.theme), Some(Theme::Dark));
        }
        let dark_color = graph
            .figure(OutputId::MeanByTypeChart)
            .and_then(|f| f.traces.first())
            .map(|t| t.color);
        assert_ne!(light_color, dark_color);
    }

    #[test]
    fn test_roster_charts() {
        let mut graph = graph();
        graph.set_input(
            InputId::SelectedTypes,
            InputValue::Types(vec!["Fire".to_owned(), "Water".to_owned(), "Grass".to_owned()]),
        );

        let counts = graph.figure(OutputId::TypeCountChart).expect("count chart");
        assert_eq!(counts.categories, ["Fire", "Water", "Grass"]);

        let top = graph.figure(OutputId::TopTotalChart).expect("top chart");
        // Psyduck 205, Squirtle 200, Charmander 199, Bulbasaur 188, Vulpix 184
        assert_eq!(
            top.categories,
            ["Psyduck", "Squirtle", "Charmander", "Bulbasaur", "Vulpix"]
        );

        graph.set_input(InputId::RankOrder, InputValue::Flag(true));
        let bottom = graph.figure(OutputId::TopTotalChart).expect("top chart");
        assert_eq!(bottom.categories.first().map(String::as_str), Some("Vulpix"));
        assert!(bottom.title.starts_with("Bottom"));
    }

    #[test]
    fn test_type_colors_are_stable_across_charts() {
        let graph = graph();
        let mean = graph.figure(OutputId::MeanByTypeChart).expect("mean chart");
        let scatter = graph.figure(OutputId::HeightWeightChart).expect("scatter");
        let color_of = |fig: &FigureSpec, name: &str| {
            fig.traces.iter().find(|t| t.name == name).map(|t| t.color)
        };
        assert_eq!(color_of(mean, "Psychic"), color_of(scatter, "Psychic"));
        assert_ne!(color_of(mean, "Fire"), color_of(mean, "Grass"));
    }
}
