//! The dashboard window.
//!
//! Each frame the controls edit a copy of [`Selections`]; every input that
//! differs afterwards is dispatched to the [`BindingGraph`], which re-runs
//! only the bindings that declared it. Panels draw whatever outputs the graph
//! currently holds.

mod controls;
mod data_table;
mod plots;

use crate::bindings::{BindingGraph, ChartSettings, OutputId, Selections, build_dashboard};
use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::table::TableQuery;
use crate::theme::{self, SPACING_MEDIUM, SPACING_SMALL};
use eframe::egui;
use std::sync::Arc;

const APP_NAME: &str = "Pokédash";

pub struct DashboardApp {
    graph: BindingGraph,
    selections: Selections,
    table: TableQuery,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        dataset: Arc<Dataset>,
        config: &DashboardConfig,
    ) -> Result<Self> {
        let app = Self::with_defaults(dataset, config)?;
        theme::apply_theme(&cc.egui_ctx, app.selections.theme);
        Ok(app)
    }

    /// Every session starts from the default selections and an unfiltered table.
    fn with_defaults(dataset: Arc<Dataset>, config: &DashboardConfig) -> Result<Self> {
        let selections = Selections::defaults(&dataset, config);
        let graph = build_dashboard(dataset, ChartSettings::from(config), &selections)?;

        Ok(Self {
            graph,
            selections,
            table: TableQuery::default(),
        })
    }

    /// Sends every changed control value to the graph.
    fn dispatch(&mut self, before: &Selections, ctx: &egui::Context) {
        let changed = before
            .input_values()
            .into_iter()
            .zip(self.selections.input_values())
            .filter(|((_, old), (_, new))| old != new)
            .map(|(_, change)| change);

        for (id, value) in changed {
            let report = self.graph.set_input(id, value);
            for failure in &report.failures {
                tracing::warn!(
                    binding = failure.binding,
                    error = %failure.message,
                    "Binding failed; keeping previous outputs"
                );
            }
        }

        if before.theme != self.selections.theme {
            theme::apply_theme(ctx, self.selections.theme);
        }
    }
}

fn render_chart(ui: &mut egui::Ui, graph: &BindingGraph, output: OutputId) {
    theme::card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        if let Some(error) = graph.failure_for_output(output) {
            ui.colored_label(ui.visuals().error_fg_color, format!("⚠ {error}"));
        }
        match graph.figure(output) {
            Some(figure) => plots::render_figure(ui, &format!("{output:?}"), figure),
            None => {
                ui.weak("Not available");
            }
        }
    });
}

fn render_charts(ui: &mut egui::Ui, graph: &BindingGraph) {
    let rows = [
        [OutputId::MeanByTypeChart, OutputId::HeightWeightChart],
        [OutputId::AttackDefenseChart, OutputId::SpeedHistogram],
        [OutputId::TypeCountChart, OutputId::TopTotalChart],
    ];
    for pair in rows {
        ui.columns(2, |columns| {
            for (column, output) in columns.iter_mut().zip(pair) {
                render_chart(column, graph, output);
            }
        });
        ui.add_space(SPACING_SMALL);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let before = self.selections.clone();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(SPACING_SMALL);
            ui.heading(APP_NAME);
            controls::render_controls(ui, self.graph.dataset(), &mut self.selections);
            ui.add_space(SPACING_SMALL);
        });

        if before != self.selections {
            self.dispatch(&before, ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                render_charts(ui, &self.graph);
                ui.add_space(SPACING_MEDIUM);

                theme::card_frame(ui).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.heading("Data");
                    match self.graph.table_style() {
                        Some(style) => data_table::render_data_table(
                            ui,
                            self.graph.dataset(),
                            style,
                            &mut self.table,
                        ),
                        None => {
                            ui.weak("Not available");
                        }
                    }
                });
            });
        });
    }
}

/// Opens the dashboard window and blocks until it closes.
pub fn run(dataset: Dataset, config: DashboardConfig) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([1280.0, 960.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    let dataset = Arc::new(dataset);
    tracing::info!(rows = dataset.len(), "Opening dashboard window");

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, dataset, &config)?))),
    )
    .map_err(|e| anyhow::anyhow!("Dashboard window failed: {e}"))
}
