use crate::figure::{ChartKind, FigureSpec, Trace};
use crate::theme::color32;
use eframe::egui;
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points, Text};

const PLOT_HEIGHT: f32 = 260.0;
const BAR_WIDTH: f64 = 0.7;
const POINT_RADIUS: f32 = 4.0;

pub fn render_figure(ui: &mut egui::Ui, id: &str, figure: &FigureSpec) {
    ui.label(egui::RichText::new(&figure.title).strong());
    if figure.is_empty() {
        ui.weak("No creatures match the current selection.");
    }

    let mut plot = Plot::new(format!("plot_{id}"))
        .height(PLOT_HEIGHT)
        .x_axis_label(figure.x_label.clone())
        .y_axis_label(figure.y_label.clone())
        .allow_scroll(false)
        .allow_zoom(figure.kind == ChartKind::Scatter)
        .allow_drag(figure.kind == ChartKind::Scatter)
        .legend(Legend::default())
        .label_formatter(|name, point| hover_label(figure, name, point));

    if !figure.categories.is_empty() {
        plot = plot
            .include_y(0.0)
            .show_x(false)
            .x_axis_formatter(|mark, _range| category_tick(figure, mark.value));
    } else if figure.kind == ChartKind::Histogram {
        plot = plot.include_y(0.0);
    }

    plot.show(ui, |plot_ui| match figure.kind {
        ChartKind::Bar | ChartKind::Histogram => {
            for trace in &figure.traces {
                plot_ui.bar_chart(bar_chart(figure, trace));
            }
            for (position, text) in mark_labels(figure) {
                plot_ui.text(
                    Text::new("", position, text).anchor(egui::Align2::CENTER_BOTTOM),
                );
            }
        }
        ChartKind::Scatter => {
            for trace in &figure.traces {
                let points: Vec<[f64; 2]> = trace.marks.iter().map(|m| [m.x, m.y]).collect();
                plot_ui.points(
                    Points::new(trace.name.clone(), PlotPoints::from(points))
                        .color(color32(trace.color))
                        .radius(POINT_RADIUS),
                );
            }
            for (position, text) in mark_labels(figure) {
                plot_ui.text(
                    Text::new("", position, text).anchor(egui::Align2::LEFT_BOTTOM),
                );
            }
        }
    });
}

fn bar_chart(figure: &FigureSpec, trace: &Trace) -> BarChart {
    let width = figure.bar_width.unwrap_or(BAR_WIDTH);
    let color = color32(trace.color);
    let bars = trace
        .marks
        .iter()
        .map(|mark| {
            Bar::new(mark.x, mark.y)
                .width(width)
                .fill(color)
                .stroke(egui::Stroke::new(0.5, color.gamma_multiply(0.8)))
        })
        .collect();

    // element_formatter needs an owned closure, so precompute the tooltips.
    let tooltips: Vec<(f64, String)> = trace
        .marks
        .iter()
        .map(|mark| (mark.x, figure.hover_text(trace, mark)))
        .collect();

    BarChart::new(trace.name.clone(), bars)
        .color(color)
        .element_formatter(Box::new(move |bar, _| {
            tooltips
                .iter()
                .find(|(x, _)| (x - bar.argument).abs() < f64::EPSILON)
                .map(|(_, text)| text.clone())
                .unwrap_or_default()
        }))
}

/// Text drawn next to each mark that carries one.
fn mark_labels(figure: &FigureSpec) -> Vec<(PlotPoint, egui::RichText)> {
    figure
        .traces
        .iter()
        .flat_map(|trace| {
            trace.marks.iter().filter_map(move |mark| {
                mark.text.as_ref().map(|text| {
                    (
                        PlotPoint::new(mark.x, mark.y),
                        egui::RichText::new(text).small().color(color32(trace.color)),
                    )
                })
            })
        })
        .collect()
}

fn category_tick(figure: &FigureSpec, value: f64) -> String {
    if (value - value.round()).abs() > 1e-6 {
        return String::new();
    }
    figure.category_label(value).unwrap_or_default().to_owned()
}

fn hover_label(figure: &FigureSpec, name: &str, point: &PlotPoint) -> String {
    // empty name: the cursor is not over any item
    if name.is_empty() || figure.kind != ChartKind::Scatter {
        return String::new();
    }
    figure
        .nearest_mark(point.x, point.y)
        .map(|(trace, mark)| figure.hover_text(trace, mark))
        .unwrap_or_default()
}
