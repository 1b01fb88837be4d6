//! Declarative chart and table descriptions.
//!
//! Bindings never draw anything. They emit a [`FigureSpec`] (what kind of chart,
//! which values on which axis, how they are grouped and coloured) or a
//! [`TableStyle`]; the GUI turns those into pixels.

use crate::theme::{Rgb, Theme};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Scatter,
    Histogram,
}

/// One plotted element: a bar, a point or a histogram bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    pub x: f64,
    pub y: f64,
    /// Label drawn next to the mark.
    pub text: Option<String>,
    /// Field/value pairs shown on hover.
    pub hover: Vec<(String, String)>,
}

impl Mark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            text: None,
            hover: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_hover(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.hover.push((field.into(), value.into()));
        self
    }
}

/// Marks sharing a colour group.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub name: String,
    pub color: Rgb,
    pub marks: Vec<Mark>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FigureSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Tick labels for a categorical x axis; category `i` sits at `x = i`.
    pub categories: Vec<String>,
    pub traces: Vec<Trace>,
    pub theme: Theme,
    /// Print bar values with this many decimals.
    pub value_decimals: Option<usize>,
    pub bar_width: Option<f64>,
}

impl FigureSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>, theme: Theme) -> Self {
        Self {
            kind,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            categories: Vec::new(),
            traces: Vec::new(),
            theme,
            value_decimals: None,
            bar_width: None,
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn mark_count(&self) -> usize {
        self.traces.iter().map(|t| t.marks.len()).sum()
    }

    /// A figure without marks renders as an empty chart.
    pub fn is_empty(&self) -> bool {
        self.mark_count() == 0
    }

    pub fn category_label(&self, x: f64) -> Option<&str> {
        if x < -0.5 {
            return None;
        }
        self.categories
            .get(x.round() as usize)
            .map(String::as_str)
    }

    pub fn format_value(&self, value: f64) -> String {
        match self.value_decimals {
            Some(decimals) => format!("{value:.decimals$}"),
            None => format!("{value}"),
        }
    }

    /// The mark closest to `(x, y)`, with the trace it belongs to.
    pub fn nearest_mark(&self, x: f64, y: f64) -> Option<(&Trace, &Mark)> {
        self.traces
            .iter()
            .flat_map(|trace| trace.marks.iter().map(move |mark| (trace, mark)))
            .min_by(|(_, a), (_, b)| {
                let da = (a.x - x).powi(2) + (a.y - y).powi(2);
                let db = (b.x - x).powi(2) + (b.y - y).powi(2);
                da.total_cmp(&db)
            })
    }

    /// Multi-line hover text for a mark.
    pub fn hover_text(&self, trace: &Trace, mark: &Mark) -> String {
        if mark.hover.is_empty() {
            let x = self
                .category_label(mark.x)
                .map(str::to_owned)
                .unwrap_or_else(|| format!("{}", mark.x));
            return format!(
                "{}\n{}: {x}\n{}: {}",
                trace.name,
                self.x_label,
                self.y_label,
                self.format_value(mark.y)
            );
        }
        mark.hover
            .iter()
            .map(|(field, value)| format!("{field}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellAlign {
    Left,
    Right,
}

/// Presentation parameters of the data table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableStyle {
    pub theme: Theme,
    pub header_fill: Rgb,
    pub header_bold: bool,
    pub cell_align: CellAlign,
    pub min_column_width: f32,
    pub page_size: usize,
    pub striped: bool,
}

impl TableStyle {
    pub fn for_theme(theme: Theme, page_size: usize) -> Self {
        Self {
            theme,
            header_fill: theme.header_fill(),
            header_bold: true,
            cell_align: CellAlign::Left,
            min_column_width: 100.0,
            page_size: page_size.max(1),
            striped: true,
        }
    }
}
