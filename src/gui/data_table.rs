use crate::dataset::Dataset;
use crate::figure::{CellAlign, TableStyle};
use crate::table::{SortDirection, TableColumn, TableQuery};
use crate::theme::color32;
use eframe::egui;
use egui_extras::{Column, TableBuilder};

const HEADER_HEIGHT: f32 = 52.0;
const ROW_HEIGHT: f32 = 22.0;

pub fn render_data_table(
    ui: &mut egui::Ui,
    dataset: &Dataset,
    style: &TableStyle,
    query: &mut TableQuery,
) {
    let columns = TableColumn::all(dataset);
    let header_fill = color32(style.header_fill);
    let page = query.apply(dataset, style.page_size);
    if query.page() != page.page {
        query.set_page(page.page);
    }

    let cell_layout = match style.cell_align {
        CellAlign::Left => egui::Layout::left_to_right(egui::Align::Center),
        CellAlign::Right => egui::Layout::right_to_left(egui::Align::Center),
    };

    egui::ScrollArea::horizontal().show(ui, |ui| {
        TableBuilder::new(ui)
            .striped(style.striped)
            .resizable(true)
            .cell_layout(cell_layout)
            .columns(Column::auto().at_least(style.min_column_width), columns.len())
            .min_scrolled_height(0.0)
            .header(HEADER_HEIGHT, |mut header| {
                for &column in &columns {
                    header.col(|ui| {
                        ui.painter().rect_filled(ui.max_rect(), 0.0, header_fill);
                        ui.vertical(|ui| {
                            render_header_cell(ui, dataset, style, query, column);
                        });
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, page.rows.len(), |mut row| {
                    let Some(creature) = page.rows.get(row.index()) else {
                        return;
                    };
                    for column in &columns {
                        row.col(|ui| {
                            ui.label(column.display(creature));
                        });
                    }
                });
            });
    });

    ui.horizontal(|ui| {
        if ui
            .add_enabled(page.page > 0, egui::Button::new("◀ Previous"))
            .clicked()
        {
            query.set_page(page.page - 1);
        }
        ui.label(format!(
            "Page {} of {} ({} rows)",
            page.page + 1,
            page.page_count,
            page.matching
        ));
        if ui
            .add_enabled(page.page + 1 < page.page_count, egui::Button::new("Next ▶"))
            .clicked()
        {
            query.set_page(page.page + 1);
        }
        ui.separator();
        if ui.button("Clear filters").clicked() {
            query.clear_filters();
        }
    });
}

fn render_header_cell(
    ui: &mut egui::Ui,
    dataset: &Dataset,
    style: &TableStyle,
    query: &mut TableQuery,
    column: TableColumn,
) {
    let arrow = match query.sort() {
        Some((sorted, SortDirection::Ascending)) if sorted == column => " ▲",
        Some((sorted, SortDirection::Descending)) if sorted == column => " ▼",
        _ => "",
    };
    let mut title = egui::RichText::new(format!("{}{arrow}", column.header(dataset)));
    if style.header_bold {
        title = title.strong();
    }
    if ui
        .add(egui::Button::new(title).frame(false))
        .on_hover_text("Click to sort")
        .clicked()
    {
        query.toggle_sort(column);
    }

    let hint = if column.is_numeric() { "e.g. >= 80" } else { "filter" };
    let mut text = query.filter_text(column).to_owned();
    if ui
        .add(
            egui::TextEdit::singleline(&mut text)
                .hint_text(hint)
                .desired_width(style.min_column_width - 8.0),
        )
        .changed()
    {
        query.set_filter(column, text);
    }
}
