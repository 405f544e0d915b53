use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

use rusty_scout::chart::ChartData;
use rusty_scout::color::egui_palette;
use rusty_scout::error::NoticeLevel;
use rusty_scout::state::{AppState, Page};

use crate::ui::panels::save_report_dialog;

/// Columns listed in the team page's player table, when present.
const TEAM_TABLE_COLUMNS: [&str; 8] = [
    "nombre",
    "posicion",
    "nombre_equipo",
    "nombre_liga",
    "partidos_titular",
    "minutos_jugados",
    "tarjetas_amarillas",
    "tarjetas_rojas",
];

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Identity block, charts and export controls for the current view.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.store.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Abre un archivo de estadísticas  (Archivo → Abrir…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(&state.config.report_title);
            ui.add_space(6.0);

            notices(ui, state);

            if state.cascade.view.is_empty() {
                return;
            }

            identity(ui, state);
            if state.page == Page::Teams {
                team_table(ui, state);
            }

            ui.add_space(8.0);
            ui.heading("Estadísticas");
            for chart in &state.charts {
                chart_plot(ui, chart);
            }

            ui.add_space(12.0);
            export_controls(ui, state);
        });
}

fn notices(ui: &mut Ui, state: &AppState) {
    for notice in &state.notices {
        let color = match notice.level {
            NoticeLevel::Info => Color32::LIGHT_BLUE,
            NoticeLevel::Warning => Color32::from_rgb(230, 160, 0),
            NoticeLevel::Error => Color32::RED,
        };
        ui.label(RichText::new(format!("⚠ {}", notice.message)).color(color));
    }
}

fn identity(ui: &mut Ui, state: &AppState) {
    ui.strong("DATOS PERSONALES");
    ui.horizontal(|ui: &mut Ui| {
        egui::Grid::new("identity_grid")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                for field in state.identity() {
                    ui.label(RichText::new(&field.label).strong());
                    ui.label(&field.value);
                    ui.end_row();
                }
            });

        if let Some(photo) = &state.photo {
            ui.add(
                egui::Image::from_uri(format!("file://{}", photo.display()))
                    .max_width(150.0)
                    .max_height(180.0),
            );
        }
    });
}

fn team_table(ui: &mut Ui, state: &AppState) {
    let columns: Vec<&str> = TEAM_TABLE_COLUMNS
        .iter()
        .copied()
        .filter(|c| state.store.has_column(c))
        .collect();
    if columns.is_empty() {
        return;
    }

    ui.add_space(8.0);
    ui.strong("Lista de Jugadores");
    egui::Grid::new("team_table")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                ui.label(RichText::new(*col).strong());
            }
            ui.end_row();
            for rec in state.cascade.view.iter().filter_map(|&i| state.store.records.get(i)) {
                for col in &columns {
                    ui.label(rec.opt_text(col).unwrap_or_default());
                }
                ui.end_row();
            }
        });
}

/// One series per field, one slot per category. Group charts put each
/// field in its own slot; comparison charts put every field side by side
/// in each player's slot.
fn chart_plot(ui: &mut Ui, chart: &ChartData) {
    ui.add_space(6.0);
    ui.strong(&chart.title);

    let names: Vec<String> = chart.categories().iter().map(|c| c.to_string()).collect();
    let series = chart.series();
    let colors = egui_palette(series.len());
    let placements = chart.placements();

    Plot::new(format!("chart_{}", chart.key))
        .legend(Legend::default())
        .height(240.0)
        .y_axis_label(chart.y_label.clone())
        .x_axis_formatter(move |mark: GridMark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > 1e-6 || slot < 0.0 {
                return String::new();
            }
            names.get(slot as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for ((field, label), color) in series.iter().zip(colors) {
                let bars: Vec<Bar> = chart
                    .bars
                    .iter()
                    .zip(&placements)
                    .filter(|(b, _)| b.field == *field)
                    .map(|(b, &(slot, rank, count))| {
                        let width = 0.7 / count.max(1) as f64;
                        let offset = (rank as f64 - (count as f64 - 1.0) / 2.0) * width;
                        Bar::new(slot as f64 + offset, b.value).width(width * 0.95)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(*label).color(color));
            }
        });
}

fn export_controls(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("📄 Exportar a PDF").clicked() {
            if let Err(e) = state.export_report() {
                log::debug!("PDF export failed: {e}");
            }
        }
        if ui.button("Exportar CSV").clicked() {
            if let Err(e) = state.export_view_csv() {
                log::debug!("CSV export failed: {e}");
            }
        }

        let summary = state.last_export.as_ref().map(|outcome| {
            format!("{} ({} páginas)", outcome.path.display(), outcome.pages)
        });
        if let Some(summary) = summary {
            ui.label(summary);
            if ui.button("Descargar PDF").clicked() {
                save_report_dialog(state);
            }
        }
    });
}
