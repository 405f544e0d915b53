use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_scout::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Credential form shown until the session is authenticated.
pub fn login_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading("Iniciar Sesión");
        ui.add_space(12.0);

        ui.label("Usuario:");
        ui.add(egui::TextEdit::singleline(&mut state.login_user).desired_width(220.0));
        ui.label("Contraseña:");
        let password = ui.add(
            egui::TextEdit::singleline(&mut state.login_password)
                .password(true)
                .desired_width(220.0),
        );
        ui.add_space(8.0);

        let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Ingresar").clicked() || submitted {
            match state.login() {
                Ok(()) => state.status_message = None,
                Err(e) => state.status_message = Some(e.to_string()),
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – cascading dropdowns
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    if let Some(logo) = state.config.logo_path.as_ref().filter(|p| p.exists()) {
        let uri = format!("file://{}", logo.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::from_uri(uri)
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Filtros");
    ui.separator();

    if state.store.is_empty() {
        ui.label("No hay datos cargados.");
        return;
    }

    // Clone the steps so the state can be mutated from inside the loop.
    let steps = state.cascade.steps.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for step in &steps {
                ui.strong(format!("Selecciona: {}", step.dimension));
                if step.choices.is_empty() {
                    ui.label(RichText::new("sin valores").italics());
                    ui.add_space(6.0);
                    continue;
                }

                let selected_text = step
                    .chosen
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                egui::ComboBox::from_id_salt(step.dimension)
                    .selected_text(selected_text)
                    .width(ui.available_width() - 8.0)
                    .show_ui(ui, |ui: &mut Ui| {
                        for value in &step.choices {
                            let is_selected = step.chosen.as_ref() == Some(value);
                            if ui
                                .selectable_label(is_selected, value.to_string())
                                .clicked()
                                && !is_selected
                            {
                                state.select(step.dimension, value.clone());
                            }
                        }
                    });
                ui.add_space(6.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for page in [Page::Players, Page::Teams] {
            if ui.selectable_label(state.page == page, page.label()).clicked() {
                state.set_page(page);
            }
        }

        ui.separator();

        ui.label(format!(
            "{} registros cargados, {} visibles",
            state.store.len(),
            state.cascade.view.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            if ui.button("Cerrar sesión").clicked() {
                state.logout();
            }
            if let Some(user) = state.session.user() {
                ui.label(user);
            }
        });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir estadísticas")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq", "db", "sqlite", "sqlite3"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("SQLite", &["db", "sqlite", "sqlite3"])
        .pick_file();

    if let Some(path) = file {
        state.load_source(&path);
    }
}

/// Copy the last exported report to a location the user picks.
pub fn save_report_dialog(state: &mut AppState) {
    let Some(outcome) = &state.last_export else {
        return;
    };
    let file_name = outcome
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = rfd::FileDialog::new()
        .set_title("Descargar PDF")
        .set_file_name(&file_name)
        .add_filter("PDF", &["pdf"])
        .save_file();

    if let Some(target) = target {
        match std::fs::copy(&outcome.path, &target) {
            Ok(_) => {
                log::info!("Report saved to {}", target.display());
                state.status_message = Some(format!("Guardado en {}", target.display()));
            }
            Err(e) => {
                log::error!("Failed to save report: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
