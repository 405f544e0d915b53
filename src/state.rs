use std::path::{Path, PathBuf};

use crate::cache::ViewCache;
use crate::chart::{
    compare_records, compute_charts, init_chart_font, write_artifacts, ChartData, FieldGroup,
};
use crate::config::DashboardConfig;
use crate::data::filter::{Cascade, Dimension, FilterSelection, PLAYER_ORDER, TEAM_ORDER};
use crate::data::loader::load_or_empty;
use crate::data::model::{CellValue, Record, RecordStore};
use crate::error::{DashboardError, Notice};
use crate::photo::PhotoCache;
use crate::report::{
    export, export_csv, player_identity, report_filename, team_identity, ExportOutcome,
    IdentityField, ReportRequest,
};
use crate::session::{LoginError, Session};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// One player: team → position → player → league.
    Players,
    /// One team, summed over its players: team → league.
    Teams,
}

impl Page {
    pub fn label(self) -> &'static str {
        match self {
            Page::Players => "Jugadores",
            Page::Teams => "Equipos",
        }
    }

    pub fn order(self) -> &'static [Dimension] {
        match self {
            Page::Players => &PLAYER_ORDER,
            Page::Teams => &TEAM_ORDER,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Who is using the dashboard; nothing else is shown until authenticated.
    pub session: Session,

    /// Loaded table (empty until a source loads).
    pub store: RecordStore,
    pub source_path: Option<PathBuf>,

    pub page: Page,

    /// Values the user picked; the cascade may override them.
    pub wanted: FilterSelection,

    /// Choices and view after cascading `wanted` (cached).
    pub cascade: Cascade,

    /// Charts of the current view.
    pub charts: Vec<ChartData>,

    /// Warnings of the current view (empty filters, insufficient data, ...).
    pub notices: Vec<Notice>,

    /// Local file of the selected player's photo, once resolved.
    pub photo: Option<PathBuf>,

    /// Result of the last export, kept for the download button.
    pub last_export: Option<ExportOutcome>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Login form fields.
    pub login_user: String,
    pub login_password: String,

    cache: ViewCache,
    photos: PhotoCache,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        init_chart_font(config.chart_font.as_deref());
        let photos = PhotoCache::new(config.photo_dir.clone());
        let mut state = Self {
            config,
            session: Session::new(),
            store: RecordStore::default(),
            source_path: None,
            page: Page::Players,
            wanted: FilterSelection::new(),
            cascade: Cascade::default(),
            charts: Vec::new(),
            notices: Vec::new(),
            photo: None,
            last_export: None,
            status_message: None,
            login_user: String::new(),
            login_password: String::new(),
            cache: ViewCache::new(),
            photos,
        };
        if let Some(path) = state.config.data_path.clone() {
            state.load_source(&path);
        }
        state
    }

    // ---- Session ----

    pub fn login(&mut self) -> Result<(), LoginError> {
        let result = self.session.login(
            &self.login_user,
            &self.login_password,
            &self.config.credentials,
        );
        self.login_password.clear();
        result
    }

    /// End the session and forget everything the user picked.
    pub fn logout(&mut self) {
        self.session.logout();
        self.wanted.clear();
        self.last_export = None;
        self.status_message = None;
        self.refresh();
    }

    // ---- Data ----

    /// Replace the store. A failed load leaves an empty store and a notice.
    pub fn load_source(&mut self, path: &Path) {
        let (store, notice) = load_or_empty(path, &self.config.sqlite_table);
        self.store = store;
        self.source_path = Some(path.to_path_buf());
        self.status_message = notice.map(|n| n.message);
        self.wanted.clear();
        self.last_export = None;
        self.cache.invalidate();
        self.refresh();
    }

    pub fn set_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.refresh();
        }
    }

    /// Pick a value in one dropdown.
    pub fn select(&mut self, dimension: Dimension, value: CellValue) {
        self.wanted.insert(dimension, value);
        self.refresh();
    }

    fn groups(&self) -> &[FieldGroup] {
        match self.page {
            Page::Players => &self.config.player_groups,
            Page::Teams => &self.config.team_groups,
        }
    }

    /// Recompute the cascade, the charts and the notices for the current page.
    pub fn refresh(&mut self) {
        self.cascade = self.cache.cascade(
            &self.store,
            &self.config.columns,
            self.page.order(),
            &self.wanted,
        );
        self.notices.clear();
        self.photo = None;

        if self.cascade.view.is_empty() {
            self.charts.clear();
            self.notices.push(Notice::warning(
                "No se encontraron registros con los filtros seleccionados.",
            ));
            return;
        }

        let view = self.focus();
        let (charts, notices) = compute_charts(&self.store, &view, self.groups());
        self.charts = charts;
        self.notices.extend(notices);

        if self.page == Page::Teams {
            match compare_records(
                &self.store,
                &view,
                self.config.columns.column(Dimension::Player),
                &self.config.player_comparison,
            ) {
                Ok(chart) => self.charts.push(chart),
                Err(e) => {
                    log::warn!("Skipping comparison chart: {e}");
                    self.notices.push(e.to_notice());
                }
            }
        }

        self.resolve_photo();
    }

    /// Find a local file for the selected player's photo, downloading it
    /// when the record holds a URL.
    fn resolve_photo(&mut self) {
        let reference = self
            .selected_record()
            .and_then(|rec| rec.opt_text(&self.config.photo_column));
        let Some(reference) = reference else {
            return;
        };
        match self.photos.resolve(&reference) {
            Ok(path) => self.photo = Some(path),
            Err(e) => {
                log::warn!("Photo omitted: {e}");
                self.notices.push(e.to_notice());
            }
        }
    }

    /// Rows the charts describe: the first matching player, or the whole team.
    pub fn focus(&self) -> Vec<usize> {
        match self.page {
            Page::Players => self.cascade.view.iter().take(1).copied().collect(),
            Page::Teams => self.cascade.view.clone(),
        }
    }

    /// The player shown on the players page.
    pub fn selected_record(&self) -> Option<&Record> {
        match self.page {
            Page::Players => self
                .cascade
                .view
                .first()
                .and_then(|&i| self.store.records.get(i)),
            Page::Teams => None,
        }
    }

    pub fn identity(&self) -> Vec<IdentityField> {
        match self.selected_record() {
            Some(rec) => player_identity(rec, &self.config.columns),
            None => team_identity(&self.store, &self.cascade.view, &self.config.columns),
        }
    }

    fn chosen_text(&self, dimension: Dimension) -> String {
        self.cascade
            .chosen(dimension)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    fn file_name(&self, ext: &str) -> String {
        let entity = match self.page {
            Page::Players => Dimension::Player,
            Page::Teams => Dimension::League,
        };
        report_filename(
            &self.chosen_text(Dimension::Team),
            &self.chosen_text(entity),
            ext,
        )
    }

    /// `{team}_{player}.pdf` or `{team}_{league}.pdf`.
    pub fn report_file_name(&self) -> String {
        self.file_name("pdf")
    }

    /// Record a failed operation where the user sees it.
    fn report_failure(&mut self, e: &DashboardError) {
        log::error!("{e}");
        self.status_message = Some(e.to_string());
        self.notices.push(e.to_notice());
    }

    // ---- Export ----

    /// Write the charts to scratch storage and export the report.
    ///
    /// Soft problems end up in `notices`; a failure is returned, shown in
    /// the status line and the notices, and the charts stay in scratch
    /// storage.
    pub fn export_report(&mut self) -> Result<&ExportOutcome, DashboardError> {
        match self.write_report() {
            Ok(outcome) => {
                log::info!(
                    "Exported {} ({} pages)",
                    outcome.path.display(),
                    outcome.pages
                );
                self.notices.extend(outcome.notices.iter().cloned());
                self.status_message = Some(format!("Archivo exportado: {}", outcome.path.display()));
                Ok(&*self.last_export.insert(outcome))
            }
            Err(e) => {
                self.report_failure(&e);
                Err(e)
            }
        }
    }

    fn write_report(&mut self) -> Result<ExportOutcome, DashboardError> {
        if self.cascade.view.is_empty() {
            return Err(DashboardError::MissingData(
                "no records match the current filters".into(),
            ));
        }

        let file_name = self.report_file_name();
        let stem = file_name.trim_end_matches(".pdf").to_string();
        let (artifacts, write_notices) =
            write_artifacts(&self.config.scratch_dir, &stem, &self.charts);
        self.notices.extend(write_notices);

        let request = ReportRequest {
            title: self.config.report_title.clone(),
            identity: self.identity(),
            charts: artifacts,
            logo: self.config.logo_path.clone(),
            photo: self.photo.clone(),
            file_name,
        };
        export(&request, &self.config.output_dir)
    }

    /// Write the rows of the current view as `{team}_{entity}.csv` next to
    /// the reports.
    pub fn export_view_csv(&mut self) -> Result<PathBuf, DashboardError> {
        let path = self.config.output_dir.join(self.file_name("csv"));
        let result = if self.cascade.view.is_empty() {
            Err(DashboardError::MissingData(
                "no records match the current filters".into(),
            ))
        } else {
            std::fs::create_dir_all(&self.config.output_dir)
                .map_err(|source| DashboardError::ExportWrite {
                    path: self.config.output_dir.clone(),
                    source,
                })
                .and_then(|_| export_csv(&self.store, &self.focus(), &path))
        };
        match result {
            Ok(()) => {
                log::info!("Exported {}", path.display());
                self.status_message = Some(format!("Archivo exportado: {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                self.report_failure(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NoticeLevel;
    use std::io::Write;

    fn config(dir: &Path) -> DashboardConfig {
        let data = dir.join("stats.csv");
        let mut f = std::fs::File::create(&data).unwrap();
        writeln!(f, "nombre,apellido,nombre_equipo,nombre_liga,posicion,tiros_total,tiros_al_arco,tarjetas_amarillas").unwrap();
        writeln!(f, "X,Uno,A,Primera,GK,1,0,2").unwrap();
        writeln!(f, "Y,Dos,A,Primera,FW,9,5,1").unwrap();
        writeln!(f, "Z,Tres,B,Primera,DF,2,1,4").unwrap();
        DashboardConfig {
            data_path: Some(data),
            logo_path: None,
            scratch_dir: dir.join("scratch"),
            output_dir: dir.join("out"),
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn players_page_defaults_to_first_choices() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(config(dir.path()));
        assert_eq!(state.store.len(), 3);
        assert_eq!(state.cascade.chosen(Dimension::Team), Some(&CellValue::from("A")));
        assert_eq!(state.selected_record().unwrap().text("nombre"), "X");
        // tiros has data; duelos, goles and pases do not.
        assert_eq!(state.charts.len(), 1);
        assert_eq!(state.notices.len(), 3);
    }

    #[test]
    fn choosing_a_position_changes_the_player() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config(dir.path()));
        state.select(Dimension::Position, CellValue::from("FW"));
        assert_eq!(state.selected_record().unwrap().text("nombre"), "Y");
        assert_eq!(state.report_file_name(), "A_Y.pdf");
    }

    #[test]
    fn team_page_sums_the_team() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config(dir.path()));
        state.set_page(Page::Teams);
        assert_eq!(state.cascade.view, vec![0, 1]);
        let cards = state.charts.iter().find(|c| c.key == "tarjetas").unwrap();
        assert_eq!(cards.bars[0].value, 3.0);
        assert_eq!(state.report_file_name(), "A_Primera.pdf");
    }

    #[test]
    fn export_writes_report_and_removes_charts() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config(dir.path()));
        let outcome = state.export_report().unwrap().clone();
        assert_eq!(outcome.pages, 1 + state.charts.len());
        assert!(outcome.path.exists());
        let leftovers = std::fs::read_dir(dir.path().join("scratch")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn failed_load_leaves_an_empty_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = DashboardConfig {
            data_path: Some(dir.path().join("missing.csv")),
            ..config(dir.path())
        };
        let mut state = AppState::new(cfg);
        assert!(state.store.is_empty());
        assert!(state.status_message.is_some());
        assert!(state.charts.is_empty());
        assert!(matches!(
            state.export_report(),
            Err(DashboardError::MissingData(_))
        ));
    }

    #[test]
    fn export_without_records_says_why() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config(dir.path()));
        state.cascade.view.clear();
        let before = state.notices.len();
        assert!(state.export_report().is_err());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("no records match")));
        assert_eq!(state.notices.len(), before + 1);
        assert_eq!(state.notices[before].level, NoticeLevel::Warning);
    }

    #[test]
    fn team_page_adds_the_player_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.player_comparison =
            FieldGroup::new("tiros_jugador", "Tiros por Jugador", "Cantidad", &["tiros_total"]);
        let mut state = AppState::new(cfg);
        state.set_page(Page::Teams);

        let comparison = state.charts.last().unwrap();
        assert_eq!(comparison.key, "tiros_jugador");
        assert_eq!(comparison.categories(), vec!["X", "Y"]);

        // Without the columns the comparison is only a warning.
        let mut state = AppState::new(config(dir.path()));
        state.set_page(Page::Teams);
        assert!(state.charts.iter().all(|c| c.key != "goles_asistencias"));
        assert!(state
            .notices
            .iter()
            .any(|n| n.message.contains("Goles y Asistencias")));
    }

    #[test]
    fn photo_path_is_resolved_for_the_selected_player() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("x.png");
        image::RgbImage::from_pixel(4, 4, image::Rgb([200, 0, 0]))
            .save(&photo)
            .unwrap();
        let data = dir.path().join("fotos.csv");
        let mut f = std::fs::File::create(&data).unwrap();
        writeln!(f, "nombre,nombre_equipo,nombre_liga,posicion,foto").unwrap();
        writeln!(f, "X,A,Primera,GK,{}", photo.display()).unwrap();
        writeln!(f, "Y,A,Primera,FW,{}", dir.path().join("none.png").display()).unwrap();
        let cfg = DashboardConfig {
            data_path: Some(data),
            ..config(dir.path())
        };

        let mut state = AppState::new(cfg);
        assert_eq!(state.photo.as_deref(), Some(photo.as_path()));

        state.select(Dimension::Position, CellValue::from("FW"));
        assert_eq!(state.photo, None);
        assert!(state.notices.iter().any(|n| n.message.contains("none.png")));
    }

    #[test]
    fn csv_export_writes_the_team_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config(dir.path()));
        state.set_page(Page::Teams);
        let path = state.export_view_csv().unwrap();
        assert_eq!(path.file_name().unwrap(), "A_Primera.csv");
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(state.status_message.unwrap().contains("A_Primera.csv"));
    }

    #[test]
    fn logout_clears_the_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config(dir.path()));
        state.login_user = "admin".into();
        state.login_password = "admin".into();
        state.login().unwrap();
        state.select(Dimension::Team, CellValue::from("B"));
        state.logout();
        assert!(!state.session.is_authenticated());
        assert!(state.wanted.is_empty());
        assert_eq!(state.cascade.chosen(Dimension::Team), Some(&CellValue::from("A")));
    }
}
