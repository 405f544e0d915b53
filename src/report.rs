use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::chart::ChartArtifact;
use crate::data::filter::{Dimension, DimensionColumns};
use crate::data::model::{Record, RecordStore, NOT_AVAILABLE};
use crate::error::{DashboardError, Notice};

/// Shown on the identity page when an entity has no charts.
pub const NO_CHARTS_MARKER: &str = "No hay gráficos disponibles";
/// Shown on a chart page whose image vanished from scratch storage.
pub const CHART_UNAVAILABLE_MARKER: &str = "Gráfico no disponible";

// A4 portrait, in points.
const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 40.0;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

// ---------------------------------------------------------------------------
// Identity block
// ---------------------------------------------------------------------------

/// One labelled line of the identity section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityField {
    pub label: String,
    pub value: String,
}

impl IdentityField {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Numeric attribute as text, zero when missing.
fn number_text(rec: &Record, column: &str) -> String {
    rec.opt_text(column).unwrap_or_else(|| "0".to_string())
}

/// Identity lines of a player, always in the same order.
pub fn player_identity(rec: &Record, columns: &DimensionColumns) -> Vec<IdentityField> {
    let surname = rec.opt_text("apellido").unwrap_or_default();
    let name = format!("{} {}", rec.text(columns.column(Dimension::Player)), surname);
    vec![
        IdentityField::new("Nombre", name.trim_end()),
        IdentityField::new("Equipo", rec.text(columns.column(Dimension::Team))),
        IdentityField::new("Liga", rec.text(columns.column(Dimension::League))),
        IdentityField::new("Posición", rec.text(columns.column(Dimension::Position))),
        IdentityField::new("Edad", format!("{} años", number_text(rec, "edad"))),
        IdentityField::new("Fecha de nacimiento", rec.text("fecha_nacimiento")),
        IdentityField::new("Nacionalidad", rec.text("nacionalidad")),
        IdentityField::new("Peso", format!("{} kg", number_text(rec, "peso"))),
        IdentityField::new("Altura", format!("{} m", number_text(rec, "altura"))),
    ]
}

/// Identity lines of a team view: team and league, then the personal
/// columns of the view's first record, in a fixed order, for those columns
/// the store actually has.
pub fn team_identity(
    store: &RecordStore,
    view: &[usize],
    columns: &DimensionColumns,
) -> Vec<IdentityField> {
    let first = view.first().and_then(|&i| store.records.get(i));
    let value = |column: &str| {
        first
            .map(|r| r.text(column))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    let mut fields = vec![
        IdentityField::new("Equipo", value(columns.column(Dimension::Team)).to_uppercase()),
        IdentityField::new("Liga", value(columns.column(Dimension::League))),
    ];
    let personal = [
        ("Posición", columns.column(Dimension::Position)),
        ("Nombre", columns.column(Dimension::Player)),
        ("Apellido", "apellido"),
        ("Edad", "edad"),
        ("Fecha de nacimiento", "fecha_nacimiento"),
        ("Nacionalidad", "nacionalidad"),
        ("Peso", "peso"),
        ("Altura", "altura"),
    ];
    fields.extend(
        personal
            .iter()
            .filter(|(_, column)| store.has_column(column))
            .map(|(label, column)| IdentityField::new(label, value(*column))),
    );
    fields
}

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

/// Replace characters that cannot appear in a single file name component.
pub fn sanitize_file_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// `{team}_{entity}.{ext}` with spaces replaced by underscores.
pub fn report_filename(team: &str, entity: &str, ext: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_file_component(team),
        sanitize_file_component(entity),
        ext
    )
}

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// Everything needed to lay out one report.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub title: String,
    pub identity: Vec<IdentityField>,
    pub charts: Vec<ChartArtifact>,
    pub logo: Option<PathBuf>,
    pub photo: Option<PathBuf>,
    pub file_name: String,
}

/// Progress of one export invocation. `CleanedUp` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    ChartsReady,
    DocumentWritten,
    CleanedUp,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub pages: usize,
    pub stage: ExportStage,
    /// Chart files removed from scratch storage.
    pub removed: Vec<PathBuf>,
    /// Soft problems met along the way (missing logo, photo, chart image).
    pub notices: Vec<Notice>,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Lay out the report, write it into `output_dir` and delete the consumed
/// chart artifacts.
///
/// A write failure returns [`DashboardError::ExportWrite`] and leaves the
/// charts where they are so the export can be retried; the partially written
/// file is removed.
pub fn export(request: &ReportRequest, output_dir: &Path) -> Result<ExportOutcome, DashboardError> {
    let mut stage = ExportStage::Idle;
    let path = output_dir.join(&request.file_name);

    advance(&mut stage, ExportStage::ChartsReady, &path);
    let mut notices = Vec::new();
    let (bytes, pages) = render_document(request, &mut notices).map_err(|source| {
        DashboardError::ExportWrite {
            path: path.clone(),
            source,
        }
    })?;

    write_atomically(output_dir, &path, &bytes).map_err(|source| {
        log::error!("Export of {} failed: {source}", path.display());
        DashboardError::ExportWrite {
            path: path.clone(),
            source,
        }
    })?;
    advance(&mut stage, ExportStage::DocumentWritten, &path);

    let removed = clean_up(&request.charts);
    advance(&mut stage, ExportStage::CleanedUp, &path);

    Ok(ExportOutcome {
        path,
        pages,
        stage,
        removed,
        notices,
    })
}

fn advance(stage: &mut ExportStage, next: ExportStage, path: &Path) {
    log::info!("Export {}: {:?} -> {:?}", path.display(), stage, next);
    *stage = next;
}

fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let part = dir.join(format!("{file_name}.part"));

    let result = std::fs::write(&part, bytes).and_then(|_| std::fs::rename(&part, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&part);
    }
    result
}

/// Delete every chart file. Files already gone are skipped silently; other
/// failures are logged and skipped.
pub fn clean_up(charts: &[ChartArtifact]) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    for artifact in charts {
        match std::fs::remove_file(&artifact.path) {
            Ok(()) => removed.push(artifact.path.clone()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {e}", artifact.path.display()),
        }
    }
    removed
}

// ---------------------------------------------------------------------------
// PDF layout
// ---------------------------------------------------------------------------

/// Operations and images of one page under construction.
struct PageBuilder {
    ops: Vec<Operation>,
    images: Vec<(String, ObjectId)>,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            images: Vec::new(),
        }
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Text roughly centred on the page (Helvetica averages half an em).
    fn centered_text(&mut self, font: &str, size: f32, y: f32, text: &str) {
        let width = text.chars().count() as f32 * size * 0.5;
        self.text(font, size, ((PAGE_W - width) / 2.0).max(MARGIN), y, text);
    }

    fn image(&mut self, id: ObjectId, x: f32, y: f32, w: f32, h: f32) {
        let name = format!("Im{}", self.images.len() + 1);
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![w.into(), 0.0f32.into(), 0.0f32.into(), h.into(), x.into(), y.into()],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(Operation::new("Q", vec![]));
        self.images.push((name, id));
    }

    fn finish(self, doc: &mut Document, parent: ObjectId, fonts: &Dictionary) -> io::Result<ObjectId> {
        let content = Content {
            operations: self.ops,
        }
        .encode()
        .map_err(to_io)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut xobjects = Dictionary::new();
        for (name, id) in self.images {
            xobjects.set(name, id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts.clone(),
            "XObject" => xobjects,
        });
        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "Contents" => content_id,
            "Resources" => resources_id,
        }))
    }
}

fn to_io(e: impl fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

/// Encode text for the standard fonts (WinAnsi); characters outside
/// Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

/// Decode an image file and embed it as a Flate-compressed RGB XObject.
/// Returns the object and the pixel size.
fn embed_image(doc: &mut Document, path: &Path) -> Result<(ObjectId, u32, u32), String> {
    if !path.exists() {
        return Err(DashboardError::MissingAsset(path.to_path_buf()).to_string());
    }
    let img = image::open(path)
        .map_err(|e| format!("cannot read image {}: {e}", path.display()))?
        .to_rgb8();
    let (w, h) = img.dimensions();

    let compress = |raw: &[u8]| -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw)?;
        encoder.finish()
    };
    let data = compress(img.as_raw())
        .map_err(|e| format!("cannot compress image {}: {e}", path.display()))?;

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w as i64,
            "Height" => h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
            "Filter" => "FlateDecode",
        },
        data,
    );
    Ok((doc.add_object(stream), w, h))
}

/// Build the PDF: identity page, then one page per chart artifact.
/// Returns the bytes and the page count; soft problems go to `notices`.
fn render_document(request: &ReportRequest, notices: &mut Vec<Notice>) -> io::Result<(Vec<u8>, usize)> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let fonts = dictionary! {
        FONT_REGULAR => regular,
        FONT_BOLD => bold,
    };

    let mut page_ids: Vec<ObjectId> = Vec::new();

    // ---- Page 1: logo, title, identity ----
    let mut page = PageBuilder::new();
    let mut y = PAGE_H - MARGIN;

    if let Some(logo) = &request.logo {
        match embed_image(&mut doc, logo) {
            Ok((id, w, h)) => {
                let draw_w = 140.0;
                let draw_h = draw_w * h as f32 / w.max(1) as f32;
                page.image(id, (PAGE_W - draw_w) / 2.0, y - draw_h, draw_w, draw_h);
                y -= draw_h + 20.0;
            }
            Err(msg) => {
                log::warn!("Logo omitted: {msg}");
                notices.push(Notice::warning(msg));
            }
        }
    }

    page.centered_text(FONT_BOLD, 16.0, y - 16.0, &request.title);
    y -= 56.0;

    page.text(FONT_BOLD, 12.0, MARGIN, y, "DATOS PERSONALES");
    y -= 24.0;
    let identity_top = y;
    for field in &request.identity {
        page.text(FONT_REGULAR, 11.0, MARGIN, y, &field.to_string());
        y -= 18.0;
    }

    if let Some(photo) = &request.photo {
        match embed_image(&mut doc, photo) {
            Ok((id, w, h)) => {
                let draw_w = 110.0;
                let draw_h = draw_w * h as f32 / w.max(1) as f32;
                page.image(id, PAGE_W - MARGIN - draw_w, identity_top - draw_h + 11.0, draw_w, draw_h);
            }
            Err(msg) => {
                log::warn!("Photo omitted: {msg}");
                notices.push(Notice::warning(msg));
            }
        }
    }

    y -= 16.0;
    page.text(FONT_BOLD, 12.0, MARGIN, y, "ESTADÍSTICAS");
    if request.charts.is_empty() {
        page.text(FONT_REGULAR, 11.0, MARGIN, y - 24.0, NO_CHARTS_MARKER);
    }
    page_ids.push(page.finish(&mut doc, pages_id, &fonts)?);

    // ---- One page per chart ----
    for artifact in &request.charts {
        let chart = &artifact.chart;
        let mut page = PageBuilder::new();
        let mut y = PAGE_H - MARGIN - 14.0;
        page.text(FONT_BOLD, 14.0, MARGIN, y, &chart.title);
        y -= 20.0;

        match embed_image(&mut doc, &artifact.path) {
            Ok((id, w, h)) => {
                let draw_w = PAGE_W - 2.0 * MARGIN;
                let draw_h = draw_w * h as f32 / w.max(1) as f32;
                page.image(id, MARGIN, y - draw_h, draw_w, draw_h);
                y -= draw_h + 24.0;
            }
            Err(msg) => {
                log::warn!("Chart '{}' has no image: {msg}", chart.key);
                notices.push(Notice::warning(msg));
                y -= 20.0;
                page.text(FONT_REGULAR, 11.0, MARGIN, y, CHART_UNAVAILABLE_MARKER);
                y -= 24.0;
            }
        }

        page.text(FONT_BOLD, 10.0, MARGIN, y, &chart.y_label);
        y -= 16.0;
        for bar in &chart.bars {
            page.text(FONT_REGULAR, 11.0, MARGIN, y, &bar.caption());
            y -= 16.0;
        }
        page_ids.push(page.finish(&mut doc, pages_id, &fonts)?);
    }

    let count = page_ids.len();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        "Count" => count as i64,
        "MediaBox" => vec![0i64.into(), 0i64.into(), PAGE_W.into(), PAGE_H.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(&request.title), StringFormat::Literal),
        "Producer" => Object::String(b"rusty-scout".to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(to_io)?;
    Ok((bytes, count))
}

// ---------------------------------------------------------------------------
// CSV export of a view
// ---------------------------------------------------------------------------

/// Write the rows of `view` with every store column; nulls become empty cells.
pub fn export_csv(store: &RecordStore, view: &[usize], path: &Path) -> Result<(), DashboardError> {
    let to_err = |source: io::Error| DashboardError::ExportWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(|e| to_err(e.into()))?;
    writer.write_record(&store.columns).map_err(|e| to_err(e.into()))?;
    for rec in view.iter().filter_map(|&i| store.records.get(i)) {
        let row: Vec<String> = store
            .columns
            .iter()
            .map(|c| rec.opt_text(c).unwrap_or_default())
            .collect();
        writer.write_record(&row).map_err(|e| to_err(e.into()))?;
    }
    writer.flush().map_err(to_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{aggregate, write_artifact, FieldGroup};
    use crate::data::model::CellValue;
    use std::collections::BTreeMap;

    fn player() -> Record {
        let mut cells = BTreeMap::new();
        cells.insert("nombre".to_string(), CellValue::from("X"));
        cells.insert("apellido".to_string(), CellValue::from("Pérez"));
        cells.insert("nombre_equipo".to_string(), CellValue::from("A"));
        cells.insert("edad".to_string(), CellValue::Integer(24));
        cells.insert("tiros_total".to_string(), CellValue::Integer(10));
        cells.insert("tiros_al_arco".to_string(), CellValue::Integer(4));
        Record::new(cells)
    }

    fn request(dir: &Path, charts: Vec<ChartArtifact>) -> ReportRequest {
        ReportRequest {
            title: "Análisis Copa BetPlay 2024".into(),
            identity: player_identity(&player(), &DimensionColumns::default()),
            charts,
            logo: Some(dir.join("no-logo.png")),
            photo: None,
            file_name: report_filename("A", "X", "pdf"),
        }
    }

    fn page_text(doc: &Document, page: u32) -> Vec<u8> {
        let id = doc.get_pages()[&page];
        doc.get_page_content(id).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn filename_replaces_spaces() {
        assert_eq!(report_filename("Atlético Nacional", "Juan Pablo", "pdf"), "Atlético_Nacional_Juan_Pablo.pdf");
        assert_eq!(report_filename("A", "X", "pdf"), "A_X.pdf");
        assert_eq!(report_filename("A/B", "X", "pdf"), "A_B_X.pdf");
    }

    #[test]
    fn player_identity_uses_fixed_order_and_defaults() {
        let fields = player_identity(&player(), &DimensionColumns::default());
        let labels: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Nombre",
                "Equipo",
                "Liga",
                "Posición",
                "Edad",
                "Fecha de nacimiento",
                "Nacionalidad",
                "Peso",
                "Altura"
            ]
        );
        assert_eq!(fields[0].value, "X Pérez");
        assert_eq!(fields[2].value, NOT_AVAILABLE);
        assert_eq!(fields[4].value, "24 años");
        assert_eq!(fields[7].value, "0 kg");
    }

    #[test]
    fn team_identity_lists_present_personal_columns_in_order() {
        let mut other = BTreeMap::new();
        other.insert("nombre".to_string(), CellValue::from("Y"));
        other.insert("nombre_equipo".to_string(), CellValue::from("A"));
        let store = RecordStore::from_records(vec![player(), Record::new(other)]);

        let fields = team_identity(&store, &[0, 1], &DimensionColumns::default());
        let labels: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Equipo", "Liga", "Nombre", "Apellido", "Edad"]);
        assert_eq!(fields[0].value, "A");
        assert_eq!(fields[1].value, NOT_AVAILABLE);
        assert_eq!(fields[2].value, "X");
        assert_eq!(fields[3].value, "Pérez");
        assert_eq!(fields[4].value, "24");
    }

    #[test]
    fn team_identity_of_an_empty_view_has_placeholders() {
        let store = RecordStore::from_records(vec![player()]);
        let fields = team_identity(&store, &[], &DimensionColumns::default());
        assert_eq!(fields[0].value, NOT_AVAILABLE.to_uppercase());
        assert!(fields.iter().skip(2).all(|f| f.value == NOT_AVAILABLE));
    }

    #[test]
    fn no_charts_gives_one_page_with_marker() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let outcome = export(&request(dir.path(), vec![]), &out).unwrap();

        assert_eq!(outcome.path.file_name().unwrap(), "A_X.pdf");
        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.stage, ExportStage::CleanedUp);
        assert!(outcome.removed.is_empty());
        // The missing logo is a warning, not a failure.
        assert_eq!(outcome.notices.len(), 1);

        let doc = Document::load(&outcome.path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(contains(&page_text(&doc, 1), b"No hay gr"));
    }

    #[test]
    fn charts_get_one_page_each_and_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let store = RecordStore::from_records(vec![player()]);
        let group = FieldGroup::new("tiros", "Tiros", "Cantidad", &["tiros_total", "tiros_al_arco"]);
        let chart = aggregate(&store, &[0], &group).unwrap();
        let first = write_artifact(&scratch, "A_X", &chart).unwrap();
        let mut other = chart.clone();
        other.key = "tiros2".into();
        let second = write_artifact(&scratch, "A_X", &other).unwrap();

        let req = request(dir.path(), vec![first.clone(), second.clone()]);
        let outcome = export(&req, &dir.path().join("out")).unwrap();

        assert_eq!(outcome.pages, 3);
        let doc = Document::load(&outcome.path).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert!(!contains(&page_text(&doc, 1), b"No hay gr"));
        assert!(contains(&page_text(&doc, 2), b"Tiros total: 10"));
        assert!(!first.path.exists());
        assert!(!second.path.exists());
        assert_eq!(outcome.removed.len(), 2);
    }

    #[test]
    fn chart_missing_on_disk_still_gets_its_page() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let store = RecordStore::from_records(vec![player()]);
        let group = FieldGroup::new("tiros", "Tiros", "Cantidad", &["tiros_total"]);
        let chart = aggregate(&store, &[0], &group).unwrap();
        let artifact = write_artifact(&scratch, "A_X", &chart).unwrap();
        std::fs::remove_file(&artifact.path).unwrap();

        let outcome = export(&request(dir.path(), vec![artifact]), &dir.path().join("out")).unwrap();
        assert_eq!(outcome.pages, 2);
        assert!(outcome.removed.is_empty());
        let doc = Document::load(&outcome.path).unwrap();
        assert!(contains(&page_text(&doc, 2), b"no disponible"));
    }

    #[test]
    fn write_failure_keeps_charts_and_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let store = RecordStore::from_records(vec![player()]);
        let group = FieldGroup::new("tiros", "Tiros", "Cantidad", &["tiros_total"]);
        let chart = aggregate(&store, &[0], &group).unwrap();
        let artifact = write_artifact(&scratch, "A_X", &chart).unwrap();

        // A plain file where the output directory should be.
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = export(&request(dir.path(), vec![artifact.clone()]), &blocker).unwrap_err();
        assert!(matches!(err, DashboardError::ExportWrite { .. }));
        assert!(artifact.path.exists());
    }

    #[test]
    fn clean_up_skips_files_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::from_records(vec![player()]);
        let group = FieldGroup::new("tiros", "Tiros", "Cantidad", &["tiros_total"]);
        let chart = aggregate(&store, &[0], &group).unwrap();
        let kept = write_artifact(dir.path(), "A_X", &chart).unwrap();
        let gone = ChartArtifact {
            path: dir.path().join("gone.png"),
            chart: chart.clone(),
        };
        let removed = clean_up(&[gone, kept.clone()]);
        assert_eq!(removed, vec![kept.path.clone()]);
        assert!(!kept.path.exists());
    }

    #[test]
    fn csv_export_writes_the_view() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::from_records(vec![player()]);
        let path = dir.path().join("jugador_export.csv");
        export_csv(&store, &[0], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap().split(',').count(), store.columns.len());
        assert!(lines.next().unwrap().contains("Pérez"));
    }
}
