use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use serde::{Deserialize, Serialize};

use crate::color::generate_palette;
use crate::data::model::RecordStore;
use crate::error::{DashboardError, Notice};
use crate::report::sanitize_file_component;

// ---------------------------------------------------------------------------
// Field groups
// ---------------------------------------------------------------------------

/// A named, fixed set of numeric columns plotted together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    /// Short identifier, used in artifact file names.
    pub key: String,
    pub title: String,
    pub y_label: String,
    pub fields: Vec<String>,
}

impl FieldGroup {
    pub fn new(key: &str, title: &str, y_label: &str, fields: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            y_label: y_label.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Groups shown for a single player.
pub fn default_player_groups() -> Vec<FieldGroup> {
    vec![
        FieldGroup::new(
            "tiros",
            "Comparación de Tiros",
            "Cantidad de Tiros",
            &["tiros_total", "tiros_al_arco"],
        ),
        FieldGroup::new(
            "duelos",
            "Comparación de Duelos",
            "Cantidad de Duelos",
            &["duelos_total", "duelos_ganados"],
        ),
        FieldGroup::new(
            "goles",
            "Goles",
            "Cantidad de Goles",
            &["goles_pie_izquierdo", "goles_pie_derecho", "goles_cabeza"],
        ),
        FieldGroup::new(
            "pases",
            "Pases",
            "Cantidad de Pases",
            &["pases_completados", "pases_fallados"],
        ),
    ]
}

/// Groups summed over a whole team.
pub fn default_team_groups() -> Vec<FieldGroup> {
    vec![
        FieldGroup::new("goles", "Goles del equipo", "Cantidad", &["goles_total"]),
        FieldGroup::new(
            "defensas",
            "Defensas",
            "Cantidad",
            &["intercepciones", "despejes", "bloqueos"],
        ),
        FieldGroup::new(
            "tarjetas",
            "Tarjetas",
            "Cantidad",
            &["tarjetas_amarillas", "tarjetas_rojas"],
        ),
        FieldGroup::new(
            "faltas",
            "Faltas",
            "Cantidad",
            &["faltas_cometidas", "faltas_recibidas"],
        ),
        FieldGroup::new(
            "penales",
            "Penales",
            "Cantidad",
            &["penales_anotados", "penales_fallados"],
        ),
    ]
}

/// The per-player comparison drawn on the team page.
pub fn default_player_comparison() -> FieldGroup {
    FieldGroup::new(
        "goles_asistencias",
        "Goles y Asistencias por Jugador",
        "Cantidad",
        &["goles_total", "asistencias"],
    )
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One bar: the value of `field` within `category`.
///
/// Field-group charts give every field its own category; comparison charts
/// use one category per record and one bar per field inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct BarValue {
    pub field: String,
    pub label: String,
    pub category: String,
    pub value: f64,
}

impl BarValue {
    /// `label: value`, prefixed with the category when it differs.
    pub fn caption(&self) -> String {
        if self.category == self.label {
            format!("{}: {}", self.label, format_value(self.value))
        } else {
            format!(
                "{} - {}: {}",
                self.category,
                self.label,
                format_value(self.value)
            )
        }
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else if v.abs() >= 1e15 {
        format!("{v:e}")
    } else {
        format!("{v:.2}")
    }
}

/// Computed values of one field group, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub key: String,
    pub title: String,
    pub y_label: String,
    pub bars: Vec<BarValue>,
}

impl ChartData {
    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for bar in &self.bars {
            if !out.contains(&bar.category.as_str()) {
                out.push(&bar.category);
            }
        }
        out
    }

    /// For every bar: its category index, its place among the bars of that
    /// category and how many bars the category holds.
    pub fn placements(&self) -> Vec<(usize, usize, usize)> {
        let categories = self.categories();
        let mut counts = vec![0usize; categories.len()];
        let mut out = Vec::with_capacity(self.bars.len());
        for bar in &self.bars {
            let ci = categories
                .iter()
                .position(|c| *c == bar.category)
                .unwrap_or(0);
            out.push((ci, counts[ci], 0));
            counts[ci] += 1;
        }
        for p in &mut out {
            p.2 = counts[p.0];
        }
        out
    }

    /// Distinct `(field, label)` series in first-appearance order.
    pub fn series(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::new();
        for bar in &self.bars {
            if !out.iter().any(|(f, _)| *f == bar.field) {
                out.push((&bar.field, &bar.label));
            }
        }
        out
    }
}

fn check_group(
    store: &RecordStore,
    view: &[usize],
    group: &FieldGroup,
) -> Result<(), DashboardError> {
    if view.is_empty() {
        return Err(DashboardError::MissingData(format!(
            "{}: no records match the current filters",
            group.title
        )));
    }
    if !group.fields.iter().any(|f| store.has_column(f)) {
        return Err(DashboardError::MissingData(format!(
            "{}: none of {} is in the data",
            group.title,
            group.fields.join(", ")
        )));
    }
    Ok(())
}

/// Sum every field of `group` over the rows in `view`.
///
/// One row gives its raw values. Fields that are absent from the store or
/// null in a row count as zero. When none of the group's fields is a store
/// column there is nothing real to plot and the group is reported as
/// insufficient data instead of a chart of zeros.
pub fn aggregate(
    store: &RecordStore,
    view: &[usize],
    group: &FieldGroup,
) -> Result<ChartData, DashboardError> {
    check_group(store, view, group)?;

    let bars = group
        .fields
        .iter()
        .map(|field| {
            let label = pretty_label(field);
            BarValue {
                field: field.clone(),
                category: label.clone(),
                label,
                value: view
                    .iter()
                    .filter_map(|&i| store.records.get(i))
                    .map(|rec| rec.number(field))
                    .sum(),
            }
        })
        .collect();

    Ok(ChartData {
        key: group.key.clone(),
        title: group.title.clone(),
        y_label: group.y_label.clone(),
        bars,
    })
}

/// One category per record of `view`, named by `name_column`, with a bar
/// for every field of `group`. Repeated names get a ` (2)`, ` (3)` suffix.
pub fn compare_records(
    store: &RecordStore,
    view: &[usize],
    name_column: &str,
    group: &FieldGroup,
) -> Result<ChartData, DashboardError> {
    check_group(store, view, group)?;

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut bars = Vec::with_capacity(view.len() * group.fields.len());
    for rec in view.iter().filter_map(|&i| store.records.get(i)) {
        let name = rec.text(name_column);
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        let category = if *count == 1 {
            name
        } else {
            format!("{name} ({count})")
        };
        for field in &group.fields {
            bars.push(BarValue {
                field: field.clone(),
                label: pretty_label(field),
                category: category.clone(),
                value: rec.number(field),
            });
        }
    }

    Ok(ChartData {
        key: group.key.clone(),
        title: group.title.clone(),
        y_label: group.y_label.clone(),
        bars,
    })
}

/// Run every group; groups without data become warnings, not charts.
pub fn compute_charts(
    store: &RecordStore,
    view: &[usize],
    groups: &[FieldGroup],
) -> (Vec<ChartData>, Vec<Notice>) {
    let mut charts = Vec::new();
    let mut notices = Vec::new();
    for group in groups {
        match aggregate(store, view, group) {
            Ok(chart) => charts.push(chart),
            Err(e) => {
                log::warn!("Skipping chart '{}': {e}", group.key);
                notices.push(e.to_notice());
            }
        }
    }
    (charts, notices)
}

/// `tiros_al_arco` → `Tiros al arco`.
pub fn pretty_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Rasterization
// ---------------------------------------------------------------------------

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 500;

const FONT_FAMILY: &str = "sans-serif";

/// Looked up in order when no chart font is configured.
const FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static CHART_FONT: OnceLock<bool> = OnceLock::new();

/// Register the font used for chart text, once per process. `configured`
/// is tried first, then a few well-known system fonts. Returns whether a
/// font is available; without one charts are drawn without text.
pub fn init_chart_font(configured: Option<&Path>) -> bool {
    *CHART_FONT.get_or_init(|| {
        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));
        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
                Ok(()) => {
                    log::info!("Chart font: {}", path.display());
                    return true;
                }
                Err(_) => log::warn!("Unusable chart font {}", path.display()),
            }
        }
        log::warn!("No chart font found, charts are drawn without text");
        false
    })
}

/// Top of the value axis: some headroom over the tallest bar, finite even
/// when the data is not.
fn value_ceiling(max: f64) -> f64 {
    const LIMIT: f64 = f64::MAX / 4.0;
    if max.is_nan() || max <= 0.0 {
        return 1.0;
    }
    (max * 1.1).min(LIMIT)
}

/// Draw a bar chart into PNG bytes. Pure: no file system access.
pub fn render_png(chart: &ChartData, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
    let width = width.max(64);
    let height = height.max(64);
    let labelled = init_chart_font(None);

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_bars(&root, chart, labelled)?;
        root.present()?;
    }

    let img = RgbImage::from_raw(width, height, buf).context("chart buffer size")?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartData,
    labelled: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let categories = chart.categories();
    let series = chart.series();
    let top = value_ceiling(chart.max_value());
    let slots = categories.len().max(1) as i32;

    let mut builder = ChartBuilder::on(root);
    builder.margin(16);
    if labelled {
        builder
            .caption(chart.title.as_str(), (FONT_FAMILY, 24))
            .x_label_area_size(48)
            .y_label_area_size(72);
    }
    let mut ctx = builder.build_cartesian_2d((0..slots).into_segmented(), 0f64..top)?;

    let category_of = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => categories
            .get(*i as usize)
            .map(|c| c.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    if labelled {
        ctx.configure_mesh()
            .disable_x_mesh()
            .light_line_style(&WHITE)
            .y_desc(chart.y_label.as_str())
            .x_labels(categories.len())
            .x_label_formatter(&category_of)
            .label_style((FONT_FAMILY, 14))
            .axis_desc_style((FONT_FAMILY, 16))
            .draw()?;
    } else {
        ctx.draw_series(std::iter::once(PathElement::new(
            vec![
                (SegmentValue::Exact(0), top),
                (SegmentValue::Exact(0), 0.0),
                (SegmentValue::Exact(slots), 0.0),
            ],
            BLACK.stroke_width(2),
        )))?;
    }

    // Bars of one category share 70% of its slot.
    let plot_width = ctx.plotting_area().dim_in_pixel().0;
    let slot_px = plot_width / slots as u32;
    let placements = chart.placements();

    let colors = generate_palette(series.len());
    for ((field, label), rgb) in series.iter().zip(colors) {
        let color = RGBColor(rgb[0], rgb[1], rgb[2]);
        let bars = chart
            .bars
            .iter()
            .zip(&placements)
            .filter(|(b, _)| b.field == *field)
            .map(|(bar, &(ci, rank, count))| {
                let bar_px = (slot_px * 7 / 10 / count.max(1) as u32).max(1);
                let left = slot_px.saturating_sub(bar_px * count as u32) / 2 + bar_px * rank as u32;
                let right = slot_px.saturating_sub(left + bar_px);
                let value = if bar.value.is_nan() {
                    0.0
                } else {
                    bar.value.clamp(0.0, top)
                };
                let ci = ci as i32;
                let mut rect = Rectangle::new(
                    [(SegmentValue::Exact(ci), 0.0), (SegmentValue::Exact(ci + 1), value)],
                    color.filled(),
                );
                rect.set_margin(0, 0, left, right);
                rect
            });
        let drawn = ctx.draw_series(bars)?;
        if labelled && series.len() > 1 {
            drawn.label(*label).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
            });
        }
    }

    if labelled && series.len() > 1 {
        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .label_font((FONT_FAMILY, 14))
            .draw()?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Chart artifacts in scratch storage
// ---------------------------------------------------------------------------

/// A rendered chart written to scratch storage, waiting to be exported.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub chart: ChartData,
}

/// Render `chart` and write it as `{entity}_{key}.png` in `scratch_dir`,
/// replacing any earlier artifact for the same entity and group.
pub fn write_artifact(
    scratch_dir: &Path,
    entity: &str,
    chart: &ChartData,
) -> anyhow::Result<ChartArtifact> {
    std::fs::create_dir_all(scratch_dir)
        .with_context(|| format!("creating scratch dir {}", scratch_dir.display()))?;
    let bytes = render_png(chart, CHART_WIDTH, CHART_HEIGHT).context("rendering chart")?;
    let name = format!(
        "{}_{}.png",
        sanitize_file_component(entity),
        sanitize_file_component(&chart.key)
    );
    let path = scratch_dir.join(name);
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::debug!("Wrote chart artifact {}", path.display());
    Ok(ChartArtifact {
        path,
        chart: chart.clone(),
    })
}

/// Write every chart; a chart that cannot be written is reported and left out.
pub fn write_artifacts(
    scratch_dir: &Path,
    entity: &str,
    charts: &[ChartData],
) -> (Vec<ChartArtifact>, Vec<Notice>) {
    let mut artifacts = Vec::with_capacity(charts.len());
    let mut notices = Vec::new();
    for chart in charts {
        match write_artifact(scratch_dir, entity, chart) {
            Ok(a) => artifacts.push(a),
            Err(e) => {
                log::error!("Chart '{}' not written: {e:#}", chart.key);
                notices.push(Notice::error(format!("{}: {e:#}", chart.title)));
            }
        }
    }
    (artifacts, notices)
}

/// Compute, render and write the charts of every group in one go.
pub fn build_charts(
    store: &RecordStore,
    view: &[usize],
    groups: &[FieldGroup],
    scratch_dir: &Path,
    entity: &str,
) -> (Vec<ChartArtifact>, Vec<Notice>) {
    let (charts, mut notices) = compute_charts(store, view, groups);
    let (artifacts, write_notices) = write_artifacts(scratch_dir, entity, &charts);
    notices.extend(write_notices);
    (artifacts, notices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Record};
    use std::collections::BTreeMap;

    fn rec(pairs: &[(&str, CellValue)]) -> Record {
        let cells: BTreeMap<String, CellValue> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Record::new(cells)
    }

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            rec(&[
                ("nombre", "X".into()),
                ("tarjetas_amarillas", CellValue::Integer(3)),
                ("tarjetas_rojas", CellValue::Null),
            ]),
            rec(&[
                ("nombre", "Y".into()),
                ("tarjetas_amarillas", CellValue::Integer(2)),
                ("tarjetas_rojas", CellValue::Integer(1)),
            ]),
        ])
    }

    fn cards() -> FieldGroup {
        FieldGroup::new(
            "tarjetas",
            "Tarjetas",
            "Cantidad",
            &["tarjetas_amarillas", "tarjetas_rojas"],
        )
    }

    #[test]
    fn single_record_plots_raw_values() {
        let chart = aggregate(&store(), &[0], &cards()).unwrap();
        let values: Vec<f64> = chart.bars.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![3.0, 0.0]);
        assert_eq!(chart.bars[0].label, "Tarjetas amarillas");
    }

    #[test]
    fn group_view_sums_with_nulls_as_zero() {
        let chart = aggregate(&store(), &[0, 1], &cards()).unwrap();
        let values: Vec<f64> = chart.bars.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![5.0, 1.0]);
    }

    #[test]
    fn partially_present_group_plots_absent_fields_as_zero() {
        let group = FieldGroup::new(
            "mixta",
            "Mixta",
            "Cantidad",
            &["tarjetas_amarillas", "goles_cabeza"],
        );
        let chart = aggregate(&store(), &[0, 1], &group).unwrap();
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.bars[1].value, 0.0);
    }

    #[test]
    fn group_without_columns_is_insufficient_data() {
        let group = FieldGroup::new("pases", "Pases", "Cantidad", &["pases_completados"]);
        let err = aggregate(&store(), &[0, 1], &group).unwrap_err();
        assert!(matches!(err, DashboardError::MissingData(_)));
    }

    #[test]
    fn empty_view_is_insufficient_data() {
        let err = aggregate(&store(), &[], &cards()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingData(_)));
    }

    #[test]
    fn compute_charts_skips_only_the_missing_groups() {
        let groups = vec![
            cards(),
            FieldGroup::new("pases", "Pases", "Cantidad", &["pases_completados"]),
        ];
        let (charts, notices) = compute_charts(&store(), &[0, 1], &groups);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].key, "tarjetas");
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn render_produces_a_png_of_the_requested_size() {
        let chart = aggregate(&store(), &[0, 1], &cards()).unwrap();
        let bytes = render_png(&chart, 320, 200).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (320, 200));
    }

    #[test]
    fn render_handles_all_zero_bars() {
        let chart = aggregate(&store(), &[0], &FieldGroup::new(
            "rojas",
            "Rojas",
            "Cantidad",
            &["tarjetas_rojas"],
        ))
        .unwrap();
        assert_eq!(chart.max_value(), 0.0);
        assert!(render_png(&chart, CHART_WIDTH, CHART_HEIGHT).is_ok());
    }

    #[test]
    fn artifacts_are_rewritten_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let chart = aggregate(&store(), &[0, 1], &cards()).unwrap();
        let first = write_artifact(dir.path(), "Equipo A", &chart).unwrap();
        let second = write_artifact(dir.path(), "Equipo A", &chart).unwrap();
        assert_eq!(first.path, second.path);
        assert_eq!(
            first.path.file_name().unwrap().to_str().unwrap(),
            "Equipo_A_tarjetas.png"
        );
        assert!(second.path.exists());
    }

    #[test]
    fn render_survives_values_near_the_float_limit() {
        use std::sync::mpsc;
        use std::time::Duration;

        let huge = RecordStore::from_records(vec![
            rec(&[("goles_total", CellValue::Float(1.7e308))]),
            rec(&[("goles_total", CellValue::Float(1.5e308))]),
            rec(&[("goles_total", CellValue::Float(1.5e308))]),
        ]);
        let group = FieldGroup::new("goles", "Goles", "Cantidad", &["goles_total"]);
        let single = aggregate(&huge, &[0], &group).unwrap();
        let overflowing = aggregate(&huge, &[1, 2], &group).unwrap();
        assert!(overflowing.max_value().is_infinite());

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for chart in [single, overflowing] {
                let ok = render_png(&chart, CHART_WIDTH, CHART_HEIGHT).is_ok();
                let _ = tx.send(ok);
            }
        });
        for _ in 0..2 {
            assert!(rx.recv_timeout(Duration::from_secs(30)).unwrap());
        }
    }

    #[test]
    fn value_ceiling_stays_finite() {
        assert_eq!(value_ceiling(0.0), 1.0);
        assert_eq!(value_ceiling(f64::NAN), 1.0);
        assert!((value_ceiling(10.0) - 11.0).abs() < 1e-9);
        assert!(value_ceiling(1.7e308).is_finite());
        assert!(value_ceiling(f64::INFINITY).is_finite());
    }

    fn squad() -> RecordStore {
        RecordStore::from_records(vec![
            rec(&[
                ("nombre", "X".into()),
                ("goles_total", CellValue::Integer(3)),
                ("asistencias", CellValue::Integer(1)),
            ]),
            rec(&[
                ("nombre", "Y".into()),
                ("goles_total", CellValue::Integer(5)),
                ("asistencias", CellValue::Null),
            ]),
            rec(&[
                ("nombre", "X".into()),
                ("goles_total", CellValue::Integer(0)),
                ("asistencias", CellValue::Integer(4)),
            ]),
        ])
    }

    #[test]
    fn comparison_has_a_category_per_player() {
        let chart =
            compare_records(&squad(), &[0, 1, 2], "nombre", &default_player_comparison()).unwrap();
        assert_eq!(chart.categories(), vec!["X", "Y", "X (2)"]);
        assert_eq!(
            chart.series(),
            vec![("goles_total", "Goles total"), ("asistencias", "Asistencias")]
        );
        let y: Vec<f64> = chart
            .bars
            .iter()
            .filter(|b| b.category == "Y")
            .map(|b| b.value)
            .collect();
        assert_eq!(y, vec![5.0, 0.0]);
        assert_eq!(chart.bars[1].caption(), "X - Asistencias: 1");
        assert_eq!(chart.placements()[..3], [(0, 0, 2), (0, 1, 2), (1, 0, 2)]);
    }

    #[test]
    fn comparison_without_columns_is_insufficient_data() {
        let err = compare_records(&store(), &[0, 1], "nombre", &default_player_comparison())
            .unwrap_err();
        assert!(matches!(err, DashboardError::MissingData(_)));
        let err = compare_records(&squad(), &[], "nombre", &default_player_comparison())
            .unwrap_err();
        assert!(matches!(err, DashboardError::MissingData(_)));
    }

    #[test]
    fn comparison_renders_grouped_bars() {
        let chart =
            compare_records(&squad(), &[0, 1, 2], "nombre", &default_player_comparison()).unwrap();
        let bytes = render_png(&chart, CHART_WIDTH, CHART_HEIGHT).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (CHART_WIDTH, CHART_HEIGHT));
    }

    #[test]
    fn group_captions_skip_the_category() {
        let chart = aggregate(&store(), &[0, 1], &cards()).unwrap();
        assert_eq!(chart.bars[0].caption(), "Tarjetas amarillas: 5");
        assert_eq!(chart.categories().len(), 2);
        assert_eq!(chart.placements(), vec![(0, 0, 1), (1, 0, 1)]);
    }
}
