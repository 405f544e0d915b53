//! End-to-end: load a CSV, cascade the dropdowns, chart, export, clean up.

use std::io::Write;
use std::path::{Path, PathBuf};

use rusty_scout::chart::{build_charts, default_team_groups, FieldGroup};
use rusty_scout::data::filter::{
    all_indices, cascade, filter, Dimension, DimensionColumns, FilterSelection, PLAYER_ORDER,
};
use rusty_scout::data::loader::{load_file, DEFAULT_SQLITE_TABLE};
use rusty_scout::data::model::CellValue;
use rusty_scout::report::{export, report_filename, IdentityField, ReportRequest};

// ============================================================================
// HELPERS
// ============================================================================

fn write_csv(dir: &Path) -> PathBuf {
    let path = dir.join("estadisticas.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "Nombre,Nombre Equipo,Posicion,Nombre Liga,Goles Total,Intercepciones,Despejes").unwrap();
    writeln!(f, "X,A,GK,Primera,2,4,").unwrap();
    writeln!(f, "Y,A,FW,Primera,5,1,3").unwrap();
    writeln!(f, "Z,B,DF,Primera,0,9,6").unwrap();
    path
}

fn sel(pairs: &[(Dimension, &str)]) -> FilterSelection {
    pairs.iter().map(|(d, v)| (*d, CellValue::from(*v))).collect()
}

// ============================================================================
// FILTER
// ============================================================================

#[test]
fn test_filter_examples() {
    let dir = tempfile::tempdir().unwrap();
    let store = load_file(&write_csv(dir.path()), DEFAULT_SQLITE_TABLE).unwrap();
    let cols = DimensionColumns::default();
    let base = all_indices(&store);

    let fw = filter(&store, &cols, &base, &sel(&[(Dimension::Team, "A"), (Dimension::Position, "FW")]));
    assert_eq!(fw.len(), 1);
    assert_eq!(store.records[fw[0]].text("nombre"), "Y");

    let none = filter(&store, &cols, &base, &sel(&[(Dimension::Team, "C")]));
    assert!(none.is_empty());
}

#[test]
fn test_cascade_offers_only_positions_of_the_team() {
    let dir = tempfile::tempdir().unwrap();
    let store = load_file(&write_csv(dir.path()), DEFAULT_SQLITE_TABLE).unwrap();
    let cols = DimensionColumns::default();

    let c = cascade(&store, &cols, &PLAYER_ORDER, &sel(&[(Dimension::Team, "A")]));
    let positions = &c.step(Dimension::Position).unwrap().choices;
    assert_eq!(positions, &vec![CellValue::from("GK"), CellValue::from("FW")]);
}

// ============================================================================
// CHARTS + EXPORT
// ============================================================================

#[test]
fn test_team_report_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = load_file(&write_csv(dir.path()), DEFAULT_SQLITE_TABLE).unwrap();
    let cols = DimensionColumns::default();
    let scratch = dir.path().join("scratch");

    let c = cascade(&store, &cols, &[Dimension::Team, Dimension::League], &sel(&[(Dimension::Team, "A")]));
    assert_eq!(c.view.len(), 2);

    let (artifacts, notices) = build_charts(&store, &c.view, &default_team_groups(), &scratch, "A_Primera");
    // goles and defensas have columns; tarjetas, faltas, penales do not.
    assert_eq!(artifacts.len(), 2);
    assert_eq!(notices.len(), 3);

    let defensas = &artifacts[1].chart;
    let values: Vec<f64> = defensas.bars.iter().map(|b| b.value).collect();
    assert_eq!(values, vec![5.0, 3.0, 0.0]);

    let request = ReportRequest {
        title: "Análisis".into(),
        identity: vec![IdentityField::new("Equipo", "A")],
        charts: artifacts.clone(),
        logo: None,
        photo: None,
        file_name: report_filename("A", "Primera", "pdf"),
    };
    let outcome = export(&request, &dir.path().join("out")).unwrap();

    assert_eq!(outcome.pages, 3);
    assert_eq!(lopdf::Document::load(&outcome.path).unwrap().get_pages().len(), 3);
    for a in &artifacts {
        assert!(!a.path.exists());
    }
}

#[test]
fn test_identity_only_report() {
    let dir = tempfile::tempdir().unwrap();
    let request = ReportRequest {
        title: "Análisis".into(),
        identity: vec![IdentityField::new("Nombre", "X"), IdentityField::new("Equipo", "A")],
        charts: vec![],
        logo: None,
        photo: None,
        file_name: report_filename("A", "X", "pdf"),
    };
    let outcome = export(&request, dir.path()).unwrap();
    assert_eq!(outcome.path.file_name().unwrap(), "A_X.pdf");
    assert_eq!(outcome.pages, 1);
    assert!(outcome.removed.is_empty());
}

#[test]
fn test_group_without_columns_makes_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let store = load_file(&write_csv(dir.path()), DEFAULT_SQLITE_TABLE).unwrap();
    let groups = vec![FieldGroup::new("pases", "Pases", "Cantidad", &["pases_completados", "pases_fallados"])];
    let scratch = dir.path().join("scratch");
    let (artifacts, notices) = build_charts(&store, &[0], &groups, &scratch, "A_X");
    assert!(artifacts.is_empty());
    assert_eq!(notices.len(), 1);
    assert!(!scratch.exists() || std::fs::read_dir(&scratch).unwrap().count() == 0);
}
