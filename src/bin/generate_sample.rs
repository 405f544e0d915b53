use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const TEAMS: [(&str, &str); 6] = [
    ("Millonarios", "Liga BetPlay"),
    ("Atlético Nacional", "Liga BetPlay"),
    ("América de Cali", "Liga BetPlay"),
    ("Junior", "Liga BetPlay"),
    ("Deportes Quindío", "Torneo BetPlay"),
    ("Real Cartagena", "Torneo BetPlay"),
];

const POSITIONS: [&str; 4] = ["Goalkeeper", "Defender", "Midfielder", "Attacker"];
const NAMES: [&str; 12] = [
    "Juan", "Carlos", "Andrés", "Luis", "David", "Santiago", "Daniel", "Jorge", "Felipe", "Miguel",
    "Camilo", "Sebastián",
];
const SURNAMES: [&str; 10] = [
    "Gómez", "Rodríguez", "Martínez", "López", "García", "Pérez", "Ramírez", "Torres", "Díaz",
    "Vargas",
];
const NATIONALITIES: [&str; 4] = ["Colombia", "Colombia", "Venezuela", "Argentina"];

/// Counter columns, each with an upper bound for the random draw.
const COUNTERS: [(&str, i64); 23] = [
    ("partidos_titular", 20),
    ("minutos_jugados", 1800),
    ("goles_total", 12),
    ("goles_pie_izquierdo", 5),
    ("goles_pie_derecho", 6),
    ("goles_cabeza", 3),
    ("asistencias", 8),
    ("tiros_total", 40),
    ("tiros_al_arco", 20),
    ("duelos_total", 120),
    ("duelos_ganados", 70),
    ("pases_completados", 600),
    ("pases_fallados", 150),
    ("intercepciones", 40),
    ("despejes", 60),
    ("bloqueos", 20),
    ("tarjetas_amarillas", 8),
    ("tarjetas_rojas", 1),
    ("faltas_cometidas", 30),
    ("faltas_recibidas", 30),
    ("penales_anotados", 3),
    ("penales_fallados", 1),
    ("regates_exitosos", 25),
];

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut headers: Vec<String> = [
        "nombre",
        "apellido",
        "nombre_equipo",
        "nombre_liga",
        "posicion",
        "edad",
        "fecha_nacimiento",
        "nacionalidad",
        "peso",
        "altura",
        "foto",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    headers.extend(COUNTERS.iter().map(|(name, _)| name.to_string()));

    // Collect all rows as text; empty cells stand for missing values.
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (team, league) in TEAMS {
        for _ in 0..18 {
            let age = rng.range(17, 36);
            let mut row = vec![
                rng.pick(&NAMES).to_string(),
                rng.pick(&SURNAMES).to_string(),
                team.to_string(),
                league.to_string(),
                rng.pick(&POSITIONS).to_string(),
                age.to_string(),
                format!("{}-{:02}-{:02}", 2024 - age, rng.range(1, 12), rng.range(1, 28)),
                rng.pick(&NATIONALITIES).to_string(),
                rng.range(62, 92).to_string(),
                format!("1.{}", rng.range(65, 95)),
                String::new(),
            ];
            for (_, max) in COUNTERS {
                // Roughly one cell in twenty is missing.
                if rng.range(0, 19) == 0 {
                    row.push(String::new());
                } else {
                    row.push(rng.range(0, max).to_string());
                }
            }
            rows.push(row);
        }
    }

    let dir = Path::new("data");
    std::fs::create_dir_all(dir).expect("Failed to create data directory");

    // Write CSV
    let csv_path = dir.join("estadisticas_jugadores_2023.csv");
    let mut writer = csv::Writer::from_path(&csv_path).expect("Failed to create CSV file");
    writer.write_record(&headers).expect("Failed to write header");
    for row in &rows {
        writer.write_record(row).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");

    // Write Parquet: counters and ages as Int64, the rest as Utf8.
    let numeric = |name: &str| name == "edad" || COUNTERS.iter().any(|(c, _)| *c == name);
    let fields: Vec<Field> = headers
        .iter()
        .map(|h| {
            let ty = if numeric(h.as_str()) { DataType::Int64 } else { DataType::Utf8 };
            Field::new(h, ty, true)
        })
        .collect();
    let columns: Vec<ArrayRef> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| -> ArrayRef {
            if numeric(h.as_str()) {
                Arc::new(Int64Array::from(
                    rows.iter()
                        .map(|r| r[i].parse::<i64>().ok())
                        .collect::<Vec<_>>(),
                ))
            } else {
                Arc::new(StringArray::from(
                    rows.iter()
                        .map(|r| Some(r[i].as_str()).filter(|s| !s.is_empty()))
                        .collect::<Vec<_>>(),
                ))
            }
        })
        .collect();

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .expect("Failed to create RecordBatch");

    let parquet_path = dir.join("estadisticas_jugadores_2023.parquet");
    let file = std::fs::File::create(&parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} players ({} columns) to {} and {}",
        rows.len(),
        headers.len(),
        csv_path.display(),
        parquet_path.display()
    );
}
