use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use edulens::predict::model::ModelArtifact;

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const STATES: &[(&str, &[&str])] = &[
    ("Kerala", &["Wayanad", "Ernakulam", "Idukki"]),
    ("Assam", &["Kamrup", "Cachar", "Dibrugarh"]),
    ("Bihar", &["Patna", "Gaya", "Darbhanga"]),
    ("Goa", &["North Goa", "South Goa"]),
    ("Punjab", &["Amritsar", "Ludhiana", "Patiala"]),
];

const SCHOOL_TYPES: &[&str] = &["Govt", "Private", "Aided"];

fn flag(rng: &mut SimpleRng, probability: f64) -> u64 {
    (rng.next_f64() < probability) as u64
}

fn write_school_csv(rng: &mut SimpleRng, rows: usize, path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV writer");
    writer
        .write_record([
            "state",
            "district",
            "rural_urban",
            "school_type",
            "highclass",
            "lowclass",
            "total_tch",
            "male",
            "female",
            "transgender",
            "gen_tch",
            "sc_tch",
            "st_tch",
            "obc_tch",
            "trained_comp",
            "post_graduate_and_above",
            "graduate",
            "below_graduate",
            "total_class_rooms",
            "classrooms_in_good_condition",
            "classrooms_needs_minor_repair",
            "classrooms_needs_major_repair",
            "total_boys_func_toilet",
            "total_girls_func_toilet",
            "func_boys_cwsn_friendly",
            "func_girls_cwsn_friendly",
            "library_availability",
            "electricity_availability",
            "playground_available",
            "pucca_building_blocks",
            "no_building_blocks",
        ])
        .expect("Failed to write CSV header");

    for _ in 0..rows {
        let (state, districts) = STATES[rng.below(STATES.len() as u64) as usize];
        let district = districts[rng.below(districts.len() as u64) as usize];
        let urban = rng.next_f64() < 0.35;
        let area = if urban { "Urban" } else { "Rural" };
        let school_type = SCHOOL_TYPES[rng.below(SCHOOL_TYPES.len() as u64) as usize];

        let staffing_mean = if urban { 24.0 } else { 11.0 };
        let total_tch = rng.gauss(staffing_mean, 4.0).max(1.0).round() as u64;
        let female = (total_tch as f64 * rng.next_f64() * 0.7).round() as u64;
        let male = total_tch.saturating_sub(female);
        let transgender = flag(rng, 0.02);

        let gen_tch = (total_tch as f64 * 0.45).round() as u64;
        let obc_tch = (total_tch as f64 * 0.3).round() as u64;
        let sc_tch = (total_tch as f64 * 0.15).round() as u64;
        let st_tch = total_tch.saturating_sub(gen_tch + obc_tch + sc_tch);

        let graduate = (total_tch as f64 * 0.5).round() as u64;
        let post_graduate = (total_tch as f64 * 0.3).round() as u64;
        let below_graduate = total_tch.saturating_sub(graduate + post_graduate);
        let trained = rng.below(total_tch + 1);

        let rooms = rng.gauss(if urban { 10.0 } else { 6.0 }, 2.5).max(1.0).round() as u64;
        let good = rng.below(rooms + 1);
        let minor = rng.below(rooms - good + 1);
        let major = rooms - good - minor;

        let boys_toilet = rng.below(5);
        let girls_toilet = rng.below(5);
        let cwsn_boys = rng.below(2);
        let cwsn_girls = rng.below(2);

        let library = flag(rng, if urban { 0.85 } else { 0.55 });
        let electricity = flag(rng, if urban { 0.95 } else { 0.7 });
        let playground = flag(rng, if urban { 0.7 } else { 0.5 });
        let pucca_blocks = rng.below(4);
        let no_blocks = flag(rng, 0.05);

        let highclass = 5 + rng.below(8);
        let lowclass = 1 + rng.below(4);

        // A few dirty cells so loaders see what production files look
        // like: empty values and the occasional non-numeric token.
        let female_cell = if rng.next_f64() < 0.03 {
            String::new()
        } else {
            female.to_string()
        };
        let trained_cell = if rng.next_f64() < 0.02 {
            "NA".to_string()
        } else {
            trained.to_string()
        };

        writer
            .write_record([
                state.to_string(),
                district.to_string(),
                area.to_string(),
                school_type.to_string(),
                highclass.to_string(),
                lowclass.to_string(),
                total_tch.to_string(),
                male.to_string(),
                female_cell,
                transgender.to_string(),
                gen_tch.to_string(),
                sc_tch.to_string(),
                st_tch.to_string(),
                obc_tch.to_string(),
                trained_cell,
                post_graduate.to_string(),
                graduate.to_string(),
                below_graduate.to_string(),
                rooms.to_string(),
                good.to_string(),
                minor.to_string(),
                major.to_string(),
                boys_toilet.to_string(),
                girls_toilet.to_string(),
                cwsn_boys.to_string(),
                cwsn_girls.to_string(),
                library.to_string(),
                electricity.to_string(),
                playground.to_string(),
                pucca_blocks.to_string(),
                no_blocks.to_string(),
            ])
            .expect("Failed to write CSV row");
    }

    writer.flush().expect("Failed to flush CSV");
    println!("Wrote {rows} schools to {path}");
}

fn write_trend_parquet(rng: &mut SimpleRng, path: &str) {
    let years: Vec<i64> = (2019..=2023).collect();

    let mut states = Vec::new();
    let mut year_col = Vec::new();
    let mut facility = Vec::new();
    let mut teacher_quality = Vec::new();

    for (state, _) in STATES {
        let mut facility_level = rng.gauss(3.0, 0.8).max(0.5);
        let mut quality_level = rng.gauss(0.55, 0.1).clamp(0.2, 0.9);
        for &year in &years {
            states.push(state.to_string());
            year_col.push(year);
            facility.push(facility_level + rng.gauss(0.0, 0.05));
            teacher_quality.push(quality_level + rng.gauss(0.0, 0.01));
            facility_level += rng.gauss(0.12, 0.06);
            quality_level += rng.gauss(0.01, 0.005);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("state", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("facility_index", DataType::Float64, false),
        Field::new("teacher_quality_index", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                states.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(year_col)),
            Arc::new(Float64Array::from(facility)),
            Arc::new(Float64Array::from(teacher_quality)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {} state-year observations to {path}", STATES.len() * years.len());
}

fn write_artifact(name: &str, weights: Vec<f64>, intercept: f64, path: &str) {
    let artifact = ModelArtifact {
        name: name.to_string(),
        n_features: weights.len(),
        weights,
        intercept,
    };
    let json = serde_json::to_string_pretty(&artifact).expect("Failed to serialize artifact");
    std::fs::write(path, json).expect("Failed to write artifact");
    println!("Wrote model artifact {path}");
}

fn main() {
    let mut rng = SimpleRng::new(42);

    write_school_csv(&mut rng, 600, "df_main.csv");
    write_trend_parquet(&mut rng, "trend.parquet");

    // Demo scoring artifacts with the shapes the adapters expect.
    write_artifact(
        "dropout_regression_v1",
        vec![-0.05, -0.01, -0.005, -0.008, -0.04, -0.03, -0.06, -0.04, -0.07, -0.03],
        0.9,
        "dropout_model.json",
    );
    write_artifact(
        "retention_classification_v1",
        vec![0.1, 0.05, 0.05, 0.01, 0.01, 0.02, 0.1, 0.08, 0.08, 0.1],
        0.0,
        "retention_model.json",
    );
    write_artifact(
        "infrastructure_quality_v1",
        vec![0.8, 0.4, 0.6, 0.4, 0.5, 0.4, 0.5, 0.5, 0.1, 0.05],
        0.5,
        "infra_score_model.json",
    );
}
