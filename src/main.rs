use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};

use edulens::data::cache::DatasetCache;
use edulens::data::filter::Selection;
use edulens::predict::adapter;
use edulens::predict::model::ArtifactModel;
use edulens::predict::schema::{DropoutFactors, InfraFactors, RetentionFactors};
use edulens::report;
use edulens::session::Session;

#[derive(Parser)]
#[command(name = "edulens")]
#[command(about = "School infrastructure and student retention analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    Dropout,
    Retention,
    Infrastructure,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a school table under hierarchical filters
    Summary {
        #[arg(long)]
        data: PathBuf,
        /// State to keep (omit for all)
        #[arg(long)]
        state: Option<String>,
        /// District to keep (omit for all)
        #[arg(long)]
        district: Option<String>,
        /// Area types to keep (repeatable; omit for all observed)
        #[arg(long = "area")]
        areas: Vec<String>,
        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Year-over-year improvement across states
    Trend {
        #[arg(long)]
        data: PathBuf,
        /// Metric columns to difference
        #[arg(long = "metric", default_values_t = vec![
            "facility_index".to_string(),
            "teacher_quality_index".to_string(),
        ])]
        metrics: Vec<String>,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Report which declared columns a source carries
    Schema {
        #[arg(long)]
        data: PathBuf,
    },
    /// Score a prediction request against a pretrained artifact
    Predict {
        #[arg(long)]
        model: PathBuf,
        #[arg(long, value_enum)]
        target: Target,
        /// JSON file with the target's input fields
        #[arg(long)]
        factors: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut cache = DatasetCache::new();

    match cli.command {
        Commands::Summary {
            data,
            state,
            district,
            areas,
            out,
        } => {
            let mut session = Session::new();
            session.load(&mut cache, &data)?;
            if let Some(state) = state {
                session.set_state(Selection::only(state));
            }
            if let Some(district) = district {
                session.set_district(Selection::only(district));
            }
            if !areas.is_empty() {
                session.criteria.area_types = areas.into_iter().collect();
                session.refilter();
            }

            let dataset = match &session.dataset {
                Some(ds) => ds,
                None => bail!("no dataset loaded"),
            };
            let text = report::build_summary_report(dataset, &session.visible, &session.criteria);
            match out {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{text}"),
            }
        }
        Commands::Trend { data, metrics, top } => {
            let table = cache.load(&data)?;
            let indices: Vec<usize> = (0..table.dataset.len()).collect();
            let metric_refs: Vec<&str> = metrics.iter().map(String::as_str).collect();
            print!(
                "{}",
                report::build_trend_report(&table.dataset, &indices, &metric_refs, top)
            );
        }
        Commands::Schema { data } => {
            let table = cache.load(&data)?;
            println!("Present columns:");
            for col in &table.schema.present {
                println!("- {col}");
            }
            println!("Missing columns:");
            for col in &table.schema.missing {
                println!("- {col}");
            }
            println!("Computable indicators:");
            for indicator in &table.schema.computable {
                println!("- {indicator}");
            }
        }
        Commands::Predict {
            model,
            target,
            factors,
        } => {
            let model = ArtifactModel::from_file(&model)?;
            let text = std::fs::read_to_string(&factors)
                .with_context(|| format!("reading factors {}", factors.display()))?;
            let prediction = match target {
                Target::Dropout => {
                    let inputs: DropoutFactors =
                        serde_json::from_str(&text).context("parsing dropout factors")?;
                    adapter::predict_dropout_rate(&model, &inputs)?
                }
                Target::Retention => {
                    let inputs: RetentionFactors =
                        serde_json::from_str(&text).context("parsing retention factors")?;
                    adapter::predict_retention(&model, &inputs)?
                }
                Target::Infrastructure => {
                    let inputs: InfraFactors =
                        serde_json::from_str(&text).context("parsing infrastructure factors")?;
                    adapter::score_infrastructure(&model, &inputs)?
                }
            };
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
    }

    Ok(())
}
