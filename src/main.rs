use clap::{Args, Parser, Subcommand};
use evalboard::access::{self, GrantTable};
use evalboard::config::AppConfig;
use evalboard::error::AppError;
use evalboard::evaluation::{self, EmployeeEvaluation};
use evalboard::grid::Grid;
use evalboard::pipeline::SalesData;
use evalboard::sales;
use evalboard::telemetry;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "evalboard",
    about = "Run the spreadsheet extraction pipeline over CSV exports and print the normalized views",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse the flat overall ranking sheet
    Overall {
        /// CSV export of the overall tab
        file: PathBuf,
    },
    /// Parse one region sheet into its rollup and department rankings
    Region(RegionArgs),
    /// Merge the four evaluation sheets into per-employee records
    Evaluation(EvaluationArgs),
}

#[derive(Args, Debug)]
struct RegionArgs {
    /// Region name as it appears in section titles (e.g. 東京)
    #[arg(long)]
    region: String,
    /// CSV export of the region tab
    file: PathBuf,
    /// Narrow the output to what this grant key may view
    #[arg(long)]
    grant: Option<String>,
}

#[derive(Args, Debug)]
struct EvaluationArgs {
    /// CSV export of the rubric master sheet
    #[arg(long)]
    master: PathBuf,
    /// CSV export of the self-evaluation form responses
    #[arg(long)]
    self_eval: PathBuf,
    /// CSV export of the manager-evaluation form responses
    #[arg(long)]
    manager_eval: PathBuf,
    /// CSV export of the computed score sheet
    #[arg(long)]
    scores: PathBuf,
    /// Print the per-question comparison for one employee
    #[arg(long)]
    employee: Option<String>,
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Overall { file } => {
            let entries = sales::extract_overall_ranking(&load_grid(&file)?);
            print_json(&entries)
        }
        Command::Region(args) => run_region(&config, args),
        Command::Evaluation(args) => run_evaluation(args),
    }
}

fn run_region(config: &AppConfig, args: RegionArgs) -> Result<(), AppError> {
    let view = sales::extract_region_sections(&load_grid(&args.file)?, &args.region);

    let Some(grant_key) = args.grant else {
        return print_json(&view);
    };

    let Some(grants_path) = config.grants_path.as_deref() else {
        eprintln!("--grant given but EVALBOARD_GRANTS_PATH is not set");
        return print_json(&view);
    };
    let grants = GrantTable::from_path(grants_path)?;
    let Some(grant) = grants.get(&grant_key) else {
        eprintln!("unknown grant key '{grant_key}'");
        return print_json(&view);
    };

    let key = config
        .sales
        .regions
        .iter()
        .find(|region| region.sheet == args.region)
        .map(|region| region.key.clone())
        .unwrap_or_else(|| args.region.clone());
    let mut data = SalesData::default();
    data.regions.insert(key, view);
    print_json(&access::visible_sales_view(grant, &data))
}

fn run_evaluation(args: EvaluationArgs) -> Result<(), AppError> {
    let rubric = evaluation::extract_rubric(&load_grid(&args.master)?);
    let self_sheets = evaluation::extract_answers(&load_grid(&args.self_eval)?);
    let manager_sheets = evaluation::extract_answers(&load_grid(&args.manager_eval)?);
    let total_scores = evaluation::extract_total_scores(&load_grid(&args.scores)?);

    let merged: BTreeMap<String, EmployeeEvaluation> =
        evaluation::merge(self_sheets, manager_sheets, total_scores);

    match args.employee {
        Some(name) => match merged.get(&name) {
            Some(employee) => {
                let comparisons = evaluation::compare_questions(&rubric, employee);
                let summary = evaluation::summarize(&comparisons);
                print_json(&serde_json::json!({
                    "employee": employee,
                    "summary": summary,
                    "comparisons": comparisons,
                }))
            }
            None => {
                eprintln!("no evaluation data for '{name}'");
                Ok(())
            }
        },
        None => print_json(&merged),
    }
}

fn load_grid(path: &Path) -> Result<Grid, AppError> {
    Ok(Grid::from_csv_reader(File::open(path)?)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
