use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use election_insight::config::AnalysisConfig;
use election_insight::election::{
    turnout_timeline, CategoryFilter, CategoryStanding, FileVoteSource, HttpVoteSource,
    PredictionResult, TrendHint, VoteSource,
};
use election_insight::export::ExportOptions;
use election_insight::quality::{CleanseMode, CleanseOp, QualityReport};
use election_insight::state::Session;
use election_insight::training::{ModelMetrics, ModelType, TrainingRequest};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Dataset quality profiling, simulated model evaluation and election rankings
#[derive(Parser)]
#[command(name = "election-insight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON settings file
    #[arg(long, global = true, env = "ELECTION_INSIGHT_CONFIG")]
    config: Option<PathBuf>,
    /// Cell separator of delimited input
    #[arg(long, global = true)]
    delimiter: Option<char>,
    /// Seed for synthesized metrics and trend hints
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// report-only or remove-rows
    #[arg(long, global = true)]
    cleanse_mode: Option<CleanseMode>,
    /// Prefix exported files with a UTF-8 byte-order mark
    #[arg(long, global = true)]
    bom: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the quality report of a dataset
    Profile {
        /// Dataset file (csv, tsv, txt, json, parquet)
        file: PathBuf,
        /// Directory to write quality-report.csv into
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Apply cleansing operations in order
    Clean {
        /// Dataset file
        file: PathBuf,
        /// drop-nulls, drop-duplicates, impute-mean or impute-median
        #[arg(long = "op", required = true)]
        ops: Vec<CleanseOp>,
        /// Directory to write the final quality-report.csv into
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Run a simulated training and print its metrics
    Train {
        /// Dataset file
        file: PathBuf,
        /// random-forest, svm, neural-network or logistic
        #[arg(long, default_value = "random-forest")]
        model: ModelType,
        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_split: f64,
        /// Directory to write model-results.csv into
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Rank the candidates of both races
    Predict {
        /// Base URL of the vote store
        #[arg(long, env = "ELECTION_INSIGHT_SOURCE_URL", conflicts_with = "snapshot")]
        url: Option<String>,
        /// JSON file holding a candidate snapshot
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Leaderboard length (overrides the config)
        #[arg(long)]
        top: Option<usize>,
        /// Directory to write the dated ranking file into
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let config = build_config(&cli.global)?;
    let options = ExportOptions {
        byte_order_mark: cli.global.bom,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::Profile { file, export } => {
            cmd_profile(Session::new(config), &file, export.as_deref(), options)
        }
        Commands::Clean { file, ops, export } => {
            cmd_clean(Session::new(config), &file, &ops, export.as_deref(), options)
        }
        Commands::Train {
            file,
            model,
            test_split,
            export,
        } => runtime.block_on(cmd_train(
            Session::new(config),
            &file,
            TrainingRequest::new(model, test_split),
            export.as_deref(),
            options,
        )),
        Commands::Predict {
            url,
            snapshot,
            top,
            export,
        } => {
            let mut config = config;
            if let Some(top) = top {
                config.top_n = top;
            }
            config.validate()?;
            let source = vote_source(url, snapshot)?;
            runtime.block_on(cmd_predict(
                Session::new(config),
                source.as_ref(),
                export.as_deref(),
                options,
            ))
        }
    }
}

fn build_config(global: &GlobalArgs) -> Result<AnalysisConfig> {
    let mut config = match &global.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(delimiter) = global.delimiter {
        config.delimiter = delimiter;
    }
    if global.seed.is_some() {
        config.seed = global.seed;
    }
    if let Some(mode) = global.cleanse_mode {
        config.cleanse_mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn vote_source(url: Option<String>, snapshot: Option<PathBuf>) -> Result<Box<dyn VoteSource>> {
    match (url, snapshot) {
        (_, Some(path)) => Ok(Box::new(FileVoteSource::new(path))),
        (Some(url), None) => Ok(Box::new(
            HttpVoteSource::new(url).context("Failed to build vote store client")?,
        )),
        (None, None) => anyhow::bail!("either --url or --snapshot is required"),
    }
}

fn load(session: &mut Session, file: &Path) -> Result<()> {
    session
        .load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_profile(
    mut session: Session,
    file: &Path,
    export: Option<&Path>,
    options: ExportOptions,
) -> Result<()> {
    load(&mut session, file)?;
    print_report(session.profile()?);

    if let Some(dir) = export {
        let path = session.export_quality_to(dir, options)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn cmd_clean(
    mut session: Session,
    file: &Path,
    ops: &[CleanseOp],
    export: Option<&Path>,
    options: ExportOptions,
) -> Result<()> {
    load(&mut session, file)?;
    print_report(session.profile()?);

    for &op in ops {
        let report = session.clean(op)?.clone();
        println!();
        if let Some(message) = &session.status_message {
            println!("{message}");
        }
        print_report(&report);
    }

    if let Some(dir) = export {
        let path = session.export_quality_to(dir, options)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

async fn cmd_train(
    mut session: Session,
    file: &Path,
    request: TrainingRequest,
    export: Option<&Path>,
    options: ExportOptions,
) -> Result<()> {
    load(&mut session, file)?;

    let metrics = session
        .train(request, |p| {
            eprint!("\rTraining {}: {p:>3}%", request.model_type);
            let _ = std::io::stderr().flush();
        })
        .await?;
    eprintln!();

    if let Some(outcome) = &session.last_training {
        println!(
            "Model: {}  train rows: {}  test rows: {}",
            outcome.model_type, outcome.split.train_rows, outcome.split.test_rows
        );
    }
    print_metrics(&metrics);

    if let Some(dir) = export {
        let path = session.export_metrics_to(dir, options)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

async fn cmd_predict(
    mut session: Session,
    source: &dyn VoteSource,
    export: Option<&Path>,
    options: ExportOptions,
) -> Result<()> {
    let failures = session.predict(source).await;
    for failure in &failures {
        eprintln!("Warning: {failure}");
    }

    let top_n = session.config.top_n;
    let prediction = session
        .prediction
        .as_ref()
        .context("Prediction was not recorded")?;
    print_prediction(prediction, top_n);

    if let Some(dir) = export {
        let path = session.export_ranking_to(dir, Utc::now(), options)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_report(report: &QualityReport) {
    println!("Rows: {}  Columns: {}", report.row_count, report.column_count);
    println!("  Null values:      {}", report.null_count);
    println!("  Duplicate rows:   {}", report.duplicate_count);
    println!("  Inconsistencies:  {}", report.inconsistency_count);

    let flagged: Vec<_> = report
        .columns
        .iter()
        .filter(|c| c.null_count > 0 || c.missing_count > 0)
        .collect();
    if !flagged.is_empty() {
        println!("  Columns with gaps:");
        for column in flagged {
            println!(
                "    {:<20} {} null, {} missing",
                column.name, column.null_count, column.missing_count
            );
        }
    }
}

fn print_metrics(metrics: &ModelMetrics) {
    println!("  Accuracy:   {:.4}", metrics.accuracy);
    println!("  Precision:  {:.4}", metrics.precision);
    println!("  Recall:     {:.4}", metrics.recall);
    println!("  MAE:        {:.4}", metrics.mean_absolute_error);
}

fn print_standing(standing: &CategoryStanding, top_n: usize) {
    println!("{} ({} votes)", standing.category, standing.total_votes);
    match &standing.leader {
        Some(leader) => println!("  Leader: {} ({})", leader.display_name, leader.party),
        None => println!("  No candidates"),
    }
    for entry in standing.top(top_n) {
        let trend = match entry.trend_hint {
            Some(TrendHint::Up) => " ↑",
            Some(TrendHint::Down) => " ↓",
            None => "",
        };
        println!(
            "  {:>2}. {:<28} {:<20} {:>8} {:>7.2}%{}",
            entry.position,
            entry.candidate.display_name,
            entry.candidate.party,
            entry.candidate.vote_count,
            entry.vote_percentage,
            trend
        );
    }
}

fn print_prediction(prediction: &PredictionResult, top_n: usize) {
    for standing in prediction.standings() {
        print_standing(standing, top_n);
        println!();
    }
    println!(
        "Total votes: {}  Candidates: {}",
        prediction.grand_total_votes(),
        prediction.total_candidates
    );
    println!("Turnout:");
    for point in turnout_timeline(prediction, CategoryFilter::All) {
        println!("  {}  {:>10}", point.label, point.votes);
    }
}
