use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use car_eval::io_utils::{car_eval_cli_error, io_cli_error, simple_cli_error};
use car_eval::{
    pack_artifact, read_records, write_predictions, CarEvalError, Config, Feature, HeaderMode,
    RawRecord, RejectedRow, Session, FAQ,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, Level};

/// Predict car acceptability from categorical attributes.
#[derive(Parser)]
#[command(name = "car-eval", version)]
struct Cli {
    /// Model bundle (.json or packed bincode)
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Minimum similarity for typo-tolerant matching, in (0, 1]
    #[arg(long, global = true)]
    cutoff: Option<f64>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a single car
    Predict(PredictArgs),
    /// Evaluate every row of a CSV file
    Batch(BatchArgs),
    /// Show the effective encoding table and artifact details
    Mapping {
        #[arg(long)]
        json: bool,
    },
    /// Print frequently asked questions
    Faq,
    /// Validate a JSON artifact and write it in packed form
    Pack {
        /// Input JSON artifact
        input: PathBuf,
        /// Output packed artifact
        output: PathBuf,
    },
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long)]
    buying: String,
    #[arg(long)]
    maint: String,
    #[arg(long)]
    doors: String,
    #[arg(long)]
    persons: String,
    #[arg(long = "lug-boot")]
    lug_boot: String,
    #[arg(long)]
    safety: String,
    /// Emit the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// Input CSV file
    input: PathBuf,
    /// Output CSV path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Whether the first row is a header
    #[arg(long, value_enum)]
    header: Option<HeaderMode>,
    /// Write every rejected row to this JSON file
    #[arg(long)]
    rejections: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).map_err(|e| car_eval_cli_error("loading config", e))?,
        None => Config::default(),
    };
    if let Some(path) = &cli.artifact {
        config.artifact_path = path.clone();
    }
    if let Some(cutoff) = cli.cutoff {
        config.similarity_cutoff = cutoff;
    }
    config
        .validate()
        .map_err(|e| car_eval_cli_error("checking config", e))?;
    Ok(config)
}

fn open_session(config: &Config) -> Result<Session, Box<dyn std::error::Error>> {
    Ok(Session::open(config).map_err(|e| car_eval_cli_error("loading model", e))?)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Predict(args) => predict(&open_session(&config)?, args),
        Command::Batch(args) => batch(&open_session(&config)?, &config, args),
        Command::Mapping { json } => mapping(&open_session(&config)?, *json),
        Command::Faq => {
            for (i, (question, answer)) in FAQ.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("Q: {question}");
                println!("A: {answer}");
            }
            Ok(())
        }
        Command::Pack { input, output } => {
            let artifact =
                pack_artifact(input, output).map_err(|e| car_eval_cli_error("packing artifact", e))?;
            println!("Packed artifact written to {}", output.display());
            println!("Source fingerprint: {}", artifact.fingerprint());
            Ok(())
        }
    }
}

fn predict(session: &Session, args: &PredictArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut raw = RawRecord::default();
    raw.set(Feature::Buying, args.buying.as_str());
    raw.set(Feature::Maint, args.maint.as_str());
    raw.set(Feature::Doors, args.doors.as_str());
    raw.set(Feature::Persons, args.persons.as_str());
    raw.set(Feature::LugBoot, args.lug_boot.as_str());
    raw.set(Feature::Safety, args.safety.as_str());

    let eval = session
        .evaluate(&raw)
        .map_err(|e| car_eval_cli_error("prediction failed", e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&eval)?);
        return Ok(());
    }
    println!("Prediction: {}", eval.explanation.label);
    println!("{}", eval.explanation.message);
    let input: Vec<String> = Feature::ALL
        .iter()
        .map(|f| format!("{}={}", f, eval.input.get(*f)))
        .collect();
    println!("Input (numeric): {}", input.join(" "));
    Ok(())
}

fn batch(
    session: &Session,
    config: &Config,
    args: &BatchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(&args.input).map_err(|e| io_cli_error("reading input file", &args.input, e))?;
    let input = read_records(file, args.header.unwrap_or(config.header))
        .map_err(|e| car_eval_cli_error("reading CSV", e))?;
    let header = input.output_header();
    let total = input.records.len();

    let report = match session.evaluate_batch(input.records) {
        Ok(report) => report,
        Err(CarEvalError::NoValidRows { rejected }) => {
            report_rejections(&rejected, total, config.rejection_preview, args.rejections.as_deref())?;
            return Err(car_eval_cli_error("batch failed", CarEvalError::NoValidRows { rejected }).into());
        }
        Err(e) => return Err(car_eval_cli_error("batch failed", e).into()),
    };
    report_rejections(&report.rejected, total, config.rejection_preview, args.rejections.as_deref())?;

    let rows = report
        .rows
        .iter()
        .map(|(row, prediction)| (&row.raw, prediction.label.as_str()));
    match &args.output {
        Some(path) => {
            let f = File::create(path).map_err(|e| io_cli_error("creating output file", path, e))?;
            write_predictions(f, &header, rows).map_err(|e| car_eval_cli_error("writing output", e))?;
            eprintln!("Wrote {} predictions to {}", report.rows.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_predictions(stdout.lock(), &header, rows)
                .map_err(|e| car_eval_cli_error("writing output", e))?;
        }
    }
    info!(predicted = report.rows.len(), rejected = report.rejected.len(), "batch complete");
    Ok(())
}

/// Print the first `preview` rejections to stderr and, when asked, write all
/// of them as JSON.
fn report_rejections(
    rejected: &[RejectedRow],
    total: usize,
    preview: usize,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !rejected.is_empty() {
        let shown = rejected.len().min(preview);
        eprintln!("{} of {} rows rejected (showing {}):", rejected.len(), total, shown);
        for row in rejected.iter().take(shown) {
            eprintln!("  row {}: {}", row.index, row.message);
        }
    }
    if let Some(path) = path {
        let mut f = File::create(path).map_err(|e| io_cli_error("creating rejections file", path, e))?;
        serde_json::to_writer_pretty(&mut f, rejected)?;
        f.write_all(b"\n")?;
    }
    Ok(())
}

fn mapping(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = session.artifact();
    let caps = artifact.capabilities();
    if json {
        let out = serde_json::json!({
            "model": artifact.model().kind(),
            "fingerprint": artifact.fingerprint(),
            "capabilities": caps,
            "ordinal_mapping": session.table(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Model: {}", artifact.model().kind());
    println!("Fingerprint: {}", artifact.fingerprint());
    println!("Scaler: {}", if caps.has_scaler { "yes" } else { "no" });
    println!("Label decoder: {}", if caps.has_label_decoder { "yes" } else { "no" });
    for feature in Feature::ALL {
        let table = session.table();
        let labels = table.labels(feature);
        if labels.is_empty() {
            return Err(simple_cli_error(&format!("no labels for {feature}")).into());
        }
        let pairs: Vec<String> = labels
            .iter()
            .filter_map(|l| table.code(feature, l).map(|c| format!("{l}={c}")))
            .collect();
        let source = if artifact.mapping().get(&feature).is_some_and(|m| !m.is_empty()) {
            "artifact"
        } else {
            "default"
        };
        println!("{:>9}: {} ({source})", feature.as_str(), pairs.join(", "));
    }
    Ok(())
}
