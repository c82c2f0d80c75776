use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spermai::{AppConfig, Aggregation, Event, Outcome, PatientRecord, Session, SpermClass, YoloDetector};

#[derive(Parser)]
#[command(name = "spermai")]
#[command(about = "Classify sperm cells in microscopy images and write clinical reports")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Detection model, overrides the configured path
    #[arg(long, value_name = "MODEL", global = true)]
    model: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run detection on an image and print the statistics
    Analyze {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Print the aggregate as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyse an image and write text and HTML reports
    Report {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Analyse an image and store it with a statistics snapshot
    Save {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,
    },
}

#[derive(Args)]
struct PatientArgs {
    /// Patient full name
    #[arg(long)]
    name: String,

    /// Date of birth, DD.MM.YYYY
    #[arg(long)]
    birth_date: String,

    /// Patient ID
    #[arg(long)]
    id: String,

    /// Conclusion text
    #[arg(long, default_value = "")]
    conclusion: String,

    /// Doctor name
    #[arg(long)]
    doctor: String,
}

impl From<PatientArgs> for PatientRecord {
    fn from(args: PatientArgs) -> Self {
        PatientRecord {
            full_name: args.name,
            birth_date: args.birth_date,
            id: args.id,
            conclusion: args.conclusion,
            doctor: args.doctor,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(model) = args.model {
        config.model.path = model;
    }

    let mut session = Session::from_load(YoloDetector::load(&config.model), &config);
    if args.verbose {
        println!("{}", session.status());
    }

    match args.command {
        Command::Analyze { image_path, json } => {
            let aggregation = analyze(&mut session, image_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&aggregation)?);
            } else {
                print_aggregation(&aggregation);
            }
        }
        Command::Report { image_path, patient } => {
            let aggregation = analyze(&mut session, image_path)?;
            print_aggregation(&aggregation);
            if let Outcome::ReportWritten(report) =
                session.handle(Event::GenerateReport(patient.into()))?
            {
                println!("\nReport saved:");
                println!("  TXT:  {}", report.text_path.display());
                println!("  HTML: {}", report.html_path.display());
            }
        }
        Command::Save { image_path } => {
            // Disabled analysis keeps the image loaded; an inference failure clears it
            if let Err(err) = session.handle(Event::LoadImage(image_path)) {
                eprintln!("Warning: {err}");
            }
            if let Outcome::ResultsSaved(saved) = session.handle(Event::SaveResults)? {
                println!("Results saved:");
                println!("  Image: {}", saved.image_path.display());
                println!("  Data:  {}", saved.data_path.display());
            }
        }
    }

    Ok(())
}

fn analyze(session: &mut Session<YoloDetector>, image_path: PathBuf) -> anyhow::Result<Aggregation> {
    match session.handle(Event::LoadImage(image_path))? {
        Outcome::Analyzed(aggregation) => Ok(aggregation),
        other => anyhow::bail!("unexpected outcome: {other:?}"),
    }
}

fn print_aggregation(aggregation: &Aggregation) {
    match aggregation {
        Aggregation::NoDetections => println!("No sperm cells found."),
        Aggregation::Counted(result) => {
            println!("\n=== Analysis Results ===");
            println!("Total cells: {}", result.total_count);
            for class in SpermClass::ALL {
                println!(
                    "  {:<9} {:>3}%  ({} cells)",
                    class.label(),
                    result.percentages.get(class),
                    result.counts.get(class)
                );
            }
        }
    }
}
