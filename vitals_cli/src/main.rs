use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vitals_core::*;

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Heart, motion and training-load analytics for athletes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Heart rate and HRV from an ECG recording (columns: Time, ECG)
    Ecg {
        file: PathBuf,

        /// Sampling rate in Hz (defaults to the configured rate)
        #[arg(long)]
        fs: Option<f64>,
    },

    /// Movement intensity from accelerometer columns (accel_x, accel_y, accel_z)
    Motion {
        file: PathBuf,

        /// Print the intensity of every row
        #[arg(long)]
        series: bool,
    },

    /// Import a sensor CSV into a user's history
    Import {
        file: PathBuf,

        #[arg(long)]
        user: UserId,
    },

    /// Record a questionnaire response
    Record {
        #[arg(long)]
        user: UserId,

        /// Questionnaire (general, bienestar, sueno)
        #[arg(long)]
        questionnaire: String,

        /// Answer as key=value, e.g. --set rpe=7
        #[arg(long = "set", value_parser = parse_answer)]
        answers: Vec<(String, f64)>,

        /// Backdate the response by this many days
        #[arg(long, default_value_t = 0)]
        days_ago: u32,
    },

    /// Training load series from general questionnaires
    Load {
        #[arg(long)]
        user: UserId,

        /// Only the trailing number of days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Acute:chronic workload ratio
    Acwr {
        #[arg(long)]
        user: UserId,

        #[arg(long)]
        acute: Option<u32>,

        #[arg(long)]
        chronic: Option<u32>,
    },

    /// Current vital-sign and fatigue risk
    Risk {
        #[arg(long)]
        user: UserId,
    },

    /// Export a user's questionnaire and sensor history to CSV
    Export {
        #[arg(long)]
        user: UserId,

        /// Output file (defaults to <data-dir>/export_user_<id>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_answer(raw: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid number for {}: {}", key, e))?;
    Ok((key.trim().to_string(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    vitals_core::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let journal = Journal::new(data_dir.join("journal"));
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Ecg { file, fs } => cmd_ecg(&file, fs, &config),
        Commands::Motion { file, series } => cmd_motion(&file, series),
        Commands::Import { file, user } => cmd_import(journal, &file, user),
        Commands::Record {
            user,
            questionnaire,
            answers,
            days_ago,
        } => cmd_record(journal, user, &questionnaire, &answers, days_ago),
        Commands::Load { user, days } => cmd_load(&journal, user, days),
        Commands::Acwr {
            user,
            acute,
            chronic,
        } => {
            let windows = WorkloadConfig {
                acute_days: acute.unwrap_or(config.workload.acute_days),
                chronic_days: chronic.unwrap_or(config.workload.chronic_days),
            };
            cmd_acwr(&journal, user, &windows)
        }
        Commands::Risk { user } => cmd_risk(&journal, user),
        Commands::Export { user, out } => {
            let out = out.unwrap_or_else(|| data_dir.join(format!("export_user_{}.csv", user)));
            cmd_export(&journal, user, &out)
        }
    }
}

fn cmd_ecg(file: &Path, fs: Option<f64>, config: &Config) -> Result<()> {
    let ecg_config = config
        .ecg
        .with_sample_rate(fs.unwrap_or(config.ecg.sample_rate_hz));
    let waveform = ingest::read_ecg_csv_path(file, ecg_config.sample_rate_hz)?;

    match ecg::analyze(&waveform, &ecg_config) {
        Ok(metrics) => {
            println!("Beats: {}", metrics.peaks.len());
            println!("BPM: {:.1}", metrics.bpm);
            println!("HRV (RMSSD): {:.1} ms", metrics.hrv_rmssd_ms);
            Ok(())
        }
        Err(Error::InsufficientSignal { peaks }) => {
            println!(
                "Insufficient signal: {} beat(s) detected in {} samples; BPM and HRV unavailable",
                peaks,
                waveform.amplitudes.len()
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn cmd_motion(file: &Path, series: bool) -> Result<()> {
    let axes = ingest::read_axes_csv_path(file)?;
    let intensity = motion::magnitude(&axes)?;

    if series {
        for value in &intensity {
            println!("{:.4}", value);
        }
    }

    println!("Samples: {}", intensity.len());
    if !intensity.is_empty() {
        let mean = intensity.iter().sum::<f64>() / intensity.len() as f64;
        let peak = intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!("Mean intensity: {:.3}", mean);
        println!("Peak intensity: {:.3}", peak);
    }
    Ok(())
}

fn cmd_import(mut journal: Journal, file: &Path, user: UserId) -> Result<()> {
    let samples = ingest::read_sensor_csv_path(file)?;
    if samples.is_empty() {
        println!("No rows to import.");
        return Ok(());
    }

    journal.append_samples(user, &samples)?;
    println!("✓ Imported {} samples for user {}", samples.len(), user);
    Ok(())
}

fn cmd_record(
    mut journal: Journal,
    user: UserId,
    questionnaire: &str,
    answers: &[(String, f64)],
    days_ago: u32,
) -> Result<()> {
    let kind: QuestionnaireKind = questionnaire.parse()?;
    let answers = get_default_catalog().build_answers(kind, answers)?;
    let timestamp = Utc::now()
        .checked_sub_signed(Duration::days(i64::from(days_ago)))
        .ok_or_else(|| Error::Other(format!("--days-ago {} is out of range", days_ago)))?;

    let response = QuestionnaireResponse::new(user, timestamp, answers);
    journal.append_response(&response)?;
    println!("✓ Saved {} questionnaire", kind);

    if kind == QuestionnaireKind::General {
        println!("Fatigue: {}", classify_fatigue(response.answers.fatigue()));
        if let Some(session) = load::session_load(&response.answers) {
            println!("Session load: {:.1}", session);
        }
    }
    Ok(())
}

fn cmd_load(journal: &Journal, user: UserId, days: Option<u32>) -> Result<()> {
    let series = load_history(journal, user, days)?;
    for point in &series {
        println!("{}  {:.1}", point.timestamp.format("%Y-%m-%d %H:%M"), point.load);
    }
    println!("Sessions: {}", series.len());
    Ok(())
}

fn cmd_acwr(journal: &Journal, user: UserId, windows: &WorkloadConfig) -> Result<()> {
    match compute_acwr(journal, user, windows) {
        Ok(acwr) => {
            println!("ACWR: {:.2} ({:?})", acwr.ratio, acwr.zone);
            println!(
                "  Acute ({} days): {} sessions",
                windows.acute_days, acwr.acute_points
            );
            println!(
                "  Chronic ({} days): {} sessions",
                windows.chronic_days, acwr.chronic_points
            );
            Ok(())
        }
        Err(Error::UndefinedRatio { acute, chronic }) => {
            println!(
                "ACWR: undefined ({} acute / {} chronic sessions)",
                acute, chronic
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn cmd_risk(journal: &Journal, user: UserId) -> Result<()> {
    let vitals = vital_risk(journal, user)?;
    let responses =
        journal.questionnaire_history(user, Some(QuestionnaireKind::General), None)?;
    let fatigue = classify_fatigue(risk::latest_fatigue(&responses));

    println!("Vital signs: {}", vitals);
    println!("Fatigue: {}", fatigue);
    Ok(())
}

fn cmd_export(journal: &Journal, user: UserId, out: &Path) -> Result<()> {
    let rows = export::export_user_data(journal, user, out)?;
    println!("✓ Exported {} rows to {}", rows, out.display());
    Ok(())
}
