mod logging;
mod presenter;
mod speech;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use services::{
    Clock, CollectionManifest, Importer, RunSource, SessionLoopService, SessionService, Speaker,
    SpeechPlayer, StartOptions,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use vocab_core::model::{AnswerMode, ModeParseError, RunLabels, StudyDirection};

use presenter::{Outcome, Presenter};
use speech::{CommandSpeech, SilentSpeech};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDelimiter { raw: String },
    InvalidMode(ModeParseError),
    MissingSource,
    MissingManifest,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDelimiter { raw } => {
                write!(f, "invalid --delimiter value (expected one character): {raw}")
            }
            ArgsError::InvalidMode(err) => write!(f, "{err}"),
            ArgsError::MissingSource => write!(
                f,
                "nothing to study: pass --file, --collection with --run, or --resume"
            ),
            ArgsError::MissingManifest => write!(f, "--collection requires --manifest"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ModeParseError> for ArgsError {
    fn from(err: ModeParseError) -> Self {
        ArgsError::InvalidMode(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- study [--file <path> | --manifest <path> --collection <name> --run <label> | --resume]");
    eprintln!("                            [--direction <source|target|random>] [--mode <reveal|type>]");
    eprintln!("                            [--delimiter <char>] [--export-dir <dir>] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- list  --manifest <path> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:vocab.sqlite3");
    eprintln!("  --direction source  --mode reveal  --delimiter ,  --export-dir .");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_DB_URL, VOCAB_LOG, VOCAB_TTS");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Study,
    List,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "study" => Some(Self::Study),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    File(PathBuf),
    Collection {
        manifest: PathBuf,
        collection: String,
        run: String,
    },
    Resume,
}

#[derive(Debug)]
struct Args {
    db_url: String,
    source: Option<Source>,
    manifest: Option<PathBuf>,
    direction: StudyDirection,
    mode: AnswerMode,
    delimiter: char,
    export_dir: PathBuf,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("VOCAB_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://vocab.sqlite3".into(), normalize_sqlite_url);
        let mut file = None;
        let mut manifest = None;
        let mut collection = None;
        let mut run = None;
        let mut resume = false;
        let mut direction = StudyDirection::default();
        let mut mode = AnswerMode::default();
        let mut delimiter = ',';
        let mut export_dir = PathBuf::from(".");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--file" => file = Some(PathBuf::from(require_value(args, "--file")?)),
                "--manifest" => manifest = Some(PathBuf::from(require_value(args, "--manifest")?)),
                "--collection" => collection = Some(require_value(args, "--collection")?),
                "--run" => run = Some(require_value(args, "--run")?),
                "--resume" => resume = true,
                "--direction" => direction = require_value(args, "--direction")?.parse()?,
                "--mode" => mode = require_value(args, "--mode")?.parse()?,
                "--delimiter" => {
                    let value = require_value(args, "--delimiter")?;
                    delimiter = parse_delimiter(&value)?;
                }
                "--export-dir" => {
                    export_dir = PathBuf::from(require_value(args, "--export-dir")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let source = match (file, collection, run) {
            (Some(path), _, _) => Some(Source::File(path)),
            (None, Some(collection), Some(run)) => Some(Source::Collection {
                manifest: manifest.clone().ok_or(ArgsError::MissingManifest)?,
                collection,
                run,
            }),
            (None, Some(_), None) => return Err(ArgsError::MissingValue { flag: "--run" }),
            _ if resume => Some(Source::Resume),
            _ => None,
        };

        Ok(Self {
            db_url,
            source,
            manifest,
            direction,
            mode,
            delimiter,
            export_dir,
        })
    }
}

fn parse_delimiter(raw: &str) -> Result<char, ArgsError> {
    if raw == "\\t" || raw.eq_ignore_ascii_case("tab") {
        return Ok('\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ArgsError::InvalidDelimiter {
            raw: raw.to_owned(),
        }),
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn load_manifest(path: &Path) -> Result<CollectionManifest, Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(CollectionManifest::from_json(&text)?)
}

async fn start_or_resume(
    args: &Args,
    loop_svc: &SessionLoopService,
    source: &Source,
) -> Result<SessionService, Box<dyn std::error::Error>> {
    let importer = Importer::new().with_text_delimiter(args.delimiter);
    let (entries, labels) = match source {
        Source::Resume => {
            return loop_svc
                .resume()
                .await
                .filter(|session| !session.is_complete())
                .ok_or_else(|| "no unfinished session to resume".into());
        }
        Source::File(path) => {
            let bytes = tokio::fs::read(path).await?;
            let name = path.to_string_lossy();
            (importer.import_file(&name, &bytes).await?, RunLabels::default())
        }
        Source::Collection {
            manifest,
            collection,
            run,
        } => {
            let base = manifest.parent().unwrap_or_else(|| Path::new("."));
            let file = match load_manifest(manifest).await?.locate(collection, run)? {
                RunSource::Archive { file_name } => base.join(file_name),
                RunSource::Plain { path } => base.join(path),
            };
            let bytes = tokio::fs::read(&file).await?;
            let entries = importer
                .import_file(&file.to_string_lossy(), &bytes)
                .await?;
            let labels = RunLabels::new(Some(collection.clone()), Some(run.clone()));
            (entries, labels)
        }
    };

    let options = StartOptions {
        study_direction: args.direction,
        answer_mode: args.mode,
        labels,
    };
    Ok(loop_svc
        .start_session(entries, options, &mut rand::rng())
        .await?)
}

async fn list(args: &Args, loop_svc: &SessionLoopService) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.manifest.as_ref().ok_or(ArgsError::MissingManifest)?;
    let manifest = load_manifest(path).await?;
    let completed = loop_svc.store().completed_keys().await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to read completed runs");
        Vec::new()
    });

    if let Some(info) = loop_svc.store().resume_info().await {
        let label = info.labels.completion_key().unwrap_or_else(|| "file".into());
        println!(
            "Unfinished run {label} from {}: {} card(s) left (--resume)",
            info.started_at.format("%Y-%m-%d %H:%M"),
            info.remaining
        );
    }
    for collection in &manifest.collections {
        println!("{} {} ({})", collection.icon, collection.display_name, collection.name);
        let runs: Vec<String> = collection
            .runs
            .iter()
            .map(|run| {
                let key = format!("{}:{run}", collection.name);
                if completed.contains(&key) {
                    format!("{run}*")
                } else {
                    run.clone()
                }
            })
            .collect();
        println!("  runs: {}", runs.join(" "));
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Study,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Study,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let clock = Clock::default();
    let loop_svc = SessionLoopService::new(clock, Arc::clone(&storage.kv));

    match cmd {
        Command::List => list(&parsed, &loop_svc).await,
        Command::Study => {
            let source = match &parsed.source {
                Some(source) => source.clone(),
                None if loop_svc.store().resume_info().await.is_some() => Source::Resume,
                None => return Err(ArgsError::MissingSource.into()),
            };
            let mut session = start_or_resume(&parsed, &loop_svc, &source).await?;

            let player: Arc<dyn SpeechPlayer> = match CommandSpeech::from_env() {
                Some(player) => Arc::new(player),
                None => Arc::new(SilentSpeech),
            };
            let mut presenter = Presenter::new(
                &loop_svc,
                Speaker::new(player),
                clock,
                parsed.export_dir.clone(),
                rand::rng(),
            );

            let mut input = BufReader::new(tokio::io::stdin()).lines();
            match presenter.run(&mut session, &mut input).await? {
                Outcome::Completed => {}
                Outcome::Suspended => println!("Progress saved. Run with --resume to continue."),
                Outcome::Abandoned => println!("Run abandoned."),
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
