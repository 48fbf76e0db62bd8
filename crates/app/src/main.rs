use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use quiz_core::model::{AnswerId, Level, LevelId};
use services::progress::SubmissionOutcome;
use services::quiz::{AnswerFeedback, ChoiceView, QuestionPrompt, SummaryView};
use services::{
    Advance, ApiConfig, AppServices, Clock, QuizConfig, QuizView, SubmissionReport,
    SubmissionStatus,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLevel { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz   [--level <id>] [--api <url>] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- levels [--api <url>] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- review [--level <id>] [--api <url>] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api http://127.0.0.1:8000/");
    eprintln!("  --db sqlite://vocab.sqlite3");
    eprintln!("  --level the last selected or unlocked level");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_API_URL, VOCAB_COOKIE, VOCAB_PLAYER_NAME, VOCAB_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Levels,
    Review,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "levels" => Some(Self::Levels),
            "review" => Some(Self::Review),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    api_url: Option<String>,
    level: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("VOCAB_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| "sqlite://vocab.sqlite3".into(), normalize_sqlite_url);
        let mut api_url = None;
        let mut level = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => api_url = Some(require_value(args, "--api")?),
                "--level" => {
                    let value = require_value(args, "--level")?;
                    if value.trim().parse::<LevelId>().is_err() {
                        return Err(ArgsError::InvalidLevel { raw: value });
                    }
                    level = Some(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            api_url,
            level,
        })
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
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
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

    let path = std::path::Path::new(path);
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

//
// ─── TERMINAL VIEW ─────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct TerminalView {
    choices: Mutex<Vec<ChoiceView>>,
}

impl TerminalView {
    fn label_of(&self, answer_id: AnswerId) -> Option<(usize, String)> {
        let choices = self.choices.lock().unwrap_or_else(PoisonError::into_inner);
        choices
            .iter()
            .enumerate()
            .find(|(_, choice)| choice.answer_id == answer_id)
            .map(|(index, choice)| (index + 1, choice.label.clone()))
    }
}

impl QuizView for TerminalView {
    fn show_loading(&self, level_id: LevelId) {
        println!("Loading level {level_id}...");
    }

    fn show_question(&self, prompt: &QuestionPrompt) {
        println!();
        println!("{} [{}%]", prompt.progress.label(), prompt.progress.percent);
        println!("{}", prompt.heading);
        if let Some(audio) = &prompt.audio {
            println!("  audio: {audio}");
        }
        println!("{}", prompt.instruction);
        for (index, choice) in prompt.choices.iter().enumerate() {
            println!("  {}) {}", index + 1, choice.label);
        }
        *self.choices.lock().unwrap_or_else(PoisonError::into_inner) = prompt.choices.clone();
    }

    fn show_answer_feedback(&self, feedback: &AnswerFeedback) {
        if feedback.is_correct {
            println!("Correct!");
            return;
        }
        match feedback.correct.and_then(|id| self.label_of(id)) {
            Some((number, label)) => println!("Wrong. The answer is {number}) {label}"),
            None => println!("Wrong."),
        }
    }

    fn show_summary(&self, summary: &SummaryView) {
        println!();
        println!("{}", summary.heading);
        println!("{} ({}%)", summary.message, summary.percentage);
    }

    fn show_submitting(&self) {
        println!("Saving your progress...");
    }

    fn show_submission(&self, report: &SubmissionReport) {
        tracing::debug!(tier = report.tier, "progress saved");
        match &report.outcome {
            SubmissionOutcome::Structured(result) if result.has_passed => {
                println!("Progress saved. You passed this level.");
            }
            SubmissionOutcome::Structured(result) => match result.percentage {
                Some(pct) => println!("Progress saved ({pct:.0}%). Score 80% or more to pass."),
                None => println!("Progress saved. Score 80% or more to pass."),
            },
            SubmissionOutcome::Recorded => println!("Score recorded."),
        }
    }

    fn show_next_level(&self, level_id: LevelId) {
        println!("Next level unlocked! Continue with: quiz --level {level_id}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("{message}");
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

type Input = Lines<BufReader<Stdin>>;

fn level_line(level: &Level, current: Option<LevelId>) -> String {
    let marker = if Some(level.id) == current { '*' } else { ' ' };
    let state = match (level.is_unlocked, level.has_passed) {
        (false, _) => "locked",
        (true, true) => "passed",
        (true, false) => "open",
    };
    format!(
        "{marker} {:>3}. {:<24} {:<7} {}/{} ({:.0}%)",
        level.number, level.name, state, level.score, level.max_score, level.percentage_score
    )
}

async fn list_levels(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let levels = services.levels().load_levels().await?;
    let current = services.resolve_level(None).await.ok();
    if levels.is_empty() {
        println!("No levels available.");
        return Ok(());
    }
    for level in levels.levels() {
        println!("{}", level_line(level, current));
    }
    Ok(())
}

async fn review(
    services: &AppServices,
    level: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let level_id = level.and_then(|raw| raw.trim().parse::<LevelId>().ok());
    let items = services.review().incorrect_questions(level_id).await?;
    if items.is_empty() {
        println!("Nothing to review.");
        return Ok(());
    }
    for item in items {
        println!("{}", item.heading);
        println!("    {}", item.correct_label);
    }
    Ok(())
}

/// Read a 1-based choice until it is valid. `None` on end of input.
async fn read_choice(input: &mut Input, count: usize) -> std::io::Result<Option<usize>> {
    loop {
        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=count).contains(&choice) => return Ok(Some(choice - 1)),
            _ => eprintln!("Enter a number between 1 and {count}."),
        }
    }
}

async fn play(
    services: &AppServices,
    level: Option<&str>,
    refresh_delay: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let level_id = services.resolve_level(level).await?;
    if let Err(err) = services.levels().load_levels().await {
        tracing::warn!(error = %err, "level list unavailable, next level cannot be derived");
    }
    let mut refreshed = services.levels().subscribe();

    let view = Arc::new(TerminalView::default());
    let mut runner = services.quiz_runner(view);
    runner.start(level_id).await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let report = loop {
        let count = runner
            .current_question()
            .map_or(0, |question| question.answers().len());
        let Some(index) = read_choice(&mut input, count).await? else {
            println!("Quiz abandoned.");
            return Ok(());
        };
        let answer_id = runner
            .current_question()
            .and_then(|question| question.answers().get(index))
            .map(|answer| answer.id());
        if let Some(answer_id) = answer_id {
            runner.select_answer(answer_id)?;
        }

        println!("Press Enter to continue.");
        if input.next_line().await?.is_none() {
            println!("Quiz abandoned.");
            return Ok(());
        }
        if let Advance::Finished(report) = runner.advance().await? {
            break report;
        }
    };

    if let SubmissionStatus::Submitted(submitted) = &report.submission {
        if submitted.has_passed() {
            let wait = refresh_delay + Duration::from_secs(5);
            match tokio::time::timeout(wait, refreshed.recv()).await {
                Ok(Ok(event)) => println!("Levels updated: {} unlocked.", event.unlocked),
                _ => tracing::warn!("level list was not refreshed"),
            }
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut api = ApiConfig::from_env()?;
    if let Some(url) = &parsed.api_url {
        api = api.with_base_url(url)?;
    }
    tracing::debug!(?api, db_url = %parsed.db_url, "configuration loaded");

    // Open + migrate SQLite in the binary glue so services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let config = QuizConfig::default();
    let services = AppServices::new_http(api, &storage, config, Clock::system());

    match cmd {
        Command::Levels => list_levels(&services).await,
        Command::Review => review(&services, parsed.level.as_deref()).await,
        Command::Quiz => play(&services, parsed.level.as_deref(), config.refresh_delay()).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_level_and_api() {
        let args = parse(&["--level", "3", "--api", "http://quiz.local/", "--db", "sqlite::memory:"])
            .unwrap();
        assert_eq!(args.level.as_deref(), Some("3"));
        assert_eq!(args.api_url.as_deref(), Some("http://quiz.local/"));
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn rejects_non_numeric_level() {
        assert!(matches!(
            parse(&["--level", "three"]),
            Err(ArgsError::InvalidLevel { .. })
        ));
    }

    #[test]
    fn missing_value_is_reported() {
        assert!(matches!(
            parse(&["--api"]),
            Err(ArgsError::MissingValue { flag: "--api" })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/vocab.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/vocab.sqlite3"));
    }

    #[test]
    fn level_line_marks_current_level() {
        let level = Level {
            id: LevelId::new(2),
            number: 2,
            name: "Animals".into(),
            description: None,
            is_unlocked: true,
            is_completed: true,
            score: 9,
            max_score: 10,
            percentage_score: 90.0,
            has_passed: true,
        };
        let line = level_line(&level, Some(LevelId::new(2)));
        assert!(line.starts_with('*'));
        assert!(line.contains("passed"));
        assert!(line.contains("9/10 (90%)"));
    }
}
