use clap::Parser;
use mathdrill::{
    attempt::Outcome,
    catalog::{PracticeSet, OPTION_LETTERS},
    config::{Config, ConfigStore, FileConfigStore},
    history::{HistoryReader, ProgressDb},
    selection::{SelectionMode, SelectorOptions},
    session::Session,
    summary::{export_csv, ProgressReport},
};
use rand::seq::SliceRandom;
use std::{
    error::Error,
    fs::File,
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Instant,
};

/// A small rotation of sign-off lines shown when a sitting ends.
const PHRASES: [&str; 8] = [
    "Practice makes perfect. - Benjamin Franklin",
    "Everything is practice. - Pele",
    "The only way to learn mathematics is to do mathematics. - Paul Halmos",
    "Mistakes are proof that you are trying.",
    "Every problem is a chance for you to do your best.",
    "The expert in anything was once a beginner.",
    "Don't practice until you get it right. Practice until you can't get it wrong.",
    "It does not matter how slowly you go as long as you do not stop. - Confucius",
];

/// adaptive math practice in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Terminal math practice that adapts question difficulty to your recent performance, with per-tier progress tracking and an optional purely random mode."
)]
pub struct Cli {
    /// built-in practice set to drill
    #[clap(short = 's', long)]
    set: Option<String>,

    /// load a practice set from a JSON file instead of a built-in one
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// username progress is tracked under
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// number of questions to ask (default: the whole set)
    #[clap(short = 'n', long)]
    questions: Option<usize>,

    /// use uniform random selection instead of adaptive difficulty targeting (default: adaptive selection that tracks your proficiency)
    #[clap(long)]
    random: bool,

    /// how many recent attempts weigh into the proficiency estimate
    #[clap(short = 'w', long)]
    window: Option<usize>,

    /// print the progress report for the chosen set and exit
    #[clap(long)]
    summary: bool,

    /// export the attempt log as CSV to the given path and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// list built-in practice sets and exit
    #[clap(long)]
    list_sets: bool,

    /// override the progress database location
    #[clap(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_sets {
        for name in PracticeSet::builtin_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    let changed = apply_overrides(&mut config, &cli);
    if changed {
        // Flags are sticky: the next plain `mathdrill` reuses them.
        let _ = store.save(&config);
    }

    let options = SelectorOptions::from(&config);
    let set = match &cli.file {
        Some(path) => PracticeSet::from_path(path)?,
        None => PracticeSet::builtin(&config.practice_set)?,
    };

    let db = match &cli.db {
        Some(path) => ProgressDb::open_at(path)?,
        None => ProgressDb::new()?,
    };

    if cli.summary {
        let report = ProgressReport::from_db(&db, &config.username, &set.name, &options)?;
        print!("{}", report.render());
        return Ok(());
    }

    if let Some(path) = &cli.export {
        let attempts = db.get_attempts(&config.username, &set.name)?;
        export_csv(&attempts, File::create(path)?)?;
        println!("exported {} attempts to {}", attempts.len(), path.display());
        return Ok(());
    }

    let mode = if config.random_questions {
        SelectionMode::Random
    } else {
        SelectionMode::Adaptive
    };
    let session = Session::with_store(&config.username, set, mode, options, db)?
        .with_max_questions(cli.questions);

    run_drill(session)
}

/// Merge CLI flags over the persisted configuration. Returns whether
/// anything changed and should be written back.
fn apply_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;
    if let Some(user) = &cli.user {
        if config.username != *user {
            config.username = user.clone();
            changed = true;
        }
    }
    if let Some(set) = &cli.set {
        if config.practice_set != *set {
            config.practice_set = set.clone();
            changed = true;
        }
    }
    if cli.random && !config.random_questions {
        config.random_questions = true;
        changed = true;
    }
    if let Some(window) = cli.window {
        if config.recent_window != window {
            config.recent_window = window;
            changed = true;
        }
    }
    changed
}

fn run_drill(mut session: Session) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!(
        "{} practice on `{}` for {} - answer with a letter, q to quit",
        session.mode, session.set.name, session.username
    );

    'drill: loop {
        let question = match session.next_question()? {
            Some(q) => q.clone(),
            None => break,
        };

        println!();
        println!("[tier {}] {}", question.tier, question.prompt);
        for (letter, choice) in OPTION_LETTERS.iter().zip(&question.choices) {
            println!("  {letter}) {choice}");
        }

        let budget = session.options.time_budget_for(question.tier);
        let started = Instant::now();
        let choice = loop {
            print!("answer> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                println!();
                break 'drill;
            }
            let trimmed = line.trim().to_uppercase();
            if trimmed == "Q" || trimmed == "QUIT" {
                break 'drill;
            }
            if OPTION_LETTERS.contains(&trimmed.as_str()) {
                break trimmed;
            }
            println!("answer with a letter (A-E), or q to quit");
        };

        let elapsed = started.elapsed().as_secs().min(u32::MAX as u64) as u32;
        match session.answer(&choice, elapsed) {
            Some(Outcome::Correct) if elapsed > budget => {
                println!("correct, but over the {budget}s budget ({elapsed}s)");
            }
            Some(Outcome::Correct) => println!("correct!"),
            Some(Outcome::Incorrect) => {
                println!("incorrect, the answer was {}", question.answer);
            }
            None => {}
        }
    }

    let results = session.results();
    if results.answered == 0 {
        println!("no questions answered");
        return Ok(());
    }

    println!();
    println!(
        "session complete: {}/{} correct ({:.0}%)",
        results.correct, results.answered, results.accuracy
    );
    println!(
        "average time {:.1}s (sd {:.1})",
        results.avg_time_secs, results.std_dev
    );
    println!(
        "proficiency estimate {:.2} -> {:.2}",
        results.estimate_before, results.estimate_after
    );
    for (tier, correct, total) in &results.per_tier {
        println!("  tier {tier}: {correct}/{total}");
    }

    let phrase = PHRASES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PHRASES[0]);
    println!();
    println!("{phrase}");

    Ok(())
}
