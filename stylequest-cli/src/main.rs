mod answers;
mod file_store;
mod render;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use answers::{parse_answer_flags, sample_answers};
use file_store::JsonFileStore;
use stylequest_game::{
    CalendarDay, Clock, FixedClock, GamificationConfig, QuestError, StyleQuest, SystemClock,
};

#[derive(Debug, Parser)]
#[command(name = "stylequest", version)]
#[command(about = "Daily style challenges with XP, streaks and badges")]
struct Args {
    /// JSON file holding challenges and progress
    #[arg(long, global = true, default_value = ".stylequest/store.json")]
    store: PathBuf,

    /// Gamification settings override (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for drawing the daily set (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Pretend today is this day (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<CalendarDay>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List today's challenges
    Today,
    /// Show the steps of a challenge
    Steps { id: String },
    /// Complete one of today's challenges
    Complete {
        id: String,
        /// Answer a step, e.g. `--answer base-item=top` (repeatable)
        #[arg(long = "answer", value_name = "STEP=VALUE")]
        answers: Vec<String>,
        /// Answer every step with a sample value
        #[arg(long, conflicts_with = "answers")]
        all: bool,
    },
    /// Show XP, level and streaks
    Progress,
    /// List badges and which are unlocked
    Badges,
    /// Draw a new set for today (only before anything is completed)
    Refresh,
    /// Forget today's set and all progress
    Reset,
}

/// Either the real local date or a pinned one.
enum SessionClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl Clock for SessionClock {
    fn today(&self) -> CalendarDay {
        match self {
            Self::System(clock) => clock.today(),
            Self::Fixed(clock) => clock.today(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System(clock) => clock.now(),
            Self::Fixed(clock) => clock.now(),
        }
    }
}

type Session = StyleQuest<JsonFileStore, SessionClock>;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut quest = open_session(&args)?;
    if !args.json {
        render::banner();
    }

    match &args.command {
        Command::Today => today(&mut quest, args.json),
        Command::Steps { id } => steps(&quest, id, args.json),
        Command::Complete { id, answers, all } => {
            complete(&mut quest, id, answers, *all, args.json)
        }
        Command::Progress => progress(&quest, args.json),
        Command::Badges => badges(&quest, args.json),
        Command::Refresh => refresh(&mut quest, args.json),
        Command::Reset => reset(&quest, args.json),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn open_session(args: &Args) -> Result<Session> {
    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GamificationConfig::from_json(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GamificationConfig::default_config(),
    };
    let clock = args.today.map_or(SessionClock::System(SystemClock), |day| {
        SessionClock::Fixed(FixedClock::new(day))
    });
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("store {}, rotation seed {seed}", args.store.display());

    Ok(StyleQuest::seeded(JsonFileStore::new(&args.store), clock, seed).with_config(config))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn today(quest: &mut Session, as_json: bool) -> Result<()> {
    let set = quest.todays_challenges();
    let day = quest.clock().today();
    let today_xp = quest.today_xp();
    if as_json {
        return print_json(&json!({
            "date": day,
            "todayXP": today_xp,
            "challenges": set,
        }));
    }
    render::challenges(day, &set, today_xp);
    Ok(())
}

fn steps(quest: &Session, id: &str, as_json: bool) -> Result<()> {
    let Some(steps) = quest.challenge_steps(id) else {
        bail!("no challenge with id `{id}`");
    };
    if as_json {
        return print_json(&steps);
    }
    render::steps(id, steps);
    Ok(())
}

fn complete(
    quest: &mut Session,
    id: &str,
    flags: &[String],
    all: bool,
    as_json: bool,
) -> Result<()> {
    let answers = {
        let Some(steps) = quest.challenge_steps(id) else {
            bail!("no challenge with id `{id}`");
        };
        if all {
            sample_answers(steps)
        } else {
            parse_answer_flags(steps, flags)?
        }
    };
    let outcome = quest
        .complete_challenge(id, &answers)
        .with_context(|| format!("completing `{id}`"))?;
    if as_json {
        return print_json(&outcome);
    }
    render::completion(&outcome, quest.badge_catalog(), quest.config().xp_per_level);
    Ok(())
}

fn progress(quest: &Session, as_json: bool) -> Result<()> {
    let ledger = quest.progress();
    let level = quest.level_progress();
    let today_xp = quest.today_xp();
    if as_json {
        return print_json(&json!({
            "progress": ledger,
            "levelProgress": level,
            "todayXP": today_xp,
        }));
    }
    render::progress(&ledger, &level, today_xp, quest.badge_catalog());
    Ok(())
}

fn badges(quest: &Session, as_json: bool) -> Result<()> {
    let statuses = quest.badges();
    if as_json {
        let list: Vec<_> = statuses
            .iter()
            .map(|s| json!({ "badge": s.badge, "unlocked": s.unlocked }))
            .collect();
        return print_json(&list);
    }
    render::badge_list(&statuses);
    Ok(())
}

fn refresh(quest: &mut Session, as_json: bool) -> Result<()> {
    let set = match quest.refresh_challenges() {
        Ok(set) => set,
        Err(err @ QuestError::AlreadyCompletedToday { .. }) => {
            bail!("{err}; finish today's set or come back tomorrow")
        }
        Err(err) => return Err(err).context("refreshing today's challenges"),
    };
    if as_json {
        return print_json(&set);
    }
    let day = quest.clock().today();
    render::challenges(day, &set, quest.today_xp());
    Ok(())
}

fn reset(quest: &Session, as_json: bool) -> Result<()> {
    quest.reset().context("resetting progress")?;
    if as_json {
        return print_json(&json!({ "reset": true }));
    }
    println!("Progress and today's challenges were cleared.");
    Ok(())
}
