use colored::Colorize;
use stylequest_game::{
    BadgeCatalog, BadgeStatus, CalendarDay, ChallengeStep, CompletionOutcome,
    DailyChallengeInstance, LevelProgress, ProgressLedger, StepKind, StreakChange,
};

const BAR_WIDTH: usize = 20;

pub fn banner() {
    println!("{}", "👗 StyleQuest".bright_magenta().bold());
    println!("{}", "=============".magenta());
}

pub fn challenges(today: CalendarDay, set: &[DailyChallengeInstance], today_xp: u32) {
    println!(
        "{} {} ({})",
        "📅 Challenges for".bold(),
        today.to_string().bold(),
        today.weekday()
    );
    if set.is_empty() {
        println!("   No challenges scheduled today.");
    }
    for instance in set {
        let c = &instance.challenge;
        let status = if instance.is_completed {
            "✅".green()
        } else {
            "⬜".normal()
        };
        println!(
            "{status} {} {} {} [{}] {}",
            c.emoji,
            c.title.bold(),
            format!("({})", c.id).dimmed(),
            format!("{:?}", c.difficulty).yellow(),
            format!("up to {} XP", c.points).cyan()
        );
        println!("      {}", c.description);
    }
    println!();
    println!("XP earned today: {}", today_xp.to_string().cyan().bold());
}

pub fn steps(challenge_id: &str, steps: &[ChallengeStep]) {
    println!("{} {}", "📝 Steps for".bold(), challenge_id.bold());
    for (index, step) in steps.iter().enumerate() {
        println!("{}. {} {}", index + 1, step.question, format!("[{}]", step.id).dimmed());
        match step.kind {
            StepKind::Selection | StepKind::MultiSelection => {
                let hint = if step.kind == StepKind::MultiSelection {
                    "choose any, comma separated"
                } else {
                    "choose one"
                };
                println!("   {}", hint.dimmed());
                for option in &step.options {
                    println!("   - {} {}", option.id.cyan(), option.label);
                }
            }
            StepKind::Rating => {
                println!("   {}", format!("rate 1-{}", step.rating_scale()).dimmed());
            }
            StepKind::TextInput => {
                let hint = step.placeholder.as_deref().unwrap_or("free text");
                println!("   {}", hint.dimmed());
            }
        }
    }
}

pub fn completion(outcome: &CompletionOutcome, badges: &BadgeCatalog, xp_per_level: u32) {
    let xp = &outcome.xp;
    println!(
        "{} {}",
        "🎉 Completed".green().bold(),
        outcome.challenge_id.bold()
    );
    println!(
        "   +{} XP ({}/{} steps, base {}, streak bonus {})",
        outcome.earned_xp.to_string().cyan().bold(),
        xp.answered,
        xp.total_steps,
        xp.base_xp,
        xp.streak_bonus
    );
    let streak_note = match outcome.streak {
        StreakChange::Started => "streak started",
        StreakChange::Extended => "streak extended",
        StreakChange::Reset => "streak restarted",
        StreakChange::SameDay => "already active today",
    };
    println!(
        "   🔥 {} day streak ({streak_note})",
        outcome.ledger.current_streak
    );
    if let Some(level_up) = outcome.level_up {
        println!(
            "   {} level {} → {}",
            "⬆️  Level up!".yellow().bold(),
            level_up.old_level,
            level_up.new_level
        );
    }
    for id in &outcome.new_badges {
        match badges.get(id) {
            Some(badge) => println!(
                "   {} {} {}",
                "🏅 New badge:".bright_yellow().bold(),
                badge.emoji,
                badge.name.bold()
            ),
            None => println!("   {} {id}", "🏅 New badge:".bright_yellow().bold()),
        }
    }
    println!("   XP today: {}", outcome.today_xp);
    level_bar(&outcome.ledger.level_progress(xp_per_level));
}

pub fn progress(
    ledger: &ProgressLedger,
    level: &LevelProgress,
    today_xp: u32,
    badges: &BadgeCatalog,
) {
    println!("{}", "📈 Progress".bold());
    println!("   Level {}", level.level.to_string().bold());
    level_bar(level);
    println!("   Total XP: {}", ledger.total_xp.to_string().cyan());
    println!("   XP today: {today_xp}");
    println!(
        "   Streak: {} (longest {})",
        ledger.current_streak.to_string().yellow(),
        ledger.longest_streak
    );
    println!("   Challenges completed: {}", ledger.challenges_completed);
    println!("   Badges: {}", ledger.badges.len());
    for badge in badges.unlocked(ledger) {
        println!("     {} {}", badge.emoji, badge.name);
    }
    match ledger.last_active_date {
        Some(day) => println!("   Last active: {day}"),
        None => println!("   Last active: never"),
    }
}

pub fn badge_list(statuses: &[BadgeStatus<'_>]) {
    println!("{}", "🏅 Badges".bold());
    for status in statuses {
        let badge = status.badge;
        if status.unlocked {
            println!(
                "{} {} {} - {}",
                "✅".green(),
                badge.emoji,
                badge.name.bold(),
                badge.description
            );
        } else {
            println!(
                "{} {} {} - {}",
                "🔒".normal(),
                badge.emoji,
                badge.name.dimmed(),
                badge.description.dimmed()
            );
        }
    }
    let unlocked = statuses.iter().filter(|s| s.unlocked).count();
    println!();
    println!("Unlocked {unlocked}/{}", statuses.len());
}

fn level_bar(level: &LevelProgress) {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((level.fraction() * BAR_WIDTH as f64).floor() as usize).min(BAR_WIDTH);
    println!(
        "   [{}{}] {}/{} XP to level {}",
        "#".repeat(filled).green(),
        "-".repeat(BAR_WIDTH - filled).dimmed(),
        level.xp_into_level,
        level.xp_per_level,
        level.level.saturating_add(1)
    );
}
