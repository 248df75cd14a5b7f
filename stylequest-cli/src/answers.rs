use anyhow::{Context, Result, bail};
use stylequest_game::{Answer, ChallengeAnswers, ChallengeStep, StepKind};

/// Parse repeated `STEP=VALUE` flags against a challenge's steps.
pub fn parse_answer_flags(steps: &[ChallengeStep], flags: &[String]) -> Result<ChallengeAnswers> {
    let mut answers = ChallengeAnswers::new();
    for flag in flags {
        let Some((step_id, value)) = flag.split_once('=') else {
            bail!("answer `{flag}` must look like STEP=VALUE");
        };
        let step_id = step_id.trim();
        let Some(step) = steps.iter().find(|s| s.id == step_id) else {
            let known: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
            bail!("unknown step `{step_id}` (steps: {})", known.join(", "));
        };
        let answer = step
            .parse_answer(value)
            .with_context(|| format!("invalid answer for step `{step_id}`"))?;
        answers.insert(step.id.clone(), answer);
    }
    Ok(answers)
}

/// A plausible answer for every step, used by `complete --all`.
pub fn sample_answers(steps: &[ChallengeStep]) -> ChallengeAnswers {
    steps
        .iter()
        .map(|step| (step.id.clone(), sample_answer(step)))
        .collect()
}

fn sample_answer(step: &ChallengeStep) -> Answer {
    match step.kind {
        StepKind::Selection => Answer::Text(
            step.options
                .first()
                .map_or_else(|| "yes".into(), |o| o.id.clone()),
        ),
        StepKind::MultiSelection => {
            let mut picks: Vec<String> =
                step.options.iter().take(2).map(|o| o.id.clone()).collect();
            if picks.is_empty() {
                picks.push("yes".into());
            }
            Answer::Choices(picks)
        }
        StepKind::Rating => Answer::Rating(step.rating_scale()),
        StepKind::TextInput => Answer::Text("Completed from the terminal".into()),
    }
}
