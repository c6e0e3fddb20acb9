//! Line-oriented terminal presenter for one learning run.

use std::path::PathBuf;

use rand::Rng;
use services::export::export_wrong_log;
use services::sessions::format_elapsed;
use services::{ElapsedTimer, SessionLoopService, SessionService, Speaker};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use vocab_core::Clock;
use vocab_core::answer::{CardView, Verdict};
use vocab_core::model::{AnswerMode, Entry, Intent, Phase, StudyDirection};

/// How a run left the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The learner quit; the session stays stored for resume.
    Suspended,
    Abandoned,
}

enum Command {
    Undo,
    Speak,
    Direction(StudyDirection),
    Mode(AnswerMode),
    Quit,
    Abandon,
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let rest = line.trim().strip_prefix(':')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().unwrap_or_default().trim();
    let command = match name {
        "u" | "undo" => Command::Undo,
        "s" | "speak" => Command::Speak,
        "q" | "quit" => Command::Quit,
        "x" | "abandon" => Command::Abandon,
        "h" | "help" => Command::Help,
        "d" | "direction" => match arg.parse() {
            Ok(direction) => Command::Direction(direction),
            Err(err) => Command::Unknown(err.to_string()),
        },
        "m" | "mode" => match arg.parse() {
            Ok(mode) => Command::Mode(mode),
            Err(err) => Command::Unknown(err.to_string()),
        },
        other => Command::Unknown(format!("unknown command: :{other}")),
    };
    Some(command)
}

fn print_help() {
    println!("  :u undo   :s speak   :d <source|target|random>   :m <reveal|type>");
    println!("  :q quit (resume later)   :x abandon   :h help");
}

enum Step {
    Answered(Intent),
    Redraw,
    Leave(Outcome),
}

pub struct Presenter<'a, R> {
    loop_svc: &'a SessionLoopService,
    speaker: Speaker,
    timer: ElapsedTimer,
    clock: Clock,
    export_dir: PathBuf,
    rng: R,
}

impl<'a, R: Rng> Presenter<'a, R> {
    pub fn new(
        loop_svc: &'a SessionLoopService,
        speaker: Speaker,
        clock: Clock,
        export_dir: PathBuf,
        rng: R,
    ) -> Self {
        Self {
            loop_svc,
            speaker,
            timer: ElapsedTimer::new(),
            clock,
            export_dir,
            rng,
        }
    }

    /// Drive `session` until it completes or the learner leaves.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or the export cannot be written.
    pub async fn run<I>(
        &mut self,
        session: &mut SessionService,
        input: &mut Lines<I>,
    ) -> Result<Outcome, Box<dyn std::error::Error>>
    where
        I: AsyncBufRead + Unpin,
    {
        let ticker = self.timer.spawn();
        self.timer.set_active(!session.is_complete());

        let outcome = loop {
            if session.is_complete() {
                self.timer.set_active(false);
                self.finish(session).await?;
                break Outcome::Completed;
            }

            let Some(entry) = session.current_entry().cloned() else {
                break Outcome::Completed;
            };
            let view = CardView::present(&entry, session.session().study_direction(), &mut self.rng);
            self.print_card(session, &view);

            let step = match session.session().answer_mode() {
                AnswerMode::Reveal => self.reveal(session, &view, input).await?,
                AnswerMode::TypeAnswer => self.typed(session, &view, input).await?,
            };

            match step {
                Step::Answered(intent) => {
                    self.loop_svc.answer_current(session, intent).await?;
                }
                Step::Redraw => {}
                Step::Leave(outcome) => break outcome,
            }
        };

        ticker.abort();
        if outcome == Outcome::Abandoned {
            self.timer.reset();
        }
        Ok(outcome)
    }

    fn print_card(&self, session: &SessionService, view: &CardView) {
        let progress = session.progress();
        let phase = match progress.phase {
            Phase::Assessment => "assessment",
            Phase::Drill => "drill",
            Phase::FinalReview => "final review",
        };
        println!();
        println!(
            "[{phase} {}/{}] drill {} | mastered {} | accuracy {}% | {}",
            progress.position,
            progress.total,
            progress.drilling,
            progress.mastered,
            progress.accuracy,
            self.timer.display()
        );
        println!("  {}", view.prompt());
    }

    async fn reveal<I>(
        &mut self,
        session: &mut SessionService,
        view: &CardView,
        input: &mut Lines<I>,
    ) -> Result<Step, Box<dyn std::error::Error>>
    where
        I: AsyncBufRead + Unpin,
    {
        println!("  (enter to reveal)");
        loop {
            let Some(line) = input.next_line().await? else {
                return Ok(Step::Leave(Outcome::Suspended));
            };
            if let Some(command) = parse_command(&line) {
                if let Some(step) = self.command(session, view.entry(), command).await {
                    return Ok(step);
                }
                continue;
            }
            break;
        }

        print_answer(view);
        self.speaker.speak(view.entry().word());
        println!("  knew it? [y/n]");
        loop {
            let Some(line) = input.next_line().await? else {
                return Ok(Step::Leave(Outcome::Suspended));
            };
            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(Step::Answered(Intent::Correct)),
                "n" | "no" => return Ok(Step::Answered(Intent::Wrong)),
                other => {
                    if let Some(command) = parse_command(other) {
                        if let Some(step) = self.command(session, view.entry(), command).await {
                            return Ok(step);
                        }
                    } else {
                        println!("  answer y or n");
                    }
                }
            }
        }
    }

    async fn typed<I>(
        &mut self,
        session: &mut SessionService,
        view: &CardView,
        input: &mut Lines<I>,
    ) -> Result<Step, Box<dyn std::error::Error>>
    where
        I: AsyncBufRead + Unpin,
    {
        let typed = loop {
            let Some(line) = input.next_line().await? else {
                return Ok(Step::Leave(Outcome::Suspended));
            };
            match parse_command(&line) {
                Some(command) => {
                    if let Some(step) = self.command(session, view.entry(), command).await {
                        return Ok(step);
                    }
                }
                None => break line,
            }
        };

        let mut feedback = view.check(&typed);
        self.speaker.speak(view.entry().word());
        println!("  {}", feedback.message());
        if feedback.verdict() == Verdict::Incorrect {
            println!("  (enter to continue, o to override)");
            loop {
                let Some(line) = input.next_line().await? else {
                    return Ok(Step::Leave(Outcome::Suspended));
                };
                if let Some(command) = parse_command(&line) {
                    if let Some(step) = self.command(session, view.entry(), command).await {
                        return Ok(step);
                    }
                    continue;
                }
                if line.trim().eq_ignore_ascii_case("o") {
                    feedback.override_as_correct();
                    println!("  {}", feedback.message());
                }
                break;
            }
        }
        Ok(Step::Answered(feedback.intent()))
    }

    /// Returns `Some` when the command ends the current card.
    async fn command(
        &mut self,
        session: &mut SessionService,
        entry: &Entry,
        command: Command,
    ) -> Option<Step> {
        match command {
            Command::Undo => {
                if !self.loop_svc.previous(session).await {
                    println!("  nothing to undo");
                    return None;
                }
                Some(Step::Redraw)
            }
            Command::Speak => {
                self.speaker.speak(entry.word());
                None
            }
            Command::Direction(direction) => {
                self.loop_svc.set_study_direction(session, direction).await;
                println!("  direction: {direction}");
                Some(Step::Redraw)
            }
            Command::Mode(mode) => {
                self.loop_svc.set_answer_mode(session, mode).await;
                println!("  mode: {mode}");
                Some(Step::Redraw)
            }
            Command::Quit => Some(Step::Leave(Outcome::Suspended)),
            Command::Abandon => {
                self.loop_svc.abandon(session.clone()).await;
                Some(Step::Leave(Outcome::Abandoned))
            }
            Command::Help => {
                print_help();
                None
            }
            Command::Unknown(message) => {
                println!("  {message}");
                None
            }
        }
    }

    async fn finish(&self, session: &SessionService) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.session();
        println!();
        println!("Run complete.");
        println!(
            "  accuracy {}% ({}/{}) in {}",
            state.accuracy(),
            state.correct_count(),
            state.attempt_count(),
            format_elapsed(self.timer.seconds())
        );

        if let Some(export) = export_wrong_log(state, &self.clock) {
            let path = self.export_dir.join(&export.file_name);
            tokio::fs::write(&path, export.contents).await?;
            println!(
                "  {} missed word(s) written to {}",
                state.wrong_log().len(),
                path.display()
            );
        } else {
            println!("  no missed words");
        }
        Ok(())
    }
}

fn print_answer(view: &CardView) {
    let entry = view.entry();
    println!("  -> {}", view.expected_answer());
    if !entry.phonetic().is_empty() {
        println!("     {}", entry.phonetic());
    }
    if !entry.synonyms().is_empty() {
        println!("     synonyms: {}", entry.synonyms().join(", "));
    }
    if let Some(examples) = entry.examples() {
        if !examples.source.is_empty() {
            println!("     e.g. {}", examples.source);
        }
        if !examples.target.is_empty() {
            println!("          {}", examples.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use services::{SpeechPlayer, StartOptions, Utterance};
    use storage::repository::InMemoryStore;
    use tokio::io::BufReader;
    use vocab_core::time::fixed_now;

    #[derive(Default)]
    struct Spoken(Mutex<Vec<String>>);

    impl SpeechPlayer for Spoken {
        fn cancel(&self) {}

        fn play(&self, utterance: &Utterance) {
            self.0.lock().unwrap().push(utterance.text.clone());
        }
    }

    struct Harness {
        loop_svc: SessionLoopService,
        spoken: Arc<Spoken>,
        session: SessionService,
    }

    async fn harness(mode: AnswerMode) -> Harness {
        let loop_svc =
            SessionLoopService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryStore::new()));
        let options = StartOptions {
            answer_mode: mode,
            ..StartOptions::default()
        };
        let session = loop_svc
            .start_session(
                vec![Entry::new("cat", "/kæt/", "feline").unwrap()],
                options,
                &mut StdRng::seed_from_u64(1),
            )
            .await
            .unwrap();
        Harness {
            loop_svc,
            spoken: Arc::new(Spoken::default()),
            session,
        }
    }

    async fn drive(h: &mut Harness, script: &str) -> Outcome {
        let mut presenter = Presenter::new(
            &h.loop_svc,
            Speaker::new(h.spoken.clone()),
            Clock::fixed(fixed_now()),
            std::env::temp_dir(),
            StdRng::seed_from_u64(2),
        );
        let mut input = BufReader::new(script.as_bytes()).lines();
        presenter.run(&mut h.session, &mut input).await.unwrap()
    }

    #[test]
    fn commands_need_a_colon_prefix() {
        assert!(parse_command("undo").is_none());
        assert!(matches!(parse_command(":u"), Some(Command::Undo)));
        assert!(matches!(
            parse_command(" :d random"),
            Some(Command::Direction(StudyDirection::RandomPerCard))
        ));
        assert!(matches!(parse_command(":m sideways"), Some(Command::Unknown(_))));
    }

    #[tokio::test]
    async fn quitting_at_the_override_prompt_records_nothing() {
        let mut h = harness(AnswerMode::TypeAnswer).await;
        assert_eq!(drive(&mut h, "dog\n:q\n").await, Outcome::Suspended);
        assert_eq!(h.session.session().attempt_count(), 0);
        assert!(h.session.session().wrong_log().is_empty());
    }

    #[tokio::test]
    async fn end_of_input_at_the_override_prompt_records_nothing() {
        let mut h = harness(AnswerMode::TypeAnswer).await;
        assert_eq!(drive(&mut h, "dog\n").await, Outcome::Suspended);
        assert_eq!(h.session.session().attempt_count(), 0);
    }

    #[tokio::test]
    async fn override_counts_as_correct() {
        let mut h = harness(AnswerMode::TypeAnswer).await;
        assert_eq!(drive(&mut h, "dog\no\n").await, Outcome::Suspended);
        assert_eq!(h.session.session().correct_count(), 1);
        assert_eq!(h.session.session().phase(), Phase::FinalReview);
    }

    #[tokio::test]
    async fn word_is_spoken_when_checked_or_revealed() {
        let mut h = harness(AnswerMode::TypeAnswer).await;
        drive(&mut h, "feline\n").await;
        assert_eq!(*h.spoken.0.lock().unwrap(), vec!["cat".to_owned()]);

        let mut h = harness(AnswerMode::Reveal).await;
        drive(&mut h, "\ny\n").await;
        assert_eq!(*h.spoken.0.lock().unwrap(), vec!["cat".to_owned()]);
        assert_eq!(h.session.session().correct_count(), 1);
    }
}
