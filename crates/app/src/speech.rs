use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use services::{SpeechPlayer, Utterance};

/// Environment variable naming the speech program (`say`, `espeak-ng`, ...).
pub const TTS_ENV: &str = "VOCAB_TTS";

/// Base speaking rate of espeak-style programs, in words per minute.
const ESPEAK_BASE_WPM: f32 = 175.0;

/// Speaks through an external program, killing the previous utterance first.
pub struct CommandSpeech {
    program: String,
    current: Mutex<Option<Child>>,
}

impl CommandSpeech {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let program = std::env::var(TTS_ENV).ok()?;
        let program = program.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self {
            program: program.to_owned(),
            current: Mutex::new(None),
        })
    }

    fn command(&self, utterance: &Utterance) -> Command {
        let mut cmd = Command::new(&self.program);
        if self.program.ends_with("say") {
            cmd.arg("-r")
                .arg(format!("{}", (ESPEAK_BASE_WPM * utterance.rate).round()));
        } else {
            cmd.arg("-v")
                .arg(utterance.language.to_ascii_lowercase())
                .arg("-s")
                .arg(format!("{}", (ESPEAK_BASE_WPM * utterance.rate).round()));
        }
        cmd.arg(&utterance.text)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

fn stop(mut child: Child) {
    if let Err(err) = child.kill() {
        tracing::debug!(error = %err, "speech process already finished");
    }
    if let Err(err) = child.wait() {
        tracing::debug!(error = %err, "failed to reap speech process");
    }
}

impl SpeechPlayer for CommandSpeech {
    fn cancel(&self) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        if let Some(child) = current.take() {
            stop(child);
        }
    }

    fn play(&self, utterance: &Utterance) {
        match self.command(utterance).spawn() {
            Ok(child) => {
                if let Ok(mut current) = self.current.lock() {
                    *current = Some(child);
                }
            }
            Err(err) => tracing::warn!(program = %self.program, error = %err, "speech failed"),
        }
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        let current = match self.current.get_mut() {
            Ok(current) => current.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(child) = current {
            stop(child);
        }
    }
}

/// Used when no speech program is configured.
pub struct SilentSpeech;

impl SpeechPlayer for SilentSpeech {
    fn cancel(&self) {}

    fn play(&self, utterance: &Utterance) {
        tracing::debug!(text = %utterance.text, "speech disabled; set {TTS_ENV} to enable");
    }
}
