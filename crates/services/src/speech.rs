//! Text-to-speech seam. Playback itself belongs to the platform.

use std::sync::Arc;

pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_RATE: f32 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
}

impl Utterance {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: DEFAULT_LANGUAGE.to_owned(),
            rate: DEFAULT_RATE,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Platform speech output.
pub trait SpeechPlayer: Send + Sync {
    /// Stop anything currently being spoken.
    fn cancel(&self);
    fn play(&self, utterance: &Utterance);
}

/// Speaks one utterance at a time; a new request supersedes the previous one.
#[derive(Clone)]
pub struct Speaker {
    player: Arc<dyn SpeechPlayer>,
}

impl Speaker {
    #[must_use]
    pub fn new(player: Arc<dyn SpeechPlayer>) -> Self {
        Self { player }
    }

    pub fn speak(&self, text: &str) {
        self.speak_utterance(&Utterance::new(text));
    }

    pub fn speak_utterance(&self, utterance: &Utterance) {
        if utterance.text.trim().is_empty() {
            return;
        }
        self.player.cancel();
        self.player.play(utterance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl SpeechPlayer for Recorder {
        fn cancel(&self) {
            self.0.lock().unwrap().push("cancel".into());
        }

        fn play(&self, utterance: &Utterance) {
            self.0
                .lock()
                .unwrap()
                .push(format!("{}@{}x{}", utterance.text, utterance.language, utterance.rate));
        }
    }

    #[test]
    fn each_request_cancels_the_previous_one() {
        let recorder = Arc::new(Recorder::default());
        let speaker = Speaker::new(recorder.clone());
        speaker.speak("cat");
        speaker.speak("   ");
        speaker.speak_utterance(&Utterance::new("gato").with_language("es-ES"));

        let calls = recorder.0.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec!["cancel", "cat@en-USx0.9", "cancel", "gato@es-ESx0.9"]
        );
    }
}
