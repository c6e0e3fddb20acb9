//! Wrong-answer export as delimited text.

use vocab_core::Clock;
use vocab_core::model::{Entry, Session};

/// A ready-to-write export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongLogExport {
    pub file_name: String,
    pub contents: String,
}

/// `word,phonetic,meaning` per entry, newline separated.
#[must_use]
pub fn wrong_log_csv(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|e| format!("{},{},{}", e.word(), e.phonetic(), e.meaning()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn export_file_name(clock: &Clock) -> String {
    format!("wrong_answers_{}.csv", clock.today_iso())
}

/// Export the session's wrong log, or `None` when nothing was missed.
#[must_use]
pub fn export_wrong_log(session: &Session, clock: &Clock) -> Option<WrongLogExport> {
    if session.wrong_log().is_empty() {
        return None;
    }
    Some(WrongLogExport {
        file_name: export_file_name(clock),
        contents: wrong_log_csv(session.wrong_log()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::{AnswerMode, Intent, RunLabels, StudyDirection};
    use vocab_core::time::{fixed_clock, fixed_now};

    #[test]
    fn exports_each_missed_word_once() {
        let entries = vec![
            Entry::new("cat", "/kæt/", "feline").unwrap(),
            Entry::new("dog", "", "canine").unwrap(),
        ];
        let mut session = Session::start(
            entries,
            fixed_now(),
            StudyDirection::default(),
            AnswerMode::default(),
            RunLabels::default(),
        )
        .unwrap();
        assert_eq!(export_wrong_log(&session, &fixed_clock()), None);

        for intent in [Intent::Wrong, Intent::Correct, Intent::Wrong] {
            session = session.apply(intent).unwrap();
        }

        let export = export_wrong_log(&session, &fixed_clock()).unwrap();
        assert_eq!(export.file_name, "wrong_answers_2023-11-14.csv");
        assert_eq!(export.contents, "cat,/kæt/,feline");
    }
}
