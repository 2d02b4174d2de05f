use chrono::NaiveDate;
use std::time::Instant;

use crate::api::{ApiError, ReflectApi};
use crate::models::{NewReflection, Reflection};
use crate::session::Session;
use crate::state::{SuccessFlag, record_error};

pub const QUESTION_COUNT: usize = 3;

pub struct Question {
    pub title: &'static str,
    pub placeholder: &'static str,
    pub hint: &'static str,
}

pub const QUESTIONS: [Question; QUESTION_COUNT] = [
    Question {
        title: "How was your day?",
        placeholder: "Write a brief summary of your day...",
        hint: "Take a moment to reflect on the highs and lows",
    },
    Question {
        title: "What did you accomplish?",
        placeholder: "List your wins, big or small...",
        hint: "Celebrate your progress",
    },
    Question {
        title: "What do you want to improve tomorrow?",
        placeholder: "One thing you'll focus on...",
        hint: "Set your intention for tomorrow",
    },
];

/// Position in the fixed question sequence. Always in `0..QUESTION_COUNT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuestionIndex(usize);

impl QuestionIndex {
    pub const FIRST: QuestionIndex = QuestionIndex(0);
    pub const LAST: QuestionIndex = QuestionIndex(QUESTION_COUNT - 1);

    pub fn new(index: usize) -> Option<Self> {
        (index < QUESTION_COUNT).then_some(QuestionIndex(index))
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn next(self) -> Self {
        QuestionIndex((self.0 + 1).min(QUESTION_COUNT - 1))
    }

    pub fn prev(self) -> Self {
        QuestionIndex(self.0.saturating_sub(1))
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    pub fn question(self) -> &'static Question {
        &QUESTIONS[self.0]
    }
}

pub type Drafts = [String; QUESTION_COUNT];

#[derive(Debug, Clone, PartialEq)]
pub enum ReflectionPhase {
    /// Walking through the questions. `saved` holds an incomplete record already on the server.
    InProgress {
        index: QuestionIndex,
        drafts: Drafts,
        saved: Option<Reflection>,
    },
    Completed {
        record: Reflection,
    },
    /// Changing the answers of a completed reflection
    Editing {
        record: Reflection,
        drafts: Drafts,
        index: QuestionIndex,
    },
}

impl Default for ReflectionPhase {
    fn default() -> Self {
        ReflectionPhase::InProgress {
            index: QuestionIndex::FIRST,
            drafts: Drafts::default(),
            saved: None,
        }
    }
}

fn drafts_from(record: &Reflection) -> Drafts {
    [
        record.summary.clone().unwrap_or_default(),
        record.accomplishments.clone().unwrap_or_default(),
        record.improvements_to_make.clone().unwrap_or_default(),
    ]
}

/// Today's reflection
#[derive(Debug, Clone)]
pub struct ReflectionState {
    pub date: NaiveDate,
    pub phase: ReflectionPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub success: SuccessFlag,
}

impl ReflectionState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            phase: ReflectionPhase::default(),
            loading: false,
            error: None,
            success: SuccessFlag::default(),
        }
    }

    pub async fn load<A: ReflectApi>(&mut self, api: &A, session: &Session) -> Result<(), ApiError> {
        self.loading = true;
        let result = api.reflection_for_date(session, self.date).await;
        self.loading = false;

        match result {
            Ok(Some(record)) => {
                self.error = None;
                self.apply_saved(record);
                Ok(())
            }
            Ok(None) => {
                self.error = None;
                self.phase = ReflectionPhase::default();
                Ok(())
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    /// Completed iff the record has all three answers; otherwise keep asking
    fn apply_saved(&mut self, record: Reflection) {
        self.phase = if record.is_complete() {
            ReflectionPhase::Completed { record }
        } else {
            ReflectionPhase::InProgress {
                index: QuestionIndex::FIRST,
                drafts: drafts_from(&record),
                saved: Some(record),
            }
        };
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, ReflectionPhase::Completed { .. })
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.phase, ReflectionPhase::Editing { .. })
    }

    /// The record last confirmed by the server, if any
    pub fn saved(&self) -> Option<&Reflection> {
        match &self.phase {
            ReflectionPhase::InProgress { saved, .. } => saved.as_ref(),
            ReflectionPhase::Completed { record } | ReflectionPhase::Editing { record, .. } => Some(record),
        }
    }

    pub fn index(&self) -> Option<QuestionIndex> {
        match &self.phase {
            ReflectionPhase::InProgress { index, .. } | ReflectionPhase::Editing { index, .. } => Some(*index),
            ReflectionPhase::Completed { .. } => None,
        }
    }

    pub fn drafts(&self) -> Option<&Drafts> {
        match &self.phase {
            ReflectionPhase::InProgress { drafts, .. } | ReflectionPhase::Editing { drafts, .. } => Some(drafts),
            ReflectionPhase::Completed { .. } => None,
        }
    }

    fn position_mut(&mut self) -> Option<(&mut QuestionIndex, &mut Drafts)> {
        match &mut self.phase {
            ReflectionPhase::InProgress { index, drafts, .. } | ReflectionPhase::Editing { index, drafts, .. } => {
                Some((index, drafts))
            }
            ReflectionPhase::Completed { .. } => None,
        }
    }

    pub fn advance(&mut self) {
        if let Some((index, _)) = self.position_mut() {
            *index = index.next();
        }
    }

    pub fn retreat(&mut self) {
        if let Some((index, _)) = self.position_mut() {
            *index = index.prev();
        }
    }

    pub fn current_answer(&self) -> Option<&str> {
        let index = self.index()?;
        self.drafts().map(|d| d[index.get()].as_str())
    }

    pub fn set_answer(&mut self, text: impl Into<String>) {
        let Some((index, drafts)) = self.position_mut() else {
            return;
        };
        drafts[index.get()] = text.into();
        self.error = None;
    }

    /// The navigation only moves forward past an answered question
    pub fn can_proceed(&self) -> bool {
        self.current_answer().is_some_and(|a| !a.trim().is_empty())
    }

    /// Save the drafts as today's reflection.
    ///
    /// Only meaningful while in progress; the navigation calls it from the last question.
    pub async fn submit<A: ReflectApi>(&mut self, api: &A, session: &Session) -> Result<(), ApiError> {
        let drafts = match &self.phase {
            ReflectionPhase::InProgress { drafts, .. } => drafts.clone(),
            ReflectionPhase::Editing { drafts, .. } => drafts.clone(),
            ReflectionPhase::Completed { .. } => return Ok(()),
        };
        self.save(api, session, drafts).await
    }

    /// Save explicit answers for today's reflection (post-completion edit)
    pub async fn update<A: ReflectApi>(&mut self, api: &A, session: &Session, answers: Drafts) -> Result<(), ApiError> {
        self.save(api, session, answers).await
    }

    async fn save<A: ReflectApi>(&mut self, api: &A, session: &Session, answers: Drafts) -> Result<(), ApiError> {
        if answers.iter().any(|a| a.trim().is_empty()) {
            return Err(record_error(
                &mut self.error,
                ApiError::validation("Please answer all three questions"),
            ));
        }

        let [summary, accomplishments, improvements_to_make] = answers;
        let body = NewReflection {
            reflection_date: self.date,
            summary,
            accomplishments,
            improvements_to_make,
        };

        self.loading = true;
        let result = api.upsert_reflection(session, &body).await;
        self.loading = false;

        match result {
            Ok(record) => {
                log::info!("reflection saved for {}", record.reflection_date);
                self.error = None;
                self.apply_saved(record);
                self.success.raise();
                Ok(())
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub fn begin_edit(&mut self) {
        if let ReflectionPhase::Completed { record } = &self.phase {
            self.phase = ReflectionPhase::Editing {
                drafts: drafts_from(record),
                record: record.clone(),
                index: QuestionIndex::FIRST,
            };
        }
    }

    pub fn cancel_edit(&mut self) {
        if let ReflectionPhase::Editing { record, .. } = &self.phase {
            self.phase = ReflectionPhase::Completed { record: record.clone() };
            self.error = None;
        }
    }

    pub async fn save_edit<A: ReflectApi>(&mut self, api: &A, session: &Session) -> Result<(), ApiError> {
        let drafts = match &self.phase {
            ReflectionPhase::Editing { drafts, .. } => drafts.clone(),
            _ => return Ok(()),
        };
        self.update(api, session, drafts).await
    }

    pub fn tick(&mut self, now: Instant) {
        self.success.expire(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ReflectionState {
        ReflectionState::new(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap())
    }

    #[test]
    fn index_is_clamped_at_both_ends() {
        assert_eq!(QuestionIndex::LAST.next(), QuestionIndex::LAST);
        assert_eq!(QuestionIndex::FIRST.prev(), QuestionIndex::FIRST);
        assert!(QuestionIndex::new(3).is_none());

        let mut s = state();
        s.retreat();
        assert_eq!(s.index(), Some(QuestionIndex::FIRST));
        s.advance();
        s.advance();
        s.advance();
        assert_eq!(s.index(), Some(QuestionIndex::LAST));
    }

    #[test]
    fn answers_follow_the_index() {
        let mut s = state();
        s.set_answer("Good day");
        assert!(s.can_proceed());
        s.advance();
        assert_eq!(s.current_answer(), Some(""));
        assert!(!s.can_proceed());
        s.retreat();
        assert_eq!(s.current_answer(), Some("Good day"));
    }

    #[test]
    fn edit_round_trip_restores_the_record() {
        let record = Reflection {
            id: 1,
            user_id: 1,
            reflection_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            summary: Some("a".into()),
            accomplishments: Some("b".into()),
            improvements_to_make: Some("c".into()),
            created_at: None,
            updated_at: None,
        };
        let mut s = state();
        s.apply_saved(record.clone());
        assert!(s.is_completed());

        s.begin_edit();
        assert!(s.is_editing());
        s.set_answer("changed");
        s.cancel_edit();
        assert_eq!(s.phase, ReflectionPhase::Completed { record });
    }
}
