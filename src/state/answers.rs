//! Builds the presented answer set for a question: correct answer(s) plus a
//! difficulty-capped sample of distractors, shuffled per presentation.

use rand::seq::SliceRandom;

use crate::types::{AnswerDifficulty, Question, QuestionKind};

/// One selectable option in a choice-based presentation
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedChoice {
    pub text: String,
    pub is_correct: bool,
}

/// What the presentation layer renders for a question
#[derive(Debug, Clone, PartialEq)]
pub enum PresentedAnswers {
    /// Buttons; `required_selections` correct picks are expected (1 for
    /// multiple choice)
    Choices {
        options: Vec<PresentedChoice>,
        required_selections: usize,
    },
    /// Free-text input, optionally regex-validated
    FreeText {
        pattern: Option<String>,
        hint: Option<String>,
    },
    /// Spoiler blocks revealed one by one; revealing is the answer action
    Revealable { answers: Vec<String> },
}

/// Shuffle a copy and take the first `count` (never more than available)
fn sample<T: Clone>(pool: &[T], count: usize) -> Vec<T> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(&mut rand::rng());
    shuffled.truncate(count);
    shuffled
}

/// Build the presented set. The result is freshly shuffled on every call so
/// re-displaying a question never repeats the previous layout.
pub fn build(question: &Question, difficulty: AnswerDifficulty) -> PresentedAnswers {
    let max_incorrect = difficulty.max_distractors();

    match &question.kind {
        QuestionKind::MultipleChoice {
            correct,
            distractors,
        } => {
            let mut options: Vec<PresentedChoice> = sample(distractors, max_incorrect)
                .into_iter()
                .map(|text| PresentedChoice {
                    text,
                    is_correct: false,
                })
                .collect();
            options.push(PresentedChoice {
                text: correct.clone(),
                is_correct: true,
            });
            options.shuffle(&mut rand::rng());
            PresentedAnswers::Choices {
                options,
                required_selections: 1,
            }
        }
        QuestionKind::MultipleAnswer {
            correct,
            distractors,
        } => {
            let mut options: Vec<PresentedChoice> = correct
                .iter()
                .map(|text| PresentedChoice {
                    text: text.clone(),
                    is_correct: true,
                })
                .collect();
            options.extend(sample(distractors, max_incorrect).into_iter().map(|text| {
                PresentedChoice {
                    text,
                    is_correct: false,
                }
            }));
            options.shuffle(&mut rand::rng());
            PresentedAnswers::Choices {
                required_selections: correct.len(),
                options,
            }
        }
        QuestionKind::General {
            pattern,
            pattern_hint,
            ..
        } => PresentedAnswers::FreeText {
            pattern: pattern.clone(),
            hint: pattern_hint.clone(),
        },
        QuestionKind::Hidden { answers } => PresentedAnswers::Revealable {
            answers: answers.clone(),
        },
    }
}

/// Whether a set of picked options answers a choice question fully: every
/// correct option selected and nothing incorrect among them.
pub fn selections_correct(picked: &[&PresentedChoice], required: usize) -> bool {
    let correct_picks = picked.iter().filter(|c| c.is_correct).count();
    let incorrect_picks = picked.len() - correct_picks;
    correct_picks == required && incorrect_picks == 0
}
