use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{BeliefState, Candidate, Question};
use crate::error::{Result, StorageError};

/// Per-question beliefs for each candidate.
///
/// The stored shape is `{"<question id>": {<candidate id>: {"mu": .., "sigma": ..}}}`.
/// Question keys are strings holding the decimal question id, while candidate keys are
/// integers. Existing rows depend on that asymmetry, so the outer map is keyed by
/// `String` and the inner one by `i64` rather than normalising both.
///
/// A question only appears once it has beliefs recorded; partial leaderboards are valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard(BTreeMap<String, BTreeMap<i64, BeliefState>>);

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every question gets every candidate at `initial`.
    pub fn seeded(questions: &[Question], candidates: &[Candidate], initial: BeliefState) -> Self {
        let board: BTreeMap<String, BTreeMap<i64, BeliefState>> = questions
            .iter()
            .map(|question| {
                let entries: BTreeMap<i64, BeliefState> = candidates
                    .iter()
                    .map(|candidate| (candidate.id, initial))
                    .collect();
                (Self::question_key(question.id), entries)
            })
            .collect();

        Self(board)
    }

    pub fn question_key(question_id: i64) -> String {
        question_id.to_string()
    }

    pub fn with_entry(mut self, question_id: i64, candidate_id: i64, belief: BeliefState) -> Self {
        self.insert(question_id, candidate_id, belief);
        self
    }

    /// Returns the belief previously recorded for the pair, if any.
    pub fn insert(
        &mut self,
        question_id: i64,
        candidate_id: i64,
        belief: BeliefState,
    ) -> Option<BeliefState> {
        self.0
            .entry(Self::question_key(question_id))
            .or_default()
            .insert(candidate_id, belief)
    }

    pub fn get(&self, question_id: i64, candidate_id: i64) -> Option<&BeliefState> {
        self.question(question_id)?.get(&candidate_id)
    }

    pub fn question(&self, question_id: i64) -> Option<&BTreeMap<i64, BeliefState>> {
        self.0.get(&Self::question_key(question_id))
    }

    /// Number of questions with at least one recorded belief map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn question_ids(&self) -> Result<BTreeSet<i64>> {
        self.0.keys().map(|key| parse_question_key(key)).collect()
    }

    pub fn candidate_ids(&self) -> BTreeSet<i64> {
        self.0.values().flat_map(|entries| entries.keys().copied()).collect()
    }

    pub fn validate(&self) -> Result<()> {
        for (key, entries) in &self.0 {
            let question_id = parse_question_key(key)?;
            for (candidate_id, belief) in entries {
                belief.validate().map_err(|e| {
                    StorageError::validation(format!(
                        "leaderboard entry for question {} candidate {}: {}",
                        question_id, candidate_id, e
                    ))
                })?;
            }
        }
        Ok(())
    }
}

/// Question keys must be the canonical decimal form of an integer (`"1"`, not `"01"`).
fn parse_question_key(key: &str) -> Result<i64> {
    match key.parse::<i64>() {
        Ok(id) if id.to_string() == key => Ok(id),
        _ => Err(StorageError::validation(format!(
            "leaderboard key '{}' is not a question id",
            key
        ))),
    }
}
