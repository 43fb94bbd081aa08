use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};

/// Chat-platform user id.
#[derive(Clone, PartialEq, Eq, Hash, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct UserId(String);

/// Current winning streak of each user.  Lives only as long as the process.
#[derive(Default, Debug)]
pub struct ScoreTable {
    scores: Mutex<HashMap<UserId, u32>>,
}

impl ScoreTable {
    pub fn get(&self, user_id: &UserId) -> u32 {
        self.lock().get(user_id).copied().unwrap_or(0)
    }

    /// Registers the user with a zero streak if they have never played.
    pub fn get_or_init(&self, user_id: &UserId) -> u32 {
        *self.lock().entry(user_id.clone()).or_insert(0)
    }

    /// Returns the streak after the increment.
    pub fn record_correct(&self, user_id: &UserId) -> u32 {
        let mut scores = self.lock();
        let score = scores.entry(user_id.clone()).or_insert(0);
        *score += 1;
        *score
    }

    /// Returns the streak the user had before it was reset.
    pub fn record_incorrect(&self, user_id: &UserId) -> u32 {
        self.lock().insert(user_id.clone(), 0).unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, u32>> {
        self.scores.lock().expect("Score table was poisoned")
    }
}
