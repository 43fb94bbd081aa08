use std::{
    collections::hash_map::{Entry, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};

use derive_more::{Display, From, FromStr};
use log::{debug, error, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    api::StatsSource,
    listing_cache::ListingCache,
    render,
    schema::{TitleEntity, TitleListing},
    score_table::{ScoreTable, UserId},
    search_filter::SearchFilter,
    Error,
};

/// How long the buttons of a round stay usable.
pub const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(180);

/// How long a pruned round is remembered as expired.
const EXPIRED_ROUND_MEMORY: Duration = Duration::from_secs(60 * 60);

#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, From, FromStr, Display, Serialize, Deserialize,
)]
pub struct RoundId(u64);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Choice {
    First,
    Second,
}
impl Choice {
    pub fn emoji(self) -> &'static str {
        match self {
            Choice::First => "🇦",
            Choice::Second => "🇧",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Correct iff the chosen title has strictly more current players.
pub fn outcome(choice: Choice, first: &TitleEntity, second: &TitleEntity) -> Outcome {
    let (chosen, other) = match choice {
        Choice::First => (first, second),
        Choice::Second => (second, first),
    };
    if chosen.current_players() > other.current_players() {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    }
}

/// What the player can do once a round is over.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NextAffordance {
    NextRound(SearchFilter),
    Restart,
}

/// A round waiting for the player's answer.
#[derive(Debug)]
struct Round {
    user_id: UserId,
    filter: SearchFilter,
    first: TitleEntity,
    second: TitleEntity,
    started_at: Instant,
}
impl Round {
    fn outcome(&self, choice: Choice) -> Outcome {
        outcome(choice, &self.first, &self.second)
    }
}

/// Rounds in flight, and when the recently expired ones were dropped so that
/// a late click is still told the round expired.
#[derive(Default, Debug)]
struct RoundTable {
    pending: HashMap<RoundId, Round>,
    expired: HashMap<RoundId, Instant>,
}

#[derive(Debug)]
pub struct RoundStart {
    pub round_id: RoundId,
    pub round_number: u32,
    pub filter: SearchFilter,
    pub first: TitleEntity,
    pub second: TitleEntity,
    pub message: String,
}

#[derive(Debug)]
pub struct RoundResult {
    pub correct: bool,
    /// New streak if correct, the streak just lost otherwise.
    pub score: u32,
    pub message: String,
    pub next: NextAffordance,
}

/// Owns every piece of game state: the title pool, the streaks and the
/// rounds in flight.
pub struct RoundEngine {
    listings: ListingCache,
    scores: ScoreTable,
    rounds: Mutex<RoundTable>,
    next_round_id: AtomicU64,
    round_timeout: Duration,
}

impl RoundEngine {
    pub fn new(listings: ListingCache, round_timeout: Duration) -> Self {
        Self {
            listings,
            scores: ScoreTable::default(),
            rounds: Mutex::default(),
            next_round_id: AtomicU64::new(1),
            round_timeout,
        }
    }

    pub fn listings(&self) -> &ListingCache {
        &self.listings
    }

    pub fn scores(&self) -> &ScoreTable {
        &self.scores
    }

    pub fn pending_rounds(&self) -> usize {
        self.lock_rounds().pending.len()
    }

    /// Two uniformly random titles of the filter (or of the base filter if
    /// the requested one has none).
    pub fn draw_pair(
        &self,
        filter: SearchFilter,
        rng: &mut impl Rng,
    ) -> Result<(TitleListing, TitleListing), Error> {
        self.draw_pair_by(filter, |len| rng.gen_range(0..len))
    }

    /// `pick(len)` chooses an index below `len`.  When both picks hit the
    /// same title the second one is drawn again, once; a second collision is
    /// kept.
    fn draw_pair_by(
        &self,
        filter: SearchFilter,
        mut pick: impl FnMut(usize) -> usize,
    ) -> Result<(TitleListing, TitleListing), Error> {
        let (_, pool) = self
            .listings
            .pool(filter)
            .ok_or(Error::EmptyPool { filter })?;
        let mut draw = || pool[pick(pool.len())].clone();
        let first = draw();
        let mut second = draw();
        if first.id() == second.id() {
            debug!("Both picks were {}; drawing the second again.", first.id());
            second = draw();
        }
        Ok((first, second))
    }

    pub async fn start_round(
        &self,
        source: &(impl StatsSource + Sync),
        filter: SearchFilter,
        user_id: &UserId,
    ) -> Result<RoundStart, Error> {
        let pair = self.draw_pair(filter, &mut rand::thread_rng())?;
        self.start_round_with(source, filter, user_id, pair).await
    }

    /// Same as [`Self::start_round`], with the two titles already drawn.
    pub async fn start_round_with(
        &self,
        source: &(impl StatsSource + Sync),
        filter: SearchFilter,
        user_id: &UserId,
        (first, second): (TitleListing, TitleListing),
    ) -> Result<RoundStart, Error> {
        let first = build_logged(source, first, filter).await?;
        let second = build_logged(source, second, filter).await?;

        let round_number = self.scores.get_or_init(user_id) + 1;
        let round_id = RoundId(self.next_round_id.fetch_add(1, Ordering::Relaxed));
        let message = render::round_start(round_number, &first, &second);
        info!(
            "Round {round_id} for {user_id} ({filter}): {} vs {}",
            first.id(),
            second.id()
        );

        let start = RoundStart {
            round_id,
            round_number,
            filter,
            first: first.clone(),
            second: second.clone(),
            message,
        };
        let mut rounds = self.lock_rounds();
        self.prune_expired(&mut rounds);
        rounds.pending.insert(
            round_id,
            Round {
                user_id: user_id.clone(),
                filter,
                first,
                second,
                started_at: Instant::now(),
            },
        );
        Ok(start)
    }

    /// Answers a pending round.  A round can be answered only once, only by
    /// the player it was dealt to, and only before it expires.
    pub fn resolve(
        &self,
        round_id: RoundId,
        choice: Choice,
        user_id: &UserId,
    ) -> Result<RoundResult, Error> {
        let round = {
            let mut rounds = self.lock_rounds();
            let RoundTable { pending, expired } = &mut *rounds;
            let round = match pending.entry(round_id) {
                Entry::Occupied(entry) if entry.get().user_id != *user_id => {
                    return Err(Error::NotYourRound(round_id))
                }
                Entry::Occupied(entry) => entry.remove(),
                Entry::Vacant(_) if expired.contains_key(&round_id) => {
                    return Err(Error::RoundExpired(round_id))
                }
                Entry::Vacant(_) => return Err(Error::UnknownRound(round_id)),
            };
            if round.started_at.elapsed() >= self.round_timeout {
                expired.insert(round_id, Instant::now());
                return Err(Error::RoundExpired(round_id));
            }
            self.prune_expired(&mut rounds);
            round
        };

        let outcome = round.outcome(choice);
        let (score, next) = match outcome {
            Outcome::Correct => (
                self.scores.record_correct(user_id),
                NextAffordance::NextRound(round.filter),
            ),
            Outcome::Incorrect => (self.scores.record_incorrect(user_id), NextAffordance::Restart),
        };
        info!("Round {round_id} for {user_id}: {choice:?} was {outcome:?}, score {score}");
        Ok(RoundResult {
            correct: outcome == Outcome::Correct,
            score,
            message: render::round_result(choice, &round.first, &round.second, outcome, score),
            next,
        })
    }

    fn prune_expired(&self, rounds: &mut RoundTable) {
        let RoundTable { pending, expired } = rounds;
        let now = Instant::now();
        let before = pending.len();
        pending.retain(|&id, round| {
            let live = round.started_at.elapsed() < self.round_timeout;
            if !live {
                expired.insert(id, now);
            }
            live
        });
        if pending.len() < before {
            debug!("Dropped {} expired rounds.", before - pending.len());
        }
        expired.retain(|_, dropped_at| dropped_at.elapsed() < EXPIRED_ROUND_MEMORY);
    }

    fn lock_rounds(&self) -> MutexGuard<'_, RoundTable> {
        self.rounds.lock().expect("Round table was poisoned")
    }
}

async fn build_logged(
    source: &(impl StatsSource + Sync),
    listing: TitleListing,
    filter: SearchFilter,
) -> Result<TitleEntity, Error> {
    let id = listing.id().clone();
    let result = TitleEntity::build(source, id.clone(), listing.title().clone()).await;
    if let Err(e) = &result {
        error!(
            "Failed to build title {id} ({filter}) from {:?}: {e:#}",
            e.url()
        );
    }
    result
}
