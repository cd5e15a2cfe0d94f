//! Rank scores and the two-producer aggregation stage.
//!
//! Each [`ListKind`] is fetched and scored on its own thread; scored entries are funneled
//! through one unbounded channel into a single consumer, which drains until both
//! producers have hung up. The merged collection is then sorted by score, descending.
use std::thread;

use crossbeam_channel::Sender;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::source::{EntitySource, ImageRef, ListEntry, ListKind, Status};

/// Score of the primary entity; larger than anything [`score`] can produce.
pub const PRIMARY_SCORE: i64 = 1_000_000_000;
/// Score of each favourite character; ranks them right after the primary entity.
pub const FAVOURITE_CHARACTER_SCORE: i64 = 1_000;
/// Bonus for entries marked as favourite.
pub const FAVOURITE_BONUS: i64 = 200;
/// Bonus (positive) or penalty (negative) per status.
pub const COMPLETED_BONUS: i64 = 100;
pub const DROPPED_PENALTY: i64 = -100;

/// An image reference with its rank score.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankedEntity {
    pub image: ImageRef,
    pub score: i64,
}

impl RankedEntity {
    pub fn new(image: impl Into<ImageRef>, score: i64) -> Self {
        Self {
            image: image.into(),
            score,
        }
    }
}

impl From<ListEntry> for RankedEntity {
    fn from(entry: ListEntry) -> Self {
        let score = score(entry.rating, entry.status, entry.favourite);
        RankedEntity::new(entry.image, score)
    }
}

impl Status {
    /// Score contribution of the status alone.
    pub fn bonus(self) -> i64 {
        match self {
            Status::Completed => COMPLETED_BONUS,
            Status::Dropped => DROPPED_PENALTY,
            Status::Current | Status::Paused | Status::Planning => 0,
        }
    }
}

/// `round(rating × 10)` (0 when unrated) plus the status bonus plus [`FAVOURITE_BONUS`]
/// for favourites.
pub fn score(rating: Option<f64>, status: Status, favourite: bool) -> i64 {
    let rated = rating.map_or(0, |r| (r * 10.0).round() as i64);
    let favourite = if favourite { FAVOURITE_BONUS } else { 0 };
    rated + status.bonus() + favourite
}

/// Sorts by score, highest first. Order among equal scores is unspecified.
pub fn sort_ranked(ranked: &mut [RankedEntity]) {
    ranked.sort_unstable_by(|a, b| b.score.cmp(&a.score));
}

/// Ranks everything an [`EntitySource`] offers: the primary entity, favourite characters,
/// and both lists (fetched and scored concurrently).
///
/// The first source error aborts the whole ranking.
pub fn rank_entities<S: EntitySource + ?Sized>(source: &S) -> Result<Vec<RankedEntity>> {
    let primary = source.primary()?;
    let characters = source.favourite_characters()?;

    let lists = fan_in(
        || source.list(ListKind::Anime),
        || source.list(ListKind::Manga),
    )?;

    let mut ranked = Vec::with_capacity(1 + characters.len() + lists.len());
    ranked.push(RankedEntity::new(primary, PRIMARY_SCORE));
    ranked.extend(
        characters
            .into_iter()
            .map(|image| RankedEntity::new(image, FAVOURITE_CHARACTER_SCORE)),
    );
    ranked.extend(lists);
    sort_ranked(&mut ranked);

    info!("Ranked {} entities.", ranked.len());
    Ok(ranked)
}

/// Scores two already-fetched lists concurrently and returns them merged and sorted.
///
/// Fails only if a scoring thread panics.
pub fn merge_lists(first: Vec<ListEntry>, second: Vec<ListEntry>) -> Result<Vec<RankedEntity>> {
    let mut merged = fan_in(move || Ok(first), move || Ok(second))?;
    sort_ranked(&mut merged);
    Ok(merged)
}

/// Runs both producers on scoped threads and collects their scored entries.
fn fan_in<A, B>(first: A, second: B) -> Result<Vec<RankedEntity>>
where
    A: FnOnce() -> Result<Vec<ListEntry>> + Send,
    B: FnOnce() -> Result<Vec<ListEntry>> + Send,
{
    let (tx, rx) = crossbeam_channel::unbounded::<RankedEntity>();

    thread::scope(|scope| {
        let tx_first = tx.clone();
        let first = scope.spawn(move || produce(first, &tx_first));
        let second = scope.spawn(move || produce(second, &tx));

        // Ends once both producers dropped their senders.
        let collected: Vec<RankedEntity> = rx.iter().collect();

        let (sent_first, sent_second) = (join_producer(first), join_producer(second));
        let (sent_first, sent_second) = (sent_first?, sent_second?);
        debug_assert_eq!(collected.len(), sent_first + sent_second);
        debug!(
            "Aggregated {} scored entries ({sent_first} + {sent_second}).",
            collected.len()
        );
        Ok(collected)
    })
}

fn produce<F>(fetch: F, tx: &Sender<RankedEntity>) -> Result<usize>
where
    F: FnOnce() -> Result<Vec<ListEntry>>,
{
    let entries = fetch()?;
    let mut sent = 0;
    for entry in entries {
        if tx.send(RankedEntity::from(entry)).is_err() {
            break;
        }
        sent += 1;
    }
    Ok(sent)
}

fn join_producer(handle: thread::ScopedJoinHandle<'_, Result<usize>>) -> Result<usize> {
    handle
        .join()
        .map_err(|_| Error::Other("list producer panicked".into()))?
}
