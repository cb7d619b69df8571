//! Orderings applied to decoded lists before they are shown.

use std::cmp::{Ordering, Reverse};

use itertools::Itertools;

use crate::model::{Award, EventType, File, MedalCount, RankingRow};

/// A row together with its 1-based position. Rows that tie share a
/// position, and the next distinct row skips ahead (1, 1, 3).
#[derive(Debug, Clone, PartialEq)]
pub struct Standing<T> {
    pub position: usize,
    pub row: T,
}

/// Gold (`"1"`) first through fifth (`"5"`); anything else after those.
pub fn placement_rank(award: &str) -> u8 {
    match award.trim() {
        "1" => 0,
        "2" => 1,
        "3" => 2,
        "4" => 3,
        "5" => 4,
        _ => 5,
    }
}

/// Orders the results of one event by placing.
pub fn sort_placements(awards: &mut [Award]) {
    awards.sort_by_key(|award| {
        award.details.placement().map_or(5, placement_rank)
    });
}

pub fn sort_by_event_name(awards: &mut [Award]) {
    awards.sort_by(|a, b| a.event_name.cmp(&b.event_name));
}

/// Newest year first, given names like `UW2024`.
pub fn sort_files(files: &mut [File]) {
    files.sort_by(|a, b| b.file_name.cmp(&a.file_name));
}

/// Sports ranking: most golds, then silvers, then bronzes. Campuses with
/// the same medal count share a position and are listed by name.
pub fn medal_table(rows: Vec<RankingRow>) -> Vec<Standing<RankingRow>> {
    let key = |row: &RankingRow| {
        let m = row.details.medals().unwrap_or_default();
        (Reverse(m.gold), Reverse(m.silver), Reverse(m.bronze))
    };

    let sorted = rows
        .into_iter()
        .sorted_by(|a, b| {
            key(a)
                .cmp(&key(b))
                .then_with(|| a.campus_name.cmp(&b.campus_name))
        })
        .collect::<Vec<_>>();

    with_positions(sorted, key)
}

/// Litmus ranking: highest score first. Rows without a score go last.
pub fn score_table(rows: Vec<RankingRow>) -> Vec<Standing<RankingRow>> {
    let sorted = rows
        .into_iter()
        .sorted_by(|a, b| {
            compare_scores(b.details.score(), a.details.score())
                .then_with(|| a.campus_name.cmp(&b.campus_name))
        })
        .collect::<Vec<_>>();

    with_positions(sorted, |row| row.details.score())
}

/// Splits a ranking summary by event type and ranks each part the way
/// that type is scored. Rows with no type are ranked by medals.
pub fn rank_summary(
    rows: Vec<RankingRow>,
) -> (Vec<Standing<RankingRow>>, Vec<Standing<RankingRow>>) {
    let (litmus, sports): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| row.event_type == Some(EventType::Litmus));
    (medal_table(sports), score_table(litmus))
}

/// Adds up medal counts, e.g. over a campus's award list.
pub fn total_medals<'a>(
    awards: impl IntoIterator<Item = &'a Award>,
) -> MedalCount {
    awards
        .into_iter()
        .filter_map(|award| award.details.medals())
        .fold(MedalCount::default(), |acc, m| MedalCount {
            gold: acc.gold + m.gold,
            silver: acc.silver + m.silver,
            bronze: acc.bronze + m.bronze,
        })
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn with_positions<T, K: PartialEq>(
    sorted: Vec<T>,
    key: impl FnMut(&T) -> K,
) -> Vec<Standing<T>> {
    let mut standings = Vec::with_capacity(sorted.len());
    let grouped = sorted.into_iter().chunk_by(key);
    for (_, group) in &grouped {
        let position = standings.len() + 1;
        standings.extend(group.map(|row| Standing { position, row }));
    }
    standings
}
