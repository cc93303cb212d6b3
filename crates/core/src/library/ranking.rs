//! Ordering of stats records by time played.
//!
//! Two interchangeable implementations are kept: one built on the standard
//! stable sort and a hand-written bubble sort. Both order by `hours_played`
//! descending and leave ties in their original order.

use std::cmp::Ordering;

use crate::models::PlayerGameStats;

/// Sort a copy of `stats` by hours played, most first.
pub fn rank_by_hours(stats: &[PlayerGameStats]) -> Vec<PlayerGameStats> {
    let mut ranked = stats.to_vec();
    ranked.sort_by(|a, b| {
        b.hours_played
            .partial_cmp(&a.hours_played)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Same ordering as [`rank_by_hours`], computed with a bubble sort.
pub fn rank_by_hours_manual(stats: &[PlayerGameStats]) -> Vec<PlayerGameStats> {
    let mut ranked = stats.to_vec();
    let mut unsorted = ranked.len();

    loop {
        let mut swapped = false;
        for i in 1..unsorted {
            // Strict comparison keeps equal entries in place.
            if ranked[i - 1].hours_played < ranked[i].hours_played {
                ranked.swap(i - 1, i);
                swapped = true;
            }
        }
        unsorted = unsorted.saturating_sub(1);
        if !swapped {
            break;
        }
    }

    ranked
}
