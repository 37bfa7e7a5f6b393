use std::collections::HashSet;
use std::hash::Hash;
use std::fmt::Debug;
use chrono::NaiveDate;
use crate::results::{MatchResult, Points};
use crate::team::Candidate;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid test date {}-{}-{}", year, month, day))
}

pub fn result(date: NaiveDate, player_id: i32, points: Points) -> MatchResult {
    MatchResult { date, player_id, points }
}

/// `n` candidates with ids and ranks 1..=n.
pub fn candidates(n: usize) -> Vec<Candidate> {
    (1..=n).map(|i| Candidate {
        player_id: i as i32,
        name: format!("Player {}", i),
        rank: Some(i as u32),
    }).collect()
}

pub fn assert_set_equality<T>(got: Vec<T>, expected: Vec<T>)
    where T: Clone + Eq + Hash + Debug {
    let got_hash: HashSet<T> = got.iter().cloned().collect();
    let expected_hash: HashSet<T> = expected.iter().cloned().collect();
    if got_hash != expected_hash || got.len() != expected.len() {
        let unwanted: HashSet<&T> = got_hash.difference(&expected_hash).collect();
        let needed: HashSet<&T> = expected_hash.difference(&got_hash).collect();
        panic!("set inequality! expected len {}, got {}\nmissing {:?}\nunwanted {:?}",
            expected.len(), got.len(), needed, unwanted);
    }
}
