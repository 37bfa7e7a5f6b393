use crate::error::ResultsError;
use crate::team::is_game_size;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::convert::TryFrom;

/// Points a player can take home from a match day.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum Points {
    Loss,
    Draw,
    Win,
}

impl Points {
    pub fn value(self) -> i32 {
        match self {
            Points::Loss => 0,
            Points::Draw => 1,
            Points::Win => 3,
        }
    }
}

impl TryFrom<i32> for Points {
    type Error = ResultsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Points::Loss),
            1 => Ok(Points::Draw),
            3 => Ok(Points::Win),
            other => Err(ResultsError::InvalidPoints(other)),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct MatchResult {
    pub date: NaiveDate,
    pub player_id: i32,
    pub points: Points,
}

/// The totals a match day of `players` players can add up to: everybody
/// drawing, or one half of the field winning.
pub fn valid_totals(players: usize) -> (i32, i32) {
    let n = players as i32;
    (n, 3 * n / 2)
}

/// Checks one match day's submitted points and turns them into result rows.
/// `known_players` is every player id the store knows about.
pub fn validate_results(date: NaiveDate, submitted: &[(i32, i32)], known_players: &[i32])
    -> Result<Vec<MatchResult>, ResultsError> {
    if !is_game_size(submitted.len()) {
        return Err(ResultsError::WrongPlayerCount(submitted.len()));
    }
    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(submitted.len());
    for &(player_id, value) in submitted {
        if !known_players.contains(&player_id) {
            return Err(ResultsError::UnknownPlayer(player_id));
        }
        if !seen.insert(player_id) {
            return Err(ResultsError::DuplicatePlayer(player_id));
        }
        results.push(MatchResult { date, player_id, points: Points::try_from(value)? });
    }

    let total: i32 = results.iter().map(|r| r.points.value()).sum();
    let valid = valid_totals(results.len());
    if total != valid.0 && total != valid.1 {
        return Err(ResultsError::InvalidTotal { players: results.len(), total, valid });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    fn submission(points: &[i32]) -> Vec<(i32, i32)> {
        points.iter().enumerate().map(|(i, &p)| (i as i32 + 1, p)).collect()
    }

    fn known(n: i32) -> Vec<i32> {
        (1..=n).collect()
    }

    #[test]
    fn test_valid_totals() {
        assert_eq!(valid_totals(10), (10, 15));
        assert_eq!(valid_totals(12), (12, 18));
    }

    #[test]
    fn test_twelve_player_win_accepted() {
        let day = date(2026, 5, 4);
        let results = validate_results(day, &submission(&[3, 3, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0]), &known(12))
            .unwrap();
        assert_eq!(results.len(), 12);
        assert_eq!(results.iter().map(|r| r.points.value()).sum::<i32>(), 18);
        assert_eq!(results[0], MatchResult { date: day, player_id: 1, points: Points::Win });
        assert_eq!(results[11].points, Points::Loss);
    }

    #[test]
    fn test_draws_accepted() {
        assert!(validate_results(date(2026, 5, 4), &submission(&[1; 12]), &known(12)).is_ok());
        assert!(validate_results(date(2026, 5, 4), &submission(&[1; 10]), &known(10)).is_ok());
        assert!(validate_results(date(2026, 5, 4), &submission(&[3, 3, 3, 3, 3, 0, 0, 0, 0, 0]), &known(10))
            .is_ok());
    }

    #[test]
    fn test_invalid_total_rejected() {
        let err = validate_results(date(2026, 5, 4), &submission(&[3, 3, 3, 3, 3, 1, 1, 0, 0, 0, 0, 0]), &known(12));
        assert_eq!(err, Err(ResultsError::InvalidTotal { players: 12, total: 17, valid: (12, 18) }));
        assert_eq!(
            format!("{}", err.unwrap_err()),
            "12 players must have 12 or 18 total points (current: 17)"
        );
    }

    #[test]
    fn test_invalid_points_rejected() {
        let err = validate_results(date(2026, 5, 4), &submission(&[2, 3, 3, 3, 3, 0, 0, 0, 0, 1]), &known(10));
        assert_eq!(err, Err(ResultsError::InvalidPoints(2)));
    }

    #[test]
    fn test_wrong_count_rejected() {
        let err = validate_results(date(2026, 5, 4), &submission(&[1; 11]), &known(11));
        assert_eq!(err, Err(ResultsError::WrongPlayerCount(11)));
        assert_eq!(validate_results(date(2026, 5, 4), &[], &known(11)), Err(ResultsError::WrongPlayerCount(0)));
    }

    #[test]
    fn test_duplicate_and_unknown_players_rejected() {
        let mut dup = submission(&[1; 10]);
        dup[9].0 = 1;
        assert_eq!(validate_results(date(2026, 5, 4), &dup, &known(10)), Err(ResultsError::DuplicatePlayer(1)));

        let mut unknown = submission(&[1; 10]);
        unknown[4].0 = 99;
        assert_eq!(validate_results(date(2026, 5, 4), &unknown, &known(10)), Err(ResultsError::UnknownPlayer(99)));
    }
}
