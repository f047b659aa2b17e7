//! UCB1 selection score.

/// UCB1 score of a child.
///
/// `average + c * sqrt(ln(parent_visits) / visits)`
///
/// Requires `visits >= 1`; unvisited children are selected before any
/// scoring takes place.
pub fn ucb1(average: f64, c: f64, parent_visits: u32, visits: u32) -> f64 {
    debug_assert!(visits >= 1, "UCB1 is undefined for unvisited nodes");
    average + c * ((parent_visits as f64).ln() / visits as f64).sqrt()
}
