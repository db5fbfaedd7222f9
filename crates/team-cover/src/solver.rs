//! Memoized branch-and-bound search for the smallest covering teams.

use std::cell::Cell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use team_core::ingredients::{remaining_after, sum_amounts};
use team_core::{validate_recipe, Candidate, IngredientAmount};
use tracing::{debug, warn};

use crate::index::ReverseIndex;
use crate::memo::{decode, encode, MemoKey, SearchState};
use crate::rank::{rank, TeamSolution};
use crate::{SetCoverError, SolverConfig};

/// Members of a team, in the order they were added during the search.
pub type Team<'a> = Vec<&'a Candidate>;

/// Budget for one top-level search, polled at each recursive entry.
///
/// Either wall-clock time or a fixed number of polls.
#[derive(Clone, Debug)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
    max_polls: Option<u64>,
    polls: Cell<u64>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
            max_polls: None,
            polls: Cell::new(0),
        }
    }

    /// Expires on the poll after the first `polls`, independent of the clock.
    pub fn after_polls(polls: u64) -> Self {
        Self {
            max_polls: Some(polls),
            ..Self::after(Duration::ZERO)
        }
    }

    /// A zero budget is expired from the start.
    pub fn expired(&self) -> bool {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        match self.max_polls {
            Some(max) => polls > max,
            None => self.start.elapsed() >= self.budget,
        }
    }
}

/// Counters for one top-level search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub states_expanded: u64,
    pub memo_hits: u64,
    pub deadline_hits: u64,
}

/// Best teams found so far at one search node. All teams have `size` members.
struct Best<'a> {
    size: usize,
    teams: Vec<Team<'a>>,
}

impl<'a> Best<'a> {
    fn new(slots: usize) -> Self {
        Self {
            size: slots,
            teams: Vec::new(),
        }
    }

    /// `candidate` alone covers the requirement.
    fn with_single(mut self, candidate: &'a Candidate) -> Self {
        if self.size > 1 {
            Self {
                size: 1,
                teams: vec![vec![candidate]],
            }
        } else {
            self.teams.push(vec![candidate]);
            self
        }
    }

    /// `candidate` plus any of `sub_teams` covers the requirement.
    fn with_sub_teams(
        mut self,
        sub_teams: Vec<Team<'a>>,
        candidate: &'a Candidate,
    ) -> Result<Self, SetCoverError> {
        let Some(sub_size) = sub_teams.first().map(Vec::len) else {
            return Ok(self);
        };
        if sub_size == 0 || sub_teams.iter().any(|t| t.len() != sub_size) {
            return Err(SetCoverError::Invariant(format!(
                "sub-search returned teams of mixed or empty size (first has {sub_size})"
            )));
        }
        let extended = sub_teams.into_iter().map(|mut team| {
            team.push(candidate);
            team
        });
        let size = sub_size + 1;
        if size < self.size {
            Ok(Self {
                size,
                teams: extended.collect(),
            })
        } else if size == self.size {
            self.teams.extend(extended);
            Ok(self)
        } else {
            Err(SetCoverError::Invariant(format!(
                "sub-team of {sub_size} exceeds the {} slots it was searched with",
                self.size - 1
            )))
        }
    }
}

/// One solver session over a fixed reverse index.
///
/// The memo is owned by the session; build a new solver for a different index.
pub struct SetCover<'a> {
    index: &'a ReverseIndex,
    memo: HashMap<MemoKey, Vec<Team<'a>>>,
    stats: SearchStats,
}

impl<'a> SetCover<'a> {
    pub fn new(index: &'a ReverseIndex) -> Self {
        Self {
            index,
            memo: HashMap::new(),
            stats: SearchStats::default(),
        }
    }

    /// Number of cached search states.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Counters of the most recent top-level search.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// All smallest teams covering `recipe`, ranked by filler.
    ///
    /// Empty when the recipe is empty or no team within `max_team_size` covers it.
    pub fn find_optimal_combination_for(
        &mut self,
        recipe: &[IngredientAmount],
        config: &SolverConfig,
    ) -> Result<Vec<TeamSolution>, SetCoverError> {
        let deadline = Deadline::after(Duration::from_millis(config.timeout_ms));
        self.find_optimal_combination_within(recipe, config.max_team_size, &deadline)
    }

    /// Like [`Self::find_optimal_combination_for`], bounded by an explicit deadline.
    pub fn find_optimal_combination_within(
        &mut self,
        recipe: &[IngredientAmount],
        max_team_size: usize,
        deadline: &Deadline,
    ) -> Result<Vec<TeamSolution>, SetCoverError> {
        let teams = self.search(recipe, max_team_size, deadline)?;
        let exhaustive = self.stats.deadline_hits == 0;
        Ok(rank(teams, recipe, exhaustive))
    }

    /// Size of the smallest team found, or `max_team_size + 1` when none fits.
    pub fn calculate_min_team_size_for(
        &mut self,
        recipe: &[IngredientAmount],
        config: &SolverConfig,
    ) -> Result<usize, SetCoverError> {
        let deadline = Deadline::after(Duration::from_millis(config.timeout_ms));
        let teams = self.search(recipe, config.max_team_size, &deadline)?;
        Ok(teams
            .first()
            .map(Vec::len)
            .unwrap_or(config.max_team_size + 1))
    }

    fn search(
        &mut self,
        recipe: &[IngredientAmount],
        max_team_size: usize,
        deadline: &Deadline,
    ) -> Result<Vec<Team<'a>>, SetCoverError> {
        validate_recipe(recipe)?;
        self.stats = SearchStats::default();
        let key = encode(&SearchState::new(recipe, max_team_size));
        let teams = self.solve(key, deadline)?;
        debug!(
            teams = teams.len(),
            memo = self.memo.len(),
            expanded = self.stats.states_expanded,
            memo_hits = self.stats.memo_hits,
            "set cover search finished"
        );
        if self.stats.deadline_hits > 0 {
            warn!(
                deadline_hits = self.stats.deadline_hits,
                "set cover search hit its deadline; result is not exhaustive"
            );
        }
        Ok(teams)
    }

    fn solve(
        &mut self,
        key: MemoKey,
        deadline: &Deadline,
    ) -> Result<Vec<Team<'a>>, SetCoverError> {
        if deadline.expired() {
            self.stats.deadline_hits += 1;
            return Ok(Vec::new());
        }
        if let Some(cached) = self.memo.get(&key) {
            self.stats.memo_hits += 1;
            return Ok(cached.clone());
        }

        let state = decode(key.as_str())?;
        if state.is_terminal() {
            return Ok(Vec::new());
        }
        self.stats.states_expanded += 1;
        let deadline_hits_before = self.stats.deadline_hits;

        // The first entry of the canonical form, i.e. the smallest ingredient id.
        let first = &state.remaining[0].ingredient;
        let index = self.index;
        let mut options: Vec<(f64, Vec<IngredientAmount>, &'a Candidate)> = index
            .producers_of(first)
            .iter()
            .map(|candidate| {
                let remainder = remaining_after(&state.remaining, &candidate.produce);
                (sum_amounts(&remainder), remainder, candidate)
            })
            .collect();
        options.sort_by(|a, b| a.0.total_cmp(&b.0));

        let best = options.into_iter().try_fold(
            Best::new(state.slots_left),
            |best, (left, remainder, candidate)| {
                if remainder.is_empty() || left <= 0.0 {
                    Ok(best.with_single(candidate))
                } else if best.size > 1 {
                    let sub_key = encode(&SearchState::new(&remainder, best.size - 1));
                    let sub_teams = self.solve(sub_key, deadline)?;
                    best.with_sub_teams(sub_teams, candidate)
                } else {
                    Ok(best)
                }
            },
        )?;

        // A subtree cut short by the deadline is incomplete and must not be replayed.
        if self.stats.deadline_hits == deadline_hits_before {
            self.memo.insert(key, best.teams.clone());
        }
        Ok(best.teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use team_core::IngredientId;

    fn candidate(name: &str) -> Candidate {
        Candidate {
            character: name.to_string(),
            loadout: vec![IngredientId::new("honey")],
            produce: vec![IngredientAmount::new("honey", 1.0)],
        }
    }

    #[test]
    fn zero_budget_is_expired() {
        assert!(Deadline::after(Duration::ZERO).expired());
        assert!(!Deadline::after(Duration::from_secs(60)).expired());
    }

    #[test]
    fn poll_budget_counts_entries() {
        let deadline = Deadline::after_polls(2);
        assert!(!deadline.expired());
        assert!(!deadline.expired());
        assert!(deadline.expired());
        assert!(Deadline::after_polls(0).expired());
    }

    fn produces(name: &str, produce: &[(&str, f64)]) -> Candidate {
        Candidate {
            character: name.to_string(),
            loadout: produce.iter().map(|(i, _)| IngredientId::new(*i)).collect(),
            produce: produce
                .iter()
                .map(|(i, a)| IngredientAmount::new(*i, *a))
                .collect(),
        }
    }

    #[test]
    fn deadline_mid_search_keeps_partial_teams_out_of_the_memo() {
        // Root branches on honey: `p` first (milk left), then `q` (honey and milk left).
        let index = ReverseIndex::from_candidates(vec![
            produces("p", &[("honey", 5.0)]),
            produces("q", &[("honey", 2.0)]),
            produces("b", &[("milk", 3.0)]),
        ])
        .unwrap();
        let recipe = vec![
            IngredientAmount::new("honey", 5.0),
            IngredientAmount::new("milk", 3.0),
        ];
        let root = encode(&SearchState::new(&recipe, 3));
        let mut solver = SetCover::new(&index);

        // Root and the `p` branch run; the `q` branch is cut.
        let partial = solver
            .find_optimal_combination_within(&recipe, 3, &Deadline::after_polls(2))
            .unwrap();
        assert_eq!(solver.stats().deadline_hits, 1);
        assert_eq!(partial.len(), 1);
        assert_eq!(crate::team_hash(&partial[0].team), "b:milk|p:honey");
        assert!(!partial[0].exhaustive);
        assert!(!solver.memo.contains_key(&root));
        assert_eq!(solver.memo_len(), 1);
        assert!(solver.memo.contains_key(&encode(&SearchState::new(
            &[IngredientAmount::new("milk", 3.0)],
            2
        ))));

        let config = SolverConfig {
            max_team_size: 3,
            ..SolverConfig::default()
        };
        let full = solver.find_optimal_combination_for(&recipe, &config).unwrap();
        assert_eq!(solver.stats().deadline_hits, 0);
        assert_eq!(solver.stats().memo_hits, 1);
        assert_eq!(full.len(), 1);
        assert!(full[0].exhaustive);
        assert!(solver.memo.contains_key(&root));
        assert_eq!(solver.memo_len(), 3);
    }

    #[test]
    fn single_replaces_larger_teams() {
        let (a, b, c) = (candidate("a"), candidate("b"), candidate("c"));
        let best = Best {
            size: 2,
            teams: vec![vec![&a, &b]],
        };
        let best = best.with_single(&c);
        assert_eq!(best.size, 1);
        assert_eq!(best.teams.len(), 1);
        let best = best.with_single(&a);
        assert_eq!(best.teams.len(), 2);
    }

    #[test]
    fn equal_sized_sub_teams_accumulate() {
        let (a, b, c) = (candidate("a"), candidate("b"), candidate("c"));
        let best = Best::new(3)
            .with_sub_teams(vec![vec![&a, &b]], &c)
            .unwrap()
            .with_sub_teams(vec![vec![&b, &c]], &a)
            .unwrap();
        assert_eq!(best.size, 3);
        assert_eq!(best.teams.len(), 2);
        let best = best.with_sub_teams(vec![vec![&a]], &b).unwrap();
        assert_eq!(best.size, 2);
        assert_eq!(best.teams, vec![vec![&a, &b]]);
        let unchanged = best.with_sub_teams(Vec::new(), &c).unwrap();
        assert_eq!(unchanged.size, 2);
    }

    #[test]
    fn malformed_sub_results_are_invariant_violations() {
        let (a, b) = (candidate("a"), candidate("b"));
        assert!(matches!(
            Best::new(3).with_sub_teams(vec![Vec::new()], &a),
            Err(SetCoverError::Invariant(_))
        ));
        assert!(matches!(
            Best::new(4).with_sub_teams(vec![vec![&a], vec![&a, &b]], &b),
            Err(SetCoverError::Invariant(_))
        ));
        assert!(matches!(
            Best::new(2).with_sub_teams(vec![vec![&a, &b]], &b),
            Err(SetCoverError::Invariant(_))
        ));
    }
}
