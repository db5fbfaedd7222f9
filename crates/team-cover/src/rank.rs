//! Surplus scoring, canonical ordering and deduplication of solved teams.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use team_core::ingredients::{extract_relevant_surplus, surplus_over};
use team_core::{Candidate, IngredientAmount, Surplus};

/// A team that covers the recipe, with what it overproduces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamSolution {
    /// Members sorted by [`Candidate::identity_hash`].
    pub team: Vec<Candidate>,
    pub surplus: Surplus,
    /// False when the search hit its deadline; the result is then only a best effort.
    pub exhaustive: bool,
}

/// Order-independent identity of a team: sorted member hashes joined by `|`.
pub fn team_hash(team: &[Candidate]) -> String {
    let mut hashes: Vec<String> = team.iter().map(Candidate::identity_hash).collect();
    hashes.sort();
    hashes.join("|")
}

/// Score, order and deduplicate raw teams.
///
/// Teams are ordered by filler (surplus of ingredients the recipe does not
/// use), then by surplus of required ingredients, then by [`team_hash`].
/// Permutations of the same members collapse into the first occurrence.
pub fn rank(
    teams: Vec<Vec<&Candidate>>,
    recipe: &[IngredientAmount],
    exhaustive: bool,
) -> Vec<TeamSolution> {
    let mut scored: Vec<(String, TeamSolution)> = teams
        .into_iter()
        .map(|members| {
            let mut team: Vec<Candidate> = members.into_iter().cloned().collect();
            team.sort_by_cached_key(Candidate::identity_hash);
            let produce: Vec<IngredientAmount> = team
                .iter()
                .flat_map(|m| m.produce.iter().cloned())
                .collect();
            let surplus = extract_relevant_surplus(recipe, surplus_over(&produce, recipe));
            (
                team_hash(&team),
                TeamSolution {
                    team,
                    surplus,
                    exhaustive,
                },
            )
        })
        .collect();

    scored.sort_by(|(ha, a), (hb, b)| {
        a.surplus
            .filler()
            .total_cmp(&b.surplus.filler())
            .then_with(|| a.surplus.relevant_sum().total_cmp(&b.surplus.relevant_sum()))
            .then_with(|| ha.cmp(hb))
    });

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|(hash, _)| seen.insert(hash.clone()))
        .map(|(_, solution)| solution)
        .collect()
}
