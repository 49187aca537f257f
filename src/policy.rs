//! the bouncer's online admission policy: a recursive lookahead decision
//! procedure driven by correlation-derived conditional probabilities.

use crate::{Attrs, Probability};

/// marginals and pairwise correlations for one game type, as handed to the
/// client by `/params`.
#[derive(Debug, Clone)]
pub struct PolicyModel {
    pub p: Vec<Probability>,
    /// row-major `n x n` correlation matrix.
    pub corr: Vec<f64>,
}

impl PolicyModel {
    fn n(&self) -> usize {
        self.p.len()
    }

    fn correlation(&self, a: usize, b: usize) -> f64 {
        self.corr[a * self.n() + b]
    }

    /// `P(a=1 | given=1)` via the two-arm linear interpolation the policy is
    /// specified with; not a Bayesian update, reproduced as specified.
    fn conditional(&self, a: usize, given: usize) -> Probability {
        let pa = self.p[a];
        let r = self.correlation(a, given);
        if r < 0.0 {
            pa * (1.0 + r)
        } else {
            pa + r * (1.0 - pa)
        }
    }

    /// estimated arrivals needed to satisfy `goal`, `ceil(num / p(attr))`.
    /// `p(attr) == 0` is treated as an unreachable goal, so `L = infinity`.
    fn expected_length(&self, goal: &Goal) -> f64 {
        let p = self.p[goal.attr];
        if p <= 0.0 {
            f64::INFINITY
        } else {
            (goal.num as f64 / p).ceil()
        }
    }
}

/// one outstanding quota: `num` more patrons carrying `attr` are still
/// needed among the remaining admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goal {
    pub attr: usize,
    pub num: i64,
}

/// the bouncer's live goal set plus remaining admit slots.
#[derive(Debug, Clone)]
pub struct Goals {
    pub goals: Vec<Goal>,
    pub space: i64,
}

impl Goals {
    pub fn new(goals: Vec<Goal>, space: i64) -> Self {
        Self { goals, space }
    }

    fn has_attr(patron: Attrs, attr: usize) -> bool {
        patron & (1 << attr) != 0
    }

    /// reject iff some goal with `num >= space` names an attribute the
    /// patron lacks; skipped entirely when `space <= 0`.
    fn rejects_for_required(&self, patron: Attrs) -> bool {
        if self.space <= 0 {
            return false;
        }
        self.goals
            .iter()
            .any(|g| g.num >= self.space && !Self::has_attr(patron, g.attr))
    }

    fn sorted_by_length_desc(&self, model: &PolicyModel) -> Vec<Goal> {
        let mut sorted = self.goals.clone();
        sorted.sort_by(|a, b| {
            model
                .expected_length(b)
                .partial_cmp(&model.expected_length(a))
                .expect("expected_length is never NaN")
        });
        sorted
    }

    /// decide whether to accept a patron carrying attribute bitmask `patron`.
    pub fn decide(&self, patron: Attrs, model: &PolicyModel) -> bool {
        if self.goals.is_empty() {
            return self.space > 0;
        }
        if self.rejects_for_required(patron) {
            return false;
        }

        let sorted = self.sorted_by_length_desc(model);
        let hardest = sorted[0];

        if hardest.num <= 0 {
            return self.space > 0;
        }
        if Self::has_attr(patron, hardest.attr) {
            return true;
        }

        let rest_space = self.space - hardest.num;
        let rest_goals: Vec<Goal> = sorted[1..]
            .iter()
            .map(|g| {
                let condp = model.conditional(g.attr, hardest.attr);
                let adjustment = (hardest.num as f64 * condp).ceil() as i64;
                Goal {
                    attr: g.attr,
                    num: g.num - adjustment,
                }
            })
            .collect();

        Goals::new(rest_goals, rest_space).decide(patron, model)
    }

    /// record an accepted patron: burn one slot and, for each carried
    /// attribute, one unit of that goal's remaining count; drop satisfied
    /// goals.
    pub fn accept(&mut self, patron: Attrs) {
        self.space -= 1;
        for g in self.goals.iter_mut() {
            if Self::has_attr(patron, g.attr) {
                g.num -= 1;
            }
        }
        self.goals.retain(|g| g.num > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> PolicyModel {
        PolicyModel {
            p: vec![0.361586, 0.411255],
            corr: vec![1.0, 0.781504, 0.781504, 1.0],
        }
    }

    #[test]
    fn accepts_when_no_goals_and_space_remains() {
        let goals = Goals::new(vec![], 5);
        assert!(goals.decide(0, &model()));
    }

    #[test]
    fn rejects_when_no_goals_and_no_space() {
        let goals = Goals::new(vec![], 0);
        assert!(!goals.decide(0, &model()));
    }

    #[test]
    fn rejects_patron_missing_a_required_attribute() {
        // both goals equal remaining space: patron must carry both attrs
        let goals = Goals::new(vec![Goal { attr: 0, num: 2 }, Goal { attr: 1, num: 2 }], 2);
        let patron_missing_attr1: Attrs = 0b01;
        assert!(!goals.decide(patron_missing_attr1, &model()));
    }

    #[test]
    fn accepts_patron_matching_the_hardest_goal() {
        let goals = Goals::new(vec![Goal { attr: 0, num: 500 }, Goal { attr: 1, num: 10 }], 900);
        let patron: Attrs = 0b01;
        assert!(goals.decide(patron, &model()));
    }

    #[test]
    fn accept_never_increases_remaining_counts() {
        let mut goals = Goals::new(vec![Goal { attr: 0, num: 5 }, Goal { attr: 1, num: 5 }], 10);
        let before: Vec<i64> = goals.goals.iter().map(|g| g.num).collect();
        goals.accept(0b11);
        for (g, &prev) in goals.goals.iter().zip(before.iter()) {
            assert!(g.num <= prev);
        }
    }

    #[test]
    fn accept_drops_satisfied_goals() {
        let mut goals = Goals::new(vec![Goal { attr: 0, num: 1 }], 10);
        goals.accept(0b01);
        assert!(goals.goals.is_empty());
    }

    #[test]
    fn zero_marginal_treated_as_infinite_length_sorts_first() {
        let model = PolicyModel {
            p: vec![0.0, 0.5],
            corr: vec![1.0, 0.0, 0.0, 1.0],
        };
        let goals = Goals::new(vec![Goal { attr: 1, num: 1 }, Goal { attr: 0, num: 1 }], 10);
        let sorted = goals.sorted_by_length_desc(&model);
        assert_eq!(sorted[0].attr, 0);
    }
}
