use crate::EPSILON;

/// How a removal is split into passes: `full_pass_count` passes at `full_pass_depth`, then one
/// finishing pass at `remainder_depth` if that is non-zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassPlan {
    pub full_pass_count: usize,
    pub full_pass_depth: f64,
    pub remainder_depth: f64,
}

impl PassPlan {
    /// Plan the passes needed to remove `total_removal` at no more than `depth_of_cut` per pass.
    /// Both values must be finite, and `depth_of_cut` larger than `EPSILON`. A removal of
    /// `EPSILON` or less gives an empty plan.
    pub fn new(total_removal: f64, depth_of_cut: f64) -> Self {
        debug_assert!(
            total_removal.is_finite() && depth_of_cut.is_finite(),
            "pass plan inputs must be finite"
        );
        debug_assert!(depth_of_cut > EPSILON, "depth of cut must be positive");
        if total_removal <= EPSILON {
            return PassPlan {
                full_pass_count: 0,
                full_pass_depth: depth_of_cut,
                remainder_depth: 0.0,
            };
        }
        let mut full_pass_count = (total_removal / depth_of_cut).floor();
        let mut remainder_depth = total_removal - full_pass_count * depth_of_cut;
        // Decimal inputs like 0.3 / 0.1 land just under a whole number in binary, leaving a
        // remainder within EPSILON of a full pass.
        if depth_of_cut - remainder_depth < EPSILON {
            full_pass_count += 1.0;
            remainder_depth = 0.0;
        } else if remainder_depth < EPSILON {
            remainder_depth = 0.0;
        }
        PassPlan {
            full_pass_count: full_pass_count as usize,
            full_pass_depth: depth_of_cut,
            remainder_depth,
        }
    }

    pub fn has_finishing_pass(&self) -> bool {
        self.remainder_depth > 0.0
    }

    /// Number of cuts this plan emits, finishing pass included.
    pub fn cut_count(&self) -> usize {
        self.full_pass_count + usize::from(self.has_finishing_pass())
    }

    /// Depth of each pass, in order: the full passes and then the finishing pass, if any.
    pub fn depths(&self) -> impl Iterator<Item = f64> {
        let full = std::iter::repeat(self.full_pass_depth).take(self.full_pass_count);
        let finishing = if self.has_finishing_pass() {
            Some(self.remainder_depth)
        } else {
            None
        };
        full.chain(finishing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn full_passes_and_remainder() {
        let plan = PassPlan::new(10.0, 3.0);
        assert_eq!(plan.full_pass_count, 3);
        assert_relative_eq!(plan.remainder_depth, 1.0, epsilon = 1e-9);
        assert_eq!(plan.cut_count(), 4);
        assert_eq!(plan.depths().collect::<Vec<_>>().len(), 4);
    }

    #[test]
    fn exact_multiple_has_no_finishing_pass() {
        let plan = PassPlan::new(20.0, 5.0);
        assert_eq!(plan.full_pass_count, 4);
        assert!(!plan.has_finishing_pass());
        assert_eq!(plan.cut_count(), 4);
    }

    #[test]
    fn decimal_multiple_has_no_finishing_pass() {
        // 0.3 / 0.1 is 2.9999999999999996 in f64
        let plan = PassPlan::new(0.3, 0.1);
        assert_eq!(plan.full_pass_count, 3);
        assert_eq!(plan.remainder_depth, 0.0);

        let plan = PassPlan::new(1.2, 0.4);
        assert_eq!(plan.full_pass_count, 3);
        assert!(!plan.has_finishing_pass());
    }

    #[test]
    fn small_removal_gets_one_finishing_pass() {
        let plan = PassPlan::new(0.4, 1.0);
        assert_eq!(plan.full_pass_count, 0);
        assert_relative_eq!(plan.remainder_depth, 0.4);
        assert_eq!(plan.depths().collect::<Vec<_>>(), vec![0.4]);
    }

    #[test]
    fn nothing_to_remove() {
        assert_eq!(PassPlan::new(0.0, 1.0).cut_count(), 0);
        assert_eq!(PassPlan::new(-2.0, 1.0).cut_count(), 0);
        assert_eq!(PassPlan::new(1e-10, 1.0).cut_count(), 0);
    }

    #[test]
    fn just_over_epsilon_still_cuts() {
        let plan = PassPlan::new(2e-9, 1.0);
        assert_eq!(plan.full_pass_count, 0);
        assert_eq!(plan.cut_count(), 1);
    }

    #[test]
    fn tolerance_is_absolute_for_large_depths() {
        // 5e-8 short of three passes is a real finishing pass, not float noise
        let plan = PassPlan::new(299.999_999_95, 100.0);
        assert_eq!(plan.full_pass_count, 2);
        assert!(plan.has_finishing_pass());
        let rebuilt = plan.full_pass_count as f64 * 100.0 + plan.remainder_depth;
        assert!((rebuilt - 299.999_999_95).abs() < 1e-9);
    }

    #[test]
    fn pass_count_identity() {
        let depths = [
            0.01, 0.1, 0.25, 0.3, 0.7, 1.0, 1.5, 2.0, 3.0, 7.3, 50.0, 100.0, 250.0,
        ];
        let removals = [
            0.05,
            0.3,
            1.0,
            2.5,
            9.9,
            10.0,
            17.35,
            33.3,
            100.0,
            299.999_999_95,
            750.25,
        ];
        for &d in depths.iter() {
            for &r in removals.iter() {
                let plan = PassPlan::new(r, d);
                let rebuilt = plan.full_pass_count as f64 * d + plan.remainder_depth;
                assert!((rebuilt - r).abs() < 1e-9, "{r} / {d}: {plan:?}");
                assert!(plan.remainder_depth >= 0.0 && plan.remainder_depth < d);
                let floor = (r / d).floor() as usize;
                assert!(plan.full_pass_count == floor || plan.full_pass_count == floor + 1);
            }
        }
    }
}
