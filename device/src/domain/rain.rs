//! Rain likelihood estimators.
//!
//! Both estimators are pure: the same inputs always give the same score.

use crate::traits::classifier::RainClassifier;

/// Additive weather rules, clamped to 0..=100.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RuleTable;

impl RuleTable {
    pub const fn new() -> Self {
        Self
    }
}

impl RainClassifier for RuleTable {
    fn rain_probability(&self, temperature: f32, pressure: f32, humidity: f32) -> f32 {
        let mut score = 0.0;

        score += if humidity > 85.0 {
            50.0
        } else if humidity > 70.0 {
            30.0
        } else if humidity > 50.0 {
            10.0
        } else {
            0.0
        };

        // low pressure usually precedes rain
        score += if pressure < 990.0 {
            40.0
        } else if pressure < 1000.0 {
            20.0
        } else if pressure < 1010.0 {
            5.0
        } else {
            0.0
        };

        if temperature > 25.0 && humidity > 60.0 {
            score += 10.0;
        }
        if temperature < 5.0 && humidity > 80.0 {
            score += 15.0;
        }

        clamp_score(score)
    }
}

/// Score reported when the tree predicts rain.
pub const RAIN_SCORE: f32 = 85.0;
/// Score reported when the tree predicts no rain.
pub const DRY_SCORE: f32 = 15.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Feature {
    Humidity,
    Temperature,
    Pressure,
}

impl Feature {
    fn select(self, temperature: f32, pressure: f32, humidity: f32) -> f32 {
        match self {
            Feature::Humidity => humidity,
            Feature::Temperature => temperature,
            Feature::Pressure => pressure,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TreeNode {
    /// Goes to `left` if the feature is `<= threshold`, otherwise to `right`.
    Split {
        feature: Feature,
        threshold: f32,
        left: u8,
        right: u8,
    },
    /// `true` predicts rain.
    Leaf(bool),
}

/// Binary decision tree stored as a flat node table, root at index 0.
#[derive(Debug, Copy, Clone)]
pub struct DecisionTree<'a> {
    nodes: &'a [TreeNode],
}

impl<'a> DecisionTree<'a> {
    pub const fn new(nodes: &'a [TreeNode]) -> Self {
        Self { nodes }
    }

    /// Walks the tree. Returns `None` for a malformed table (dangling index or cycle).
    pub fn predict(&self, temperature: f32, pressure: f32, humidity: f32) -> Option<bool> {
        let mut index = 0usize;
        // a well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index)? {
                TreeNode::Leaf(rain) => return Some(*rain),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = feature.select(temperature, pressure, humidity);
                    index = usize::from(if value <= *threshold { *left } else { *right });
                }
            }
        }
        None
    }
}

impl RainClassifier for DecisionTree<'_> {
    fn rain_probability(&self, temperature: f32, pressure: f32, humidity: f32) -> f32 {
        match self.predict(temperature, pressure, humidity) {
            Some(true) => RAIN_SCORE,
            Some(false) => DRY_SCORE,
            None => 0.0,
        }
    }
}

/// A small tree over humidity, pressure and temperature.
pub const DEFAULT_TREE: [TreeNode; 7] = [
    TreeNode::Split {
        feature: Feature::Humidity,
        threshold: 70.0,
        left: 1,
        right: 4,
    },
    TreeNode::Split {
        feature: Feature::Pressure,
        threshold: 995.0,
        left: 2,
        right: 3,
    },
    TreeNode::Leaf(true),
    TreeNode::Leaf(false),
    TreeNode::Split {
        feature: Feature::Temperature,
        threshold: 30.0,
        left: 5,
        right: 6,
    },
    TreeNode::Leaf(true),
    TreeNode::Leaf(false),
];

/// Forces a score into 0..=100; NaN counts as 0.
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table_scores() {
        let rules = RuleTable::new();
        // dry, high pressure
        assert_eq!(0.0, rules.rain_probability(20.0, 1020.0, 30.0));
        // humid and low
        assert_eq!(90.0, rules.rain_probability(15.0, 985.0, 90.0));
        // warm and muggy
        assert_eq!(45.0, rules.rain_probability(28.0, 1005.0, 75.0));
        // everything at once clamps
        assert_eq!(100.0, rules.rain_probability(2.0, 980.0, 95.0));
    }

    #[test]
    fn rule_table_is_pure() {
        let rules = RuleTable::new();
        let a = rules.rain_probability(21.3, 1001.2, 66.0);
        let b = rules.rain_probability(21.3, 1001.2, 66.0);
        assert_eq!(a, b);
    }

    #[test]
    fn default_tree_predicts() {
        let tree = DecisionTree::new(&DEFAULT_TREE);
        assert_eq!(Some(true), tree.predict(20.0, 990.0, 50.0));
        assert_eq!(Some(false), tree.predict(20.0, 1013.0, 50.0));
        assert_eq!(Some(true), tree.predict(20.0, 1013.0, 80.0));
        assert_eq!(Some(false), tree.predict(32.0, 1013.0, 80.0));
        assert_eq!(RAIN_SCORE, tree.rain_probability(20.0, 990.0, 50.0));
        assert_eq!(DRY_SCORE, tree.rain_probability(20.0, 1013.0, 50.0));
    }

    #[test]
    fn threshold_goes_left() {
        let tree = DecisionTree::new(&DEFAULT_TREE);
        // humidity == 70 goes left, pressure == 995 goes left
        assert_eq!(Some(true), tree.predict(20.0, 995.0, 70.0));
    }

    #[test]
    fn malformed_tree() {
        let dangling = [TreeNode::Split {
            feature: Feature::Humidity,
            threshold: 50.0,
            left: 7,
            right: 7,
        }];
        assert_eq!(None, DecisionTree::new(&dangling).predict(0.0, 0.0, 0.0));

        let cycle = [
            TreeNode::Split {
                feature: Feature::Humidity,
                threshold: 50.0,
                left: 1,
                right: 1,
            },
            TreeNode::Split {
                feature: Feature::Humidity,
                threshold: 50.0,
                left: 0,
                right: 0,
            },
        ];
        assert_eq!(None, DecisionTree::new(&cycle).predict(0.0, 0.0, 0.0));
        assert_eq!(0.0, DecisionTree::new(&cycle).rain_probability(0.0, 0.0, 0.0));
        assert_eq!(None, DecisionTree::new(&[]).predict(0.0, 0.0, 0.0));
    }

    #[test]
    fn clamping() {
        assert_eq!(0.0, clamp_score(-12.0));
        assert_eq!(100.0, clamp_score(140.0));
        assert_eq!(42.5, clamp_score(42.5));
        assert_eq!(0.0, clamp_score(f32::NAN));
    }
}
