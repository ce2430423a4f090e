//! Classifier representations carried in the artifact.
//!
//! Two model shapes are supported: a dense linear scorer (argmax of
//! `W * x + b`) and a binary decision tree stored as a flat node array. Both
//! sit behind [`Predictor`] so the session never looks at their internals.

use serde::{Deserialize, Serialize};

use crate::feature::FEATURE_COUNT;
use crate::{CarEvalError, Result};

/// Black-box classifier over numeric records.
pub trait Predictor {
    /// Number of distinct class indices the model can emit.
    fn n_classes(&self) -> usize;

    /// Predict one class index per input row.
    fn predict(&self, batch: &[[f64; FEATURE_COUNT]]) -> Result<Vec<usize>>;
}

/// Model section of the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    Linear(LinearModel),
    Tree(TreeModel),
}

impl Model {
    pub fn kind(&self) -> &'static str {
        match self {
            Model::Linear(_) => "linear",
            Model::Tree(_) => "tree",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Model::Linear(m) => m.validate(),
            Model::Tree(m) => m.validate(),
        }
    }
}

impl Predictor for Model {
    fn n_classes(&self) -> usize {
        match self {
            Model::Linear(m) => m.n_classes(),
            Model::Tree(m) => m.n_classes(),
        }
    }

    fn predict(&self, batch: &[[f64; FEATURE_COUNT]]) -> Result<Vec<usize>> {
        match self {
            Model::Linear(m) => m.predict(batch),
            Model::Tree(m) => m.predict(batch),
        }
    }
}

fn incompatible(msg: impl Into<String>) -> CarEvalError {
    CarEvalError::IncompatibleArtifact(msg.into())
}

/// Dense layer with one weight row per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    /// `n_classes` rows of `FEATURE_COUNT` weights.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl LinearModel {
    pub fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(incompatible("linear model has no classes"));
        }
        if self.bias.len() != self.weights.len() {
            return Err(incompatible(format!(
                "linear model has {} weight rows but {} biases",
                self.weights.len(),
                self.bias.len()
            )));
        }
        for (i, row) in self.weights.iter().enumerate() {
            if row.len() != FEATURE_COUNT {
                return Err(incompatible(format!(
                    "weight row {i} has {} inputs, expected {FEATURE_COUNT}",
                    row.len()
                )));
            }
        }
        let all_finite = self
            .weights
            .iter()
            .flatten()
            .chain(self.bias.iter())
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(incompatible("linear model contains non-finite parameters"));
        }
        Ok(())
    }

    fn score(&self, input: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

impl Predictor for LinearModel {
    fn n_classes(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, batch: &[[f64; FEATURE_COUNT]]) -> Result<Vec<usize>> {
        batch
            .iter()
            .map(|input| {
                let scores = self.score(input);
                // first maximum wins on ties
                let mut best = 0;
                for (i, s) in scores.iter().enumerate().skip(1) {
                    if *s > scores[best] {
                        best = i;
                    }
                }
                Ok(best)
            })
            .collect()
    }
}

/// Node of a decision tree. Children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go `left` when `input[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeModel {
    /// Flat node array, root at index 0.
    pub nodes: Vec<TreeNode>,
}

impl TreeModel {
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(incompatible("tree model has no nodes"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(incompatible(format!(
                        "tree node {i} splits on feature {feature}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(incompatible(format!("tree node {i} has a non-finite threshold")));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(incompatible(format!(
                            "tree node {i} points to invalid child {child}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn walk(&self, input: &[f64; FEATURE_COUNT]) -> Result<usize> {
        let mut idx = 0;
        // validated children move strictly forward, so this terminates
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = input
                        .get(*feature)
                        .ok_or_else(|| CarEvalError::Prediction(format!("bad split feature {feature}")))?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(CarEvalError::Prediction(format!("tree node {idx} out of range")))
                }
            }
        }
    }
}

impl Predictor for TreeModel {
    fn n_classes(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Leaf { class } => Some(*class + 1),
                TreeNode::Split { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }

    fn predict(&self, batch: &[[f64; FEATURE_COUNT]]) -> Result<Vec<usize>> {
        batch.iter().map(|input| self.walk(input)).collect()
    }
}

/// Per-feature standardization applied before prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(incompatible(format!(
                "scaler must have {FEATURE_COUNT} means and scales, got {} and {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite())
            || self.mean.iter().any(|m| !m.is_finite())
        {
            return Err(incompatible("scaler has zero or non-finite parameters"));
        }
        Ok(())
    }

    pub fn transform(&self, input: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = *input;
        for ((x, m), s) in out.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - m) / s;
        }
        out
    }
}

/// Maps class indices back to category labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn decode(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| {
                CarEvalError::Prediction(format!(
                    "class index {code} outside decoder range 0..{}",
                    self.classes.len()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> TreeModel {
        // safety <= 1 -> class 0, else persons <= 2 -> class 0, else class 1
        TreeModel {
            nodes: vec![
                TreeNode::Split { feature: 5, threshold: 1.5, left: 1, right: 2 },
                TreeNode::Leaf { class: 0 },
                TreeNode::Split { feature: 3, threshold: 2.5, left: 3, right: 4 },
                TreeNode::Leaf { class: 0 },
                TreeNode::Leaf { class: 1 },
            ],
        }
    }

    #[test]
    fn tree_walks_to_leaves() {
        let t = tree();
        t.validate().unwrap();
        let preds = t
            .predict(&[[1.0, 1.0, 2.0, 4.0, 1.0, 1.0], [1.0, 1.0, 2.0, 4.0, 1.0, 3.0], [1.0, 1.0, 2.0, 2.0, 1.0, 3.0]])
            .unwrap();
        assert_eq!(preds, vec![0, 1, 0]);
        assert_eq!(t.n_classes(), 2);
    }

    #[test]
    fn tree_rejects_backward_children() {
        let mut t = tree();
        t.nodes[2] = TreeNode::Split { feature: 3, threshold: 2.5, left: 0, right: 4 };
        assert!(matches!(t.validate(), Err(CarEvalError::IncompatibleArtifact(_))));
    }

    #[test]
    fn linear_argmax() {
        let m = LinearModel {
            weights: vec![vec![0.0; 6], vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]],
            bias: vec![1.5, 0.0],
        };
        m.validate().unwrap();
        assert_eq!(m.predict(&[[0.0; 6], [0.0, 0.0, 0.0, 0.0, 0.0, 3.0]]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn scaler_standardizes() {
        let s = Scaler { mean: vec![2.0; 6], scale: vec![0.5; 6] };
        s.validate().unwrap();
        assert_eq!(s.transform(&[3.0; 6]), [2.0; 6]);
        let bad = Scaler { mean: vec![0.0; 6], scale: vec![0.0; 6] };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn decoder_out_of_range() {
        let d = LabelDecoder::new(vec!["acc".into(), "unacc".into()]);
        assert_eq!(d.decode(1).unwrap(), "unacc");
        assert!(matches!(d.decode(2), Err(CarEvalError::Prediction(_))));
    }
}
