//! Decision-tree ensemble evaluated as flat node tables.

use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("forest has no trees")]
    Empty,
    #[error("model expects {expected} features, input layout provides {got}")]
    InputWidth { expected: usize, got: usize },
    #[error("model input channel {channel} is not sampled by the feature engine")]
    UnsampledChannel { channel: crate::features::Channel },
    #[error("forest must have at least one class")]
    NoClasses,
    #[error("tree {tree} is empty")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node}: child {child} is not a later node in the table")]
    BadChild {
        tree: usize,
        node: usize,
        child: usize,
    },
    #[error("tree {tree} node {node}: feature {feature} out of range (model has {n_features})")]
    BadFeature {
        tree: usize,
        node: usize,
        feature: usize,
        n_features: usize,
    },
    #[error("tree {tree} node {node}: class {class} out of range (model has {n_classes})")]
    BadClass {
        tree: usize,
        node: usize,
        class: u8,
        n_classes: u8,
    },
}

/// Index of a predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct ClassLabel(pub u8);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// `x[feature] <= threshold` goes left, anything else (NaN included) right.
    Split {
        feature: u16,
        threshold: f64,
        left: u16,
        right: u16,
    },
    Leaf { class: u8 },
}

impl Node {
    pub const fn split(feature: u16, threshold: f64, left: u16, right: u16) -> Self {
        Self::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    pub const fn leaf(class: u8) -> Self {
        Self::Leaf { class }
    }
}

/// Node table rooted at index 0. Children always sit at higher indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Cow<'static, [Node]>,
}

impl Tree {
    pub const fn from_static(nodes: &'static [Node]) -> Self {
        Self {
            nodes: Cow::Borrowed(nodes),
        }
    }

    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes: Cow::Owned(nodes),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Walk from the root to a leaf. Caller guarantees a validated table.
    fn eval(&self, x: &[f32]) -> u8 {
        let mut idx = 0usize;
        loop {
            match self.nodes[idx] {
                Node::Leaf { class } => return class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = x.get(usize::from(feature)).copied().unwrap_or(f32::NAN);
                    idx = if f64::from(v) <= threshold {
                        usize::from(left)
                    } else {
                        usize::from(right)
                    };
                }
            }
        }
    }
}

/// Majority-vote forest over validated trees.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    n_classes: u8,
    n_features: usize,
}

impl Forest {
    /// Check every table so evaluation cannot index out of bounds or loop.
    pub fn new(trees: Vec<Tree>, n_classes: u8, n_features: usize) -> Result<Self, ModelError> {
        if trees.is_empty() {
            return Err(ModelError::Empty);
        }
        if n_classes == 0 {
            return Err(ModelError::NoClasses);
        }
        for (t, tree) in trees.iter().enumerate() {
            let nodes = tree.nodes();
            if nodes.is_empty() {
                return Err(ModelError::EmptyTree { tree: t });
            }
            for (i, node) in nodes.iter().enumerate() {
                match *node {
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        for child in [usize::from(left), usize::from(right)] {
                            if child <= i || child >= nodes.len() {
                                return Err(ModelError::BadChild {
                                    tree: t,
                                    node: i,
                                    child,
                                });
                            }
                        }
                        if usize::from(feature) >= n_features {
                            return Err(ModelError::BadFeature {
                                tree: t,
                                node: i,
                                feature: usize::from(feature),
                                n_features,
                            });
                        }
                    }
                    Node::Leaf { class } => {
                        if class >= n_classes {
                            return Err(ModelError::BadClass {
                                tree: t,
                                node: i,
                                class,
                                n_classes,
                            });
                        }
                    }
                }
            }
        }
        Ok(Self {
            trees,
            n_classes,
            n_features,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> u8 {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Per-class vote counts. Features past the end of `x` read as NaN.
    pub fn votes(&self, x: &[f32]) -> Vec<u8> {
        let mut votes = vec![0u8; usize::from(self.n_classes)];
        for tree in &self.trees {
            let class = usize::from(tree.eval(x));
            votes[class] = votes[class].saturating_add(1);
        }
        votes
    }

    /// Class with the most votes; ties go to the lowest class index.
    pub fn predict(&self, x: &[f32]) -> ClassLabel {
        let votes = self.votes(x);
        let mut best = 0usize;
        for (i, &v) in votes.iter().enumerate().skip(1) {
            if v > votes[best] {
                best = i;
            }
        }
        // n_classes is a u8
        ClassLabel(best as u8)
    }
}
