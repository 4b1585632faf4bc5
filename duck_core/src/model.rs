//! Bundled ten-tree forest trained on temperature, humidity and pressure
//! features from the field nodes.
//!
//! Input layout (9 features):
//! `[scaled T, scaled H, scaled P, vol T, vol H, vol P, vel T, vel H, vel P]`.

use crate::features::Channel;
use crate::forest::{Forest, ModelError, Node, Tree};

/// Channels the bundled forest reads, in input order.
pub const MODEL_CHANNELS: [Channel; 3] = [Channel::Temperature, Channel::Humidity, Channel::Pressure];

pub const N_FEATURES: usize = MODEL_CHANNELS.len() * 3;
pub const N_CLASSES: u8 = 2;

/// Build the bundled forest, validating every table.
pub fn builtin_forest() -> Result<Forest, ModelError> {
    let trees = TREES.iter().map(|&t| Tree::from_static(t)).collect();
    Forest::new(trees, N_CLASSES, N_FEATURES)
}

const TREES: [&[Node]; 10] = [
    TREE_0, TREE_1, TREE_2, TREE_3, TREE_4, TREE_5, TREE_6, TREE_7, TREE_8, TREE_9,
];

const TREE_0: &[Node] = &[
    Node::split(2, -0.9384118616580963, 1, 6),
    Node::split(5, 0.036514824256300926, 2, 5),
    Node::split(4, 1.0992498099803925, 3, 4),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_1: &[Node] = &[
    Node::split(2, -0.9384118616580963, 1, 8),
    Node::split(1, -0.3601927012205124, 2, 3),
    Node::leaf(1),
    Node::split(6, 0.006665616761893034, 4, 7),
    Node::split(8, -0.0035800085752271116, 5, 6),
    Node::leaf(1),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_2: &[Node] = &[
    Node::split(4, 0.5790334641933441, 1, 6),
    Node::split(2, -0.7425177693367004, 2, 5),
    Node::split(6, 0.004250231897458434, 3, 4),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
    Node::split(2, -1.036358892917633, 7, 10),
    Node::split(7, -0.014621875830926001, 8, 9),
    Node::leaf(1),
    Node::leaf(0),
    Node::split(0, -0.2309324312955141, 11, 14),
    Node::split(4, 1.2661281526088715, 12, 13),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_3: &[Node] = &[
    Node::split(5, 0.014906374737620354, 1, 2),
    Node::leaf(0),
    Node::split(0, -1.7239412665367126, 3, 6),
    Node::split(6, -0.08184515102766454, 4, 5),
    Node::leaf(1),
    Node::leaf(0),
    Node::split(4, 0.7656183838844299, 7, 8),
    Node::leaf(1),
    Node::split(5, 0.016832378692924976, 9, 12),
    Node::split(4, 1.6603617370128632, 10, 11),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_4: &[Node] = &[
    Node::split(6, 0.004833422135561705, 1, 10),
    Node::split(5, 0.014959174208343029, 2, 3),
    Node::leaf(0),
    Node::split(3, 0.15838249772787094, 4, 5),
    Node::leaf(0),
    Node::split(1, -0.1804233193397522, 6, 7),
    Node::leaf(1),
    Node::split(5, 0.018944271840155125, 8, 9),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_5: &[Node] = &[
    Node::split(2, -0.9384118616580963, 1, 6),
    Node::split(4, 1.3473059833049774, 2, 5),
    Node::split(5, 0.037621909752488136, 3, 4),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_6: &[Node] = &[
    Node::split(5, 0.014906374737620354, 1, 2),
    Node::leaf(0),
    Node::split(0, -1.5279226303100586, 3, 6),
    Node::split(2, -0.6445707380771637, 4, 5),
    Node::leaf(0),
    Node::leaf(1),
    Node::split(0, 0.12190117686986923, 7, 12),
    Node::split(4, 1.0817658603191376, 8, 11),
    Node::split(6, -0.0011667056242004037, 9, 10),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_7: &[Node] = &[
    Node::split(0, -1.4005104899406433, 1, 4),
    Node::split(3, 0.7733395248651505, 2, 3),
    Node::leaf(0),
    Node::leaf(1),
    Node::split(6, -0.004000072251074016, 5, 12),
    Node::split(7, -0.001516676158644259, 6, 7),
    Node::leaf(0),
    Node::split(0, 0.18724073469638824, 8, 11),
    Node::split(5, 0.034767745062708855, 9, 10),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
    Node::leaf(1),
];

const TREE_8: &[Node] = &[
    Node::split(2, -0.9384118616580963, 1, 10),
    Node::split(2, -1.1343059539794922, 2, 5),
    Node::split(3, 0.48948897421360016, 3, 4),
    Node::leaf(0),
    Node::leaf(1),
    Node::split(4, 0.5215187966823578, 6, 9),
    Node::split(4, 0.2518381178379059, 7, 8),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(0),
    Node::leaf(1),
];

const TREE_9: &[Node] = &[
    Node::split(0, -0.11005425080657005, 1, 4),
    Node::split(5, 0.0626208083704114, 2, 3),
    Node::leaf(0),
    Node::leaf(1),
    Node::leaf(1),
];
