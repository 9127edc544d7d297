//! Compiled predicate trees.

use std::fmt;

use stitch_core::FieldFilter;
use stitch_registry::RelationLink;

/// Boolean connective of an AND/OR group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "AND" => Some(BoolOp::And),
            "OR" => Some(BoolOp::Or),
            _ => None,
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::And => f.write_str("AND"),
            BoolOp::Or => f.write_str("OR"),
        }
    }
}

/// Match semantics of a list relation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// At least one related record matches.
    Some,
    /// No related record matches.
    None,
    /// Every related record matches (true when there are none).
    Every,
}

impl Quantifier {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "some" => Some(Quantifier::Some),
            "none" => Some(Quantifier::None),
            "every" => Some(Quantifier::Every),
            _ => None,
        }
    }

    /// Decide the quantifier from the number of matching and related records.
    pub fn holds(&self, matched: usize, related: usize) -> bool {
        match self {
            Quantifier::Some => matched > 0,
            Quantifier::None => matched == 0,
            Quantifier::Every => matched == related,
        }
    }
}

/// A filter on records reached through a relation field.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationWhere {
    /// Relation field on the filtered model.
    pub field: String,
    /// Target model name.
    pub target: String,
    /// How to reach the target records.
    pub link: RelationLink,
    /// Set for list relations only.
    pub quantifier: Option<Quantifier>,
    /// Filters compiled against the target model.
    pub filters: Box<PredicateNode>,
}

/// A compiled where clause.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    /// Matches every record.
    Empty,
    /// Field comparisons, all of which must hold.
    Base(Vec<FieldFilter>),
    /// Boolean group. `AND` of nothing matches all, `OR` of nothing matches none.
    AndOr {
        op: BoolOp,
        children: Vec<PredicateNode>,
    },
    /// Relation filters, all of which must hold.
    RelationGroup(Vec<RelationWhere>),
}

impl PredicateNode {
    pub fn is_empty(&self) -> bool {
        matches!(self, PredicateNode::Empty)
    }

    /// Whether the store can evaluate this node in one query.
    pub fn is_native(&self) -> bool {
        match self {
            PredicateNode::Empty | PredicateNode::Base(_) => true,
            PredicateNode::AndOr { children, .. } => children.iter().all(Self::is_native),
            PredicateNode::RelationGroup(_) => false,
        }
    }

    /// Conjunction of `parts`, collapsing trivial cases.
    pub fn all_of(mut parts: Vec<PredicateNode>) -> Self {
        parts.retain(|p| !p.is_empty());
        match parts.len() {
            0 => PredicateNode::Empty,
            1 => parts.remove(0),
            _ => PredicateNode::AndOr {
                op: BoolOp::And,
                children: parts,
            },
        }
    }
}
