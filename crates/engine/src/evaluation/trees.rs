//! Combination tree completion over one owner's progress map

use std::collections::HashMap;

use criteria_domain::{CriteriaId, CriteriaProgress, CriteriaTreeOperator};

use crate::registry::{Criteria, CriteriaIdx, CriteriaRegistry, CriteriaTreeNode, TreeIdx};

/// Count a node's criteria must reach: the node's own amount, else the
/// criteria's, else 1
pub fn required_amount(node: &CriteriaTreeNode, criteria: Option<&Criteria>) -> u64 {
    if node.entry.amount > 0 {
        return node.entry.amount;
    }
    match criteria {
        Some(c) if c.entry.amount > 0 => c.entry.amount,
        _ => 1,
    }
}

/// Read-only view used to decide tree completion.
///
/// `can_complete` is the owner's veto, consulted on every node visited
/// (faction-restricted trees, already earned deliverables, ...).
pub struct TreeEvaluator<'a> {
    registry: &'a CriteriaRegistry,
    progress: &'a HashMap<CriteriaId, CriteriaProgress>,
    can_complete: &'a dyn Fn(&CriteriaTreeNode) -> bool,
}

impl<'a> TreeEvaluator<'a> {
    pub fn new(
        registry: &'a CriteriaRegistry,
        progress: &'a HashMap<CriteriaId, CriteriaProgress>,
        can_complete: &'a dyn Fn(&CriteriaTreeNode) -> bool,
    ) -> Self {
        Self {
            registry,
            progress,
            can_complete,
        }
    }

    pub fn counter(&self, idx: CriteriaIdx) -> u64 {
        let id = self.registry.criteria(idx).id();
        self.progress.get(&id).map_or(0, |p| p.counter)
    }

    pub fn is_completed_criteria(&self, idx: CriteriaIdx, required: u64) -> bool {
        let id = self.registry.criteria(idx).id();
        self.progress
            .get(&id)
            .is_some_and(|p| p.counter >= required)
    }

    fn node_criteria_complete(&self, node: &CriteriaTreeNode) -> Option<bool> {
        node.criteria.map(|idx| {
            let required = required_amount(node, Some(self.registry.criteria(idx)));
            self.is_completed_criteria(idx, required)
        })
    }

    pub fn is_completed_tree(&self, idx: TreeIdx) -> bool {
        let node = self.registry.tree(idx);
        if !(self.can_complete)(node) {
            return false;
        }

        let threshold = node.entry.amount.max(1);
        let own = self.node_criteria_complete(node);

        match node.operator() {
            CriteriaTreeOperator::Complete => own.unwrap_or(false),
            CriteriaTreeOperator::NotComplete => !own.unwrap_or(false),
            CriteriaTreeOperator::All => {
                own.unwrap_or(true) && node.children.iter().all(|c| self.is_completed_tree(*c))
            }
            CriteriaTreeOperator::Any => {
                if node.children.is_empty() {
                    return own.unwrap_or(false);
                }
                own.unwrap_or(true) && node.children.iter().any(|c| self.is_completed_tree(*c))
            }
            CriteriaTreeOperator::Sum => {
                let total = self
                    .subtree_counters(idx)
                    .fold(0u64, |acc, counter| acc.saturating_add(counter));
                total >= threshold
            }
            CriteriaTreeOperator::Highest => {
                self.subtree_counters(idx).max().unwrap_or(0) >= threshold
            }
            CriteriaTreeOperator::StartedAtLeast => {
                let started = node
                    .children
                    .iter()
                    .filter(|c| self.subtree_counters(**c).any(|counter| counter >= 1))
                    .count() as u64;
                own.unwrap_or(true) && started >= threshold
            }
            CriteriaTreeOperator::CompleteAtLeast => {
                let completed = node
                    .children
                    .iter()
                    .filter(|c| self.is_completed_tree(**c))
                    .count() as u64;
                own.unwrap_or(true) && completed >= threshold
            }
        }
    }

    /// Counters of every criteria referenced in the subtree rooted at `root`
    fn subtree_counters(&self, root: TreeIdx) -> impl Iterator<Item = u64> + '_ {
        self.registry
            .subtree(root)
            .into_iter()
            .filter_map(|idx| self.registry.tree(idx).criteria)
            .map(|criteria| self.counter(criteria))
    }
}
