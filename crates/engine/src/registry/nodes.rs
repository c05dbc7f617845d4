//! Arena nodes owned by the registry.
//!
//! Cross references between criteria, criteria trees and modifier trees are
//! arena indices, never owning pointers.

use criteria_domain::{
    CriteriaData, CriteriaEntry, CriteriaId, CriteriaTreeEntry, CriteriaTreeId,
    CriteriaTreeOperator, Deliverable, ModifierCondition, ModifierTreeEntry, ModifierTreeId,
    ModifierTreeOperator, OwnerKinds,
};

macro_rules! define_index {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_usize(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or(u32::MAX))
            }

            pub(crate) fn get(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_index!(CriteriaIdx);
define_index!(TreeIdx);
define_index!(ModifierIdx);

/// A loaded criteria with its resolved references
#[derive(Debug, Clone)]
pub struct Criteria {
    pub entry: CriteriaEntry,
    pub modifier: Option<ModifierIdx>,
    /// Owner kinds of every deliverable whose tree references this criteria
    pub owner_kinds: OwnerKinds,
    /// Requirement predicates; all must hold
    pub data: Vec<CriteriaData>,
    /// Tree nodes that reference this criteria
    pub trees: Vec<TreeIdx>,
}

impl Criteria {
    pub fn id(&self) -> CriteriaId {
        self.entry.id
    }
}

#[derive(Debug, Clone)]
pub struct CriteriaTreeNode {
    pub entry: CriteriaTreeEntry,
    pub criteria: Option<CriteriaIdx>,
    pub parent: Option<TreeIdx>,
    /// Ordered by `order_index`
    pub children: Vec<TreeIdx>,
    pub root: TreeIdx,
    /// Deliverable attached to this node's root, if any
    pub deliverable: Option<Deliverable>,
    pub owner_kinds: OwnerKinds,
}

impl CriteriaTreeNode {
    pub fn id(&self) -> CriteriaTreeId {
        self.entry.id
    }

    pub fn operator(&self) -> CriteriaTreeOperator {
        self.entry.operator
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ModifierNode {
    pub entry: ModifierTreeEntry,
    pub condition: ModifierCondition,
    pub children: Vec<ModifierIdx>,
}

impl ModifierNode {
    pub fn id(&self) -> ModifierTreeId {
        self.entry.id
    }

    pub fn operator(&self) -> ModifierTreeOperator {
        self.entry.operator
    }
}
