//! Registry construction from raw static rows.
//!
//! Load order follows the reference direction of the rows: modifier trees,
//! criteria, criteria trees, deliverables, then requirement predicates and
//! the event indices. A row that fails validation or points at a missing row
//! is logged with its table and id and dropped; loading always completes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use criteria_domain::{
    AchievementEntry, CriteriaData, CriteriaDataRow, CriteriaEntry, CriteriaTreeEntry,
    CriteriaTreeId, Deliverable, DomainError, ModifierCondition, ModifierTreeEntry, OwnerKind,
    OwnerKinds, QuestObjectiveEntry, ScenarioStepEntry,
};

use super::nodes::{Criteria, CriteriaIdx, CriteriaTreeNode, ModifierIdx, ModifierNode, TreeIdx};
use super::CriteriaRegistry;
use crate::infrastructure::ports::ScriptCheckPort;
use crate::infrastructure::static_data::{StaticDataSet, StaticTable};

/// Last id reached walking parent links from `id`; stops on a missing
/// parent or a repeat
fn topmost<Id>(parents: &BTreeMap<Id, Option<Id>>, id: Id) -> Id
where
    Id: Copy + Eq + Hash + Ord,
{
    let mut seen = HashSet::from([id]);
    let mut current = id;
    while let Some(parent) = parents.get(&current).copied().flatten() {
        if !parents.contains_key(&parent) || !seen.insert(parent) {
            break;
        }
        current = parent;
    }
    current
}

/// Where a node's parent chain ends
#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor<Id> {
    Root,
    MissingParent(Id),
    /// This node's parent link closes a cycle
    Cycle,
    /// An ancestor was rejected
    Orphaned,
}

impl<Id: fmt::Display> fmt::Display for Anchor<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Root => write!(f, "reaches a root"),
            Anchor::MissingParent(parent) => write!(f, "references missing parent {}", parent),
            Anchor::Cycle => write!(f, "closes a parent cycle"),
            Anchor::Orphaned => write!(f, "has a dropped ancestor"),
        }
    }
}

/// Classifies every node of a parent-linked forest.
fn resolve_forest<Id>(parents: &BTreeMap<Id, Option<Id>>) -> HashMap<Id, Anchor<Id>>
where
    Id: Copy + Eq + Hash + Ord,
{
    let mut status: HashMap<Id, Anchor<Id>> = HashMap::new();

    for &start in parents.keys() {
        if status.contains_key(&start) {
            continue;
        }

        let mut path: Vec<Id> = Vec::new();
        let mut current = start;
        let verdict = loop {
            if let Some(known) = status.get(&current) {
                break match known {
                    Anchor::Root => Anchor::Root,
                    _ => Anchor::Orphaned,
                };
            }
            if path.contains(&current) {
                break Anchor::Cycle;
            }
            path.push(current);
            match parents.get(&current).copied().flatten() {
                None => break Anchor::Root,
                Some(parent) if !parents.contains_key(&parent) => {
                    break Anchor::MissingParent(parent)
                }
                Some(parent) => current = parent,
            }
        };

        // The last node on the path is where the chain broke; everything
        // below it inherits the break.
        let last = path.len().saturating_sub(1);
        for (i, id) in path.into_iter().enumerate() {
            let anchor = match &verdict {
                Anchor::Root => Anchor::Root,
                other if i == last => other.clone(),
                _ => Anchor::Orphaned,
            };
            status.insert(id, anchor);
        }
    }

    status
}

impl CriteriaRegistry {
    /// Builds the registry from raw rows. `scripts` validates the bindings
    /// of scripted requirement predicates.
    pub fn build(data: StaticDataSet, scripts: &dyn ScriptCheckPort) -> Self {
        let mut registry = Self::default();
        for (table, count) in &data.undecodable {
            registry.report.record_dropped(*table, *count);
        }

        registry.load_modifier_trees(data.modifier_trees);
        registry.load_criteria(data.criteria);
        registry.load_criteria_trees(data.criteria_trees);
        registry.load_achievements(data.achievements);
        registry.load_scenario_steps(data.scenario_steps);
        registry.load_quest_objectives(data.quest_objectives);
        registry.link_deliverables();
        registry.load_requirement_predicates(data.criteria_data, scripts);
        registry.build_indices();

        tracing::info!(
            criteria = registry.criteria.len(),
            criteria_trees = registry.trees.len(),
            modifier_trees = registry.modifiers.len(),
            achievements = registry.achievements.len(),
            scenario_steps = registry.scenario_steps.len(),
            quest_objectives = registry.quest_objectives.len(),
            dropped = registry.report.total_dropped(),
            "Criteria registry built"
        );
        registry
    }

    fn drop_row(&mut self, table: StaticTable, id: impl fmt::Display, reason: impl fmt::Display) {
        tracing::warn!(table = %table, id = %id, reason = %reason, "Dropping static row");
        self.report.record_dropped(table, 1);
    }

    // =========================================================================
    // Modifier trees
    // =========================================================================

    /// A tree with any invalid node is dropped whole, along with every
    /// criteria gated by it, so a bad row never loosens a gate.
    fn load_modifier_trees(&mut self, rows: Vec<ModifierTreeEntry>) {
        let table = StaticTable::ModifierTrees;
        let mut accepted = BTreeMap::new();
        let mut all_parents = BTreeMap::new();
        let mut invalid = Vec::new();

        for row in rows {
            all_parents.entry(row.id).or_insert(row.parent);
            if accepted.contains_key(&row.id) {
                self.drop_row(table, row.id, "duplicate id");
                invalid.push(row.id);
                continue;
            }
            match ModifierCondition::from_entry(&row) {
                Ok(condition) => {
                    accepted.insert(row.id, (row, condition));
                }
                Err(e) => {
                    self.drop_row(table, row.id, e);
                    invalid.push(row.id);
                }
            }
        }
        let tainted: HashSet<_> = invalid
            .into_iter()
            .map(|id| topmost(&all_parents, id))
            .collect();

        let parents = accepted
            .iter()
            .map(|(id, (row, _))| (*id, row.parent))
            .collect::<BTreeMap<_, _>>();
        let anchors = resolve_forest(&parents);

        for (id, (entry, condition)) in accepted {
            match anchors.get(&id) {
                Some(Anchor::Root) if tainted.contains(&topmost(&parents, id)) => {
                    let root = topmost(&parents, id);
                    self.drop_row(table, id, format!("modifier tree {} has an invalid node", root));
                }
                Some(Anchor::Root) => {
                    let idx = ModifierIdx::from_usize(self.modifiers.len());
                    self.modifier_by_id.insert(id, idx);
                    self.modifiers.push(ModifierNode {
                        entry,
                        condition,
                        children: Vec::new(),
                    });
                    self.report.record_loaded(table);
                }
                Some(anchor) => {
                    let reason = anchor.to_string();
                    self.drop_row(table, id, reason);
                }
                None => {}
            }
        }

        let links: Vec<(ModifierIdx, ModifierIdx)> = self
            .modifiers
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let parent = self.modifier_idx(node.entry.parent?)?;
                Some((parent, ModifierIdx::from_usize(i)))
            })
            .collect();
        for (parent, child) in links {
            self.modifiers[parent.get()].children.push(child);
        }
    }

    // =========================================================================
    // Criteria
    // =========================================================================

    fn load_criteria(&mut self, mut rows: Vec<CriteriaEntry>) {
        let table = StaticTable::Criteria;
        rows.sort_by_key(|row| row.id);

        for entry in rows {
            if self.criteria_by_id.contains_key(&entry.id) {
                self.drop_row(table, entry.id, "duplicate id");
                continue;
            }
            if let Err(e) = entry.validate() {
                self.drop_row(table, entry.id, e);
                continue;
            }
            let modifier = match entry.modifier_tree_id {
                None => None,
                Some(tree_id) => match self.modifier_idx(tree_id) {
                    Some(idx) => Some(idx),
                    None => {
                        let err = DomainError::invalid_reference(
                            "Criteria",
                            entry.id.to_string(),
                            format!("modifier tree {}", tree_id),
                        );
                        self.drop_row(table, entry.id, err);
                        continue;
                    }
                },
            };

            let idx = CriteriaIdx::from_usize(self.criteria.len());
            self.criteria_by_id.insert(entry.id, idx);
            self.criteria.push(Criteria {
                entry,
                modifier,
                owner_kinds: OwnerKinds::empty(),
                data: Vec::new(),
                trees: Vec::new(),
            });
            self.report.record_loaded(table);
        }
    }

    // =========================================================================
    // Criteria trees
    // =========================================================================

    fn load_criteria_trees(&mut self, rows: Vec<CriteriaTreeEntry>) {
        let table = StaticTable::CriteriaTrees;
        let mut accepted: BTreeMap<CriteriaTreeId, CriteriaTreeEntry> = BTreeMap::new();

        for row in rows {
            if accepted.contains_key(&row.id) {
                self.drop_row(table, row.id, "duplicate id");
                continue;
            }
            if let Some(criteria_id) = row.criteria_id {
                if self.criteria_idx(criteria_id).is_none() {
                    let err = DomainError::invalid_reference(
                        "CriteriaTree",
                        row.id.to_string(),
                        format!("criteria {}", criteria_id),
                    );
                    self.drop_row(table, row.id, err);
                    continue;
                }
            }
            accepted.insert(row.id, row);
        }

        let parents = accepted
            .iter()
            .map(|(id, row)| (*id, row.parent))
            .collect::<BTreeMap<_, _>>();
        let anchors = resolve_forest(&parents);

        for (id, entry) in accepted {
            match anchors.get(&id) {
                Some(Anchor::Root) => {
                    let idx = TreeIdx::from_usize(self.trees.len());
                    let criteria = entry.criteria_id.and_then(|c| self.criteria_idx(c));
                    self.tree_by_id.insert(id, idx);
                    self.trees.push(CriteriaTreeNode {
                        entry,
                        criteria,
                        parent: None,
                        children: Vec::new(),
                        root: idx,
                        deliverable: None,
                        owner_kinds: OwnerKinds::empty(),
                    });
                    self.report.record_loaded(table);
                }
                Some(anchor) => {
                    let reason = anchor.to_string();
                    self.drop_row(table, id, reason);
                }
                None => {}
            }
        }

        let links: Vec<(TreeIdx, TreeIdx)> = self
            .trees
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let parent = self.tree_idx(node.entry.parent?)?;
                Some((parent, TreeIdx::from_usize(i)))
            })
            .collect();
        for (parent, child) in links {
            self.trees[child.get()].parent = Some(parent);
            self.trees[parent.get()].children.push(child);
        }

        for i in 0..self.trees.len() {
            let mut children = std::mem::take(&mut self.trees[i].children);
            children.sort_by_key(|c| {
                let entry = &self.trees[c.get()].entry;
                (entry.order_index, entry.id)
            });
            self.trees[i].children = children;

            let idx = TreeIdx::from_usize(i);
            let root = self.ancestors(idx).last().unwrap_or(idx);
            self.trees[i].root = root;
        }
    }

    // =========================================================================
    // Deliverables
    // =========================================================================

    fn check_deliverable_tree(&self, tree: CriteriaTreeId) -> Result<(), String> {
        if self.tree_idx(tree).is_none() {
            return Err(format!("references missing criteria tree {}", tree));
        }
        if self.achievement_by_tree.contains_key(&tree)
            || self.step_by_tree.contains_key(&tree)
            || self.objective_by_tree.contains_key(&tree)
        {
            return Err(format!("criteria tree {} already delivers something else", tree));
        }
        Ok(())
    }

    fn load_achievements(&mut self, mut rows: Vec<AchievementEntry>) {
        let table = StaticTable::Achievements;
        rows.sort_by_key(|row| row.id);

        for row in rows {
            if self.achievements.contains_key(&row.id) {
                self.drop_row(table, row.id, "duplicate id");
                continue;
            }
            if let Err(reason) = self.check_deliverable_tree(row.criteria_tree_id) {
                self.drop_row(table, row.id, reason);
                continue;
            }
            self.achievement_by_tree.insert(row.criteria_tree_id, row.id);
            self.achievements.insert(row.id, row);
            self.report.record_loaded(table);
        }

        // Prerequisites are soft: a missing one is logged but not enforced.
        for achievement in self.achievements.values() {
            if let Some(required) = achievement.required_achievement {
                if !self.achievements.contains_key(&required) {
                    tracing::warn!(
                        achievement_id = %achievement.id,
                        required = %required,
                        "Achievement requires an unknown achievement"
                    );
                }
            }
        }
    }

    fn load_scenario_steps(&mut self, mut rows: Vec<ScenarioStepEntry>) {
        let table = StaticTable::ScenarioSteps;
        rows.sort_by_key(|row| row.id);

        for row in rows {
            if self.scenario_steps.contains_key(&row.id) {
                self.drop_row(table, row.id, "duplicate id");
                continue;
            }
            if let Err(reason) = self.check_deliverable_tree(row.criteria_tree_id) {
                self.drop_row(table, row.id, reason);
                continue;
            }
            self.step_by_tree.insert(row.criteria_tree_id, row.id);
            self.steps_by_scenario
                .entry(row.scenario_id)
                .or_default()
                .push(row.id);
            self.scenario_steps.insert(row.id, row);
            self.report.record_loaded(table);
        }

        let steps = &self.scenario_steps;
        for ordered in self.steps_by_scenario.values_mut() {
            ordered.sort_by_key(|id| steps.get(id).map(|s| (s.order_index, s.id)));
        }
    }

    fn load_quest_objectives(&mut self, mut rows: Vec<QuestObjectiveEntry>) {
        let table = StaticTable::QuestObjectives;
        rows.sort_by_key(|row| row.id);

        for row in rows {
            if self.quest_objectives.contains_key(&row.id) {
                self.drop_row(table, row.id, "duplicate id");
                continue;
            }
            if let Err(reason) = self.check_deliverable_tree(row.criteria_tree_id) {
                self.drop_row(table, row.id, reason);
                continue;
            }
            self.objective_by_tree.insert(row.criteria_tree_id, row.id);
            self.objectives_by_quest
                .entry(row.quest_id)
                .or_default()
                .push(row.id);
            self.quest_objectives.insert(row.id, row);
            self.report.record_loaded(table);
        }
    }

    /// Marks every node under a deliverable's tree with that deliverable and
    /// its owner kind, then derives criteria owner kinds from the nodes that
    /// reference them.
    fn link_deliverables(&mut self) {
        let mut roots: Vec<(CriteriaTreeId, Deliverable, OwnerKind)> = Vec::new();
        roots.extend(self.achievements.values().map(|a| {
            (a.criteria_tree_id, Deliverable::Achievement(a.id), a.owner_kind())
        }));
        roots.extend(self.scenario_steps.values().map(|s| {
            (s.criteria_tree_id, Deliverable::ScenarioStep(s.id), OwnerKind::Scenario)
        }));
        roots.extend(self.quest_objectives.values().map(|o| {
            (o.criteria_tree_id, Deliverable::QuestObjective(o.id), OwnerKind::QuestObjective)
        }));
        roots.sort_by_key(|(tree, _, _)| *tree);

        for (tree_id, deliverable, kind) in roots {
            let Some(tree) = self.tree_idx(tree_id) else {
                continue;
            };
            for idx in self.subtree(tree) {
                let node = &mut self.trees[idx.get()];
                node.deliverable.get_or_insert(deliverable);
                node.owner_kinds |= kind.flag();
            }
        }

        for i in 0..self.trees.len() {
            let (criteria, kinds) = (self.trees[i].criteria, self.trees[i].owner_kinds);
            if let Some(criteria) = criteria {
                let entry = &mut self.criteria[criteria.get()];
                entry.owner_kinds |= kinds;
                entry.trees.push(TreeIdx::from_usize(i));
            }
        }

        for criteria in &self.criteria {
            if criteria.owner_kinds.is_empty() {
                tracing::debug!(
                    criteria_id = %criteria.id(),
                    "Criteria is not part of any deliverable and will never be tracked"
                );
            }
        }
    }

    // =========================================================================
    // Requirement predicates
    // =========================================================================

    fn load_requirement_predicates(
        &mut self,
        rows: Vec<CriteriaDataRow>,
        scripts: &dyn ScriptCheckPort,
    ) {
        let table = StaticTable::CriteriaData;

        for row in rows {
            let Some(idx) = self.criteria_idx(row.criteria_id) else {
                let err = DomainError::invalid_reference(
                    "CriteriaData",
                    format!("{:?}", row.data_type),
                    format!("criteria {}", row.criteria_id),
                );
                self.drop_row(table, row.criteria_id, err);
                continue;
            };

            let criteria_type = self.criteria(idx).entry.criteria_type;
            let data = match CriteriaData::from_row(&row, criteria_type) {
                Ok(data) => data,
                Err(e) => {
                    self.drop_row(table, row.criteria_id, e);
                    continue;
                }
            };
            if let Some(name) = data.script_name() {
                if !scripts.is_bound(name) {
                    let reason = format!("script '{}' is not bound", name);
                    self.drop_row(table, row.criteria_id, reason);
                    continue;
                }
            }

            self.criteria[idx.get()].data.push(data);
            self.report.record_loaded(table);
        }
    }

    // =========================================================================
    // Indices
    // =========================================================================

    fn build_indices(&mut self) {
        const TYPE_INDEXED: [OwnerKind; 4] = [
            OwnerKind::Player,
            OwnerKind::Account,
            OwnerKind::Guild,
            OwnerKind::QuestObjective,
        ];

        for (i, criteria) in self.criteria.iter().enumerate() {
            let idx = CriteriaIdx::from_usize(i);
            let entry = &criteria.entry;
            if criteria.owner_kinds.is_empty() {
                continue;
            }

            if let (Some(event), true) = (entry.start_event, entry.is_timed()) {
                self.by_start_event
                    .entry((event, entry.start_asset))
                    .or_default()
                    .push(idx);
            }
            if let Some(event) = entry.fail_event {
                self.by_fail_event
                    .entry((event, entry.fail_asset))
                    .or_default()
                    .push(idx);
            }

            for kind in TYPE_INDEXED {
                if !criteria.owner_kinds.contains(kind.flag()) {
                    continue;
                }
                self.by_type
                    .entry((kind, entry.criteria_type))
                    .or_default()
                    .push(idx);
                let asset_bucketed = matches!(kind, OwnerKind::Player | OwnerKind::Account);
                if asset_bucketed && entry.criteria_type.is_stored_by_asset() {
                    self.by_asset
                        .entry((kind, entry.criteria_type, entry.asset))
                        .or_default()
                        .push(idx);
                }
            }

            if criteria.owner_kinds.contains(OwnerKinds::SCENARIO) {
                for tree in &criteria.trees {
                    let Some(Deliverable::ScenarioStep(step)) = self.trees[tree.get()].deliverable
                    else {
                        continue;
                    };
                    let Some(step) = self.scenario_steps.get(&step) else {
                        continue;
                    };
                    let list = self
                        .scenario_by_type
                        .entry((step.scenario_id, entry.criteria_type))
                        .or_default();
                    if !list.contains(&idx) {
                        list.push(idx);
                    }
                }
            }
        }
    }
}
