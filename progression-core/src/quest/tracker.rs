//! Quest tracker: a character's quest log.
//!
//! Objectives complete either manually ([`QuestTracker::complete_objective`])
//! or through the predicate sweep ([`QuestTracker::complete_objectives_by_predicates`]),
//! which the host runs once per logic tick after every other tracker has
//! settled. Finishing the last objective of a quest dispatches its rewards:
//! inventory first, dropped into the world when the inventory is full.
//!
//! Lookups by quest are asymmetric. [`QuestTracker::has_quest`] and the
//! `HasQuest` predicate tolerate unknown quests; [`QuestTracker::complete_objective`]
//! and the `CompletedQuest` predicate return [`ProgressionError::UnknownQuest`].
//! Quests are only ever added from the catalog. Callers that are not
//! sure a quest was given must check first.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::collaborators::{InventorySink, ItemDropper};
use crate::error::{ProgressionError, Result};
use crate::events::{Notifier, QuestEvent, Subscription};
use crate::predicate::{self, EvaluatorChain, PredicateEvaluator};
use crate::quest::{Quest, QuestCatalog, QuestStatus};
use crate::save::{self, Saveable};

/// Persisted form of one [`QuestStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRecordSnapshot {
    /// Quest name.
    pub quest: String,
    /// Completed objective references.
    #[serde(default)]
    pub completed_objectives: Vec<String>,
}

/// All quest progress of one character.
pub struct QuestTracker {
    catalog: Arc<QuestCatalog>,
    inventory: Arc<dyn InventorySink>,
    dropper: Arc<dyn ItemDropper>,
    statuses: Vec<QuestStatus>,
    notifier: Notifier<QuestEvent>,
}

impl std::fmt::Debug for QuestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestTracker")
            .field("statuses", &self.statuses)
            .finish_non_exhaustive()
    }
}

impl QuestTracker {
    /// Create an empty quest log.
    ///
    /// `catalog` resolves quest names for snapshots and name-based predicates.
    #[must_use]
    pub fn new(
        catalog: Arc<QuestCatalog>,
        inventory: Arc<dyn InventorySink>,
        dropper: Arc<dyn ItemDropper>,
    ) -> Self {
        Self {
            catalog,
            inventory,
            dropper,
            statuses: Vec::new(),
            notifier: Notifier::new(),
        }
    }

    /// Start tracking `quest`. No-op if it is already tracked.
    ///
    /// The catalog definition with the same name is the one tracked, so the
    /// log only ever holds quests a snapshot can restore.
    ///
    /// # Errors
    /// Returns [`ProgressionError::UnknownQuest`] if the catalog has no quest
    /// called `quest.name`.
    pub fn add_quest(&mut self, quest: &Quest) -> Result<()> {
        self.add_quest_by_name(&quest.name)
    }

    /// Start tracking the catalog quest called `name`.
    ///
    /// # Errors
    /// Returns [`ProgressionError::UnknownQuest`] if the catalog has no such quest.
    pub fn add_quest_by_name(&mut self, name: &str) -> Result<()> {
        let quest = self
            .catalog
            .get_by_name(name)
            .ok_or_else(|| ProgressionError::UnknownQuest(name.to_string()))?;
        if self.has_quest(&quest.name) {
            return Ok(());
        }
        info!(quest = %quest.name, "Quest added");
        let name = quest.name.clone();
        self.statuses.push(QuestStatus::new(quest));
        self.notifier.emit(&QuestEvent::Added { quest: name });
        Ok(())
    }

    /// Mark `objective` of `quest` complete.
    ///
    /// The update notification fires on every successful call. Rewards are
    /// dispatched only on the call that completes the quest.
    ///
    /// # Errors
    /// - [`ProgressionError::UnknownQuest`] if `quest` is not tracked.
    /// - [`ProgressionError::UnknownObjective`] if the quest has no such objective.
    pub fn complete_objective(&mut self, quest: &str, objective: &str) -> Result<()> {
        let status = self
            .statuses
            .iter_mut()
            .find(|s| s.quest().name == quest)
            .ok_or_else(|| ProgressionError::UnknownQuest(quest.to_string()))?;

        let was_complete = status.is_complete();
        status.complete_objective(objective)?;
        let quest_complete = status.is_complete();
        let definition = Arc::clone(status.quest());
        debug!(quest, objective, quest_complete, "Objective completed");

        if quest_complete && !was_complete {
            info!(quest, "Quest completed");
            self.give_rewards(&definition);
        }

        self.notifier.emit(&QuestEvent::ObjectiveCompleted {
            quest: quest.to_string(),
            objective: objective.to_string(),
            quest_complete,
        });
        Ok(())
    }

    /// Whether `quest` is tracked.
    #[must_use]
    pub fn has_quest(&self, quest: &str) -> bool {
        self.status(quest).is_some()
    }

    /// Progress for `quest`, if tracked.
    #[must_use]
    pub fn status(&self, quest: &str) -> Option<&QuestStatus> {
        self.statuses.iter().find(|s| s.quest().name == quest)
    }

    /// Every tracked quest, in the order they were added.
    #[must_use]
    pub fn statuses(&self) -> &[QuestStatus] {
        &self.statuses
    }

    /// The catalog this tracker resolves names against.
    #[must_use]
    pub fn catalog(&self) -> &Arc<QuestCatalog> {
        &self.catalog
    }

    /// Complete every open objective whose condition now holds.
    ///
    /// Conditions are evaluated against `evaluators` followed by this tracker
    /// itself, first definite answer winning. Objectives without a condition
    /// are left alone. Returns the number of objectives completed.
    ///
    /// # Errors
    /// Stops at and returns the first evaluator error (for example a
    /// `CompletedQuest` predicate naming an untracked quest).
    pub fn complete_objectives_by_predicates(
        &mut self,
        evaluators: &[&dyn PredicateEvaluator],
    ) -> Result<usize> {
        let mut completed = 0;
        for index in 0..self.statuses.len() {
            if self.statuses[index].is_complete() {
                continue;
            }
            let quest = Arc::clone(self.statuses[index].quest());
            for objective in &quest.objectives {
                let Some(condition) = &objective.condition else {
                    continue;
                };
                if self.statuses[index].is_objective_complete(&objective.reference) {
                    continue;
                }
                let satisfied = {
                    let mut chain = EvaluatorChain::new();
                    for evaluator in evaluators {
                        chain.push(*evaluator);
                    }
                    chain.push(&*self);
                    condition.check(&chain)?
                };
                if satisfied {
                    self.complete_objective(&quest.name, &objective.reference)?;
                    completed += 1;
                }
            }
        }
        if completed > 0 {
            debug!(completed, "Predicate sweep completed objectives");
        }
        Ok(completed)
    }

    /// Listen for [`QuestEvent`]s.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&QuestEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    fn give_rewards(&self, quest: &Quest) {
        for reward in &quest.rewards {
            if self.inventory.add_to_first_empty_slot(&reward.item, reward.count) {
                debug!(quest = %quest.name, item = %reward.item, count = reward.count, "Reward added to inventory");
                continue;
            }
            warn!(quest = %quest.name, item = %reward.item, count = reward.count, "Inventory full, dropping reward");
            self.dropper.drop_item(&reward.item, reward.count);
            self.notifier.emit(&QuestEvent::RewardDropped {
                quest: quest.name.clone(),
                item: reward.item.clone(),
                count: reward.count,
            });
        }
    }
}

impl PredicateEvaluator for QuestTracker {
    /// Handles `HasQuest [name]` and `CompletedQuest [name]`.
    fn evaluate(&self, predicate: &str, parameters: &[String]) -> Result<Option<bool>> {
        match predicate {
            "HasQuest" => {
                let name = predicate::parameter(predicate, parameters, 0)?;
                Ok(Some(self.has_quest(name)))
            }
            "CompletedQuest" => {
                let name = predicate::parameter(predicate, parameters, 0)?;
                let status = self
                    .status(name)
                    .ok_or_else(|| ProgressionError::UnknownQuest(name.to_string()))?;
                Ok(Some(status.is_complete()))
            }
            _ => Ok(None),
        }
    }
}

impl Saveable for QuestTracker {
    const SAVE_KEY: &'static str = "quests";

    fn capture(&self) -> Value {
        let records: Vec<QuestRecordSnapshot> = self
            .statuses
            .iter()
            .map(|status| QuestRecordSnapshot {
                quest: status.quest().name.clone(),
                completed_objectives: status.completed_objectives().map(str::to_string).collect(),
            })
            .collect();
        save::to_value(&records)
    }

    /// Replaces the whole quest log. A snapshot that is not a well-formed
    /// record array is ignored. Records naming quests missing from the
    /// catalog, and repeated records, are skipped.
    fn restore(&mut self, state: &Value) -> Result<()> {
        let records: Vec<QuestRecordSnapshot> = match save::from_value(Self::SAVE_KEY, state) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed quest snapshot");
                return Ok(());
            }
        };

        let mut statuses: Vec<QuestStatus> = Vec::with_capacity(records.len());
        for record in records {
            let Some(quest) = self.catalog.get_by_name(&record.quest) else {
                warn!(quest = %record.quest, "Skipping snapshot record for unknown quest");
                continue;
            };
            if statuses.iter().any(|s| s.quest().name == quest.name) {
                warn!(quest = %record.quest, "Skipping duplicate quest record");
                continue;
            }
            statuses.push(QuestStatus::restored(quest, record.completed_objectives));
        }

        info!(quests = statuses.len(), "Quest log restored");
        self.statuses = statuses;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Condition, Predicate};
    use crate::quest::Objective;
    use crate::types::ItemId;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Bag {
        capacity: usize,
        items: Mutex<Vec<(ItemId, u32)>>,
    }

    impl InventorySink for Bag {
        fn add_to_first_empty_slot(&self, item: &ItemId, count: u32) -> bool {
            let mut items = self.items.lock();
            if items.len() >= self.capacity {
                return false;
            }
            items.push((item.clone(), count));
            true
        }
    }

    #[derive(Default)]
    struct Floor(Mutex<Vec<(ItemId, u32)>>);

    impl ItemDropper for Floor {
        fn drop_item(&self, item: &ItemId, count: u32) {
            self.0.lock().push((item.clone(), count));
        }
    }

    struct Switch(bool);

    impl PredicateEvaluator for Switch {
        fn evaluate(&self, predicate: &str, _parameters: &[String]) -> Result<Option<bool>> {
            Ok((predicate == "Switch").then_some(self.0))
        }
    }

    fn catalog() -> Arc<QuestCatalog> {
        Arc::new(
            QuestCatalog::from_definitions([
                Quest::new("Delivery")
                    .with_objective(Objective::new("pickup", "Pick up the parcel"))
                    .with_objective(Objective::new("dropoff", "Deliver it"))
                    .with_reward("gold", 50)
                    .with_reward("potion", 2),
                Quest::new("Lever").with_objective(
                    Objective::new("pull", "Pull the lever")
                        .completed_when(Condition::single(Predicate::new("Switch", Vec::<String>::new()))),
                ),
                Quest::new("Epilogue").with_objective(
                    Objective::new("after", "Finish the delivery").completed_when(Condition::single(
                        Predicate::new("CompletedQuest", ["Delivery"]),
                    )),
                ),
            ])
            .expect("catalog"),
        )
    }

    fn tracker(capacity: usize) -> (QuestTracker, Arc<Bag>, Arc<Floor>) {
        let bag = Arc::new(Bag {
            capacity,
            ..Bag::default()
        });
        let floor = Arc::new(Floor::default());
        let tracker = QuestTracker::new(catalog(), bag.clone(), floor.clone());
        (tracker, bag, floor)
    }

    fn catalog_quest(tracker: &QuestTracker, name: &str) -> Arc<Quest> {
        tracker.catalog().get_by_name(name).expect("catalog quest")
    }

    fn record(tracker: &QuestTracker) -> (Arc<Mutex<Vec<QuestEvent>>>, Subscription) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = tracker.subscribe(move |e| sink.lock().push(e.clone()));
        (events, sub)
    }

    #[test]
    fn add_is_idempotent() {
        let (mut quests, _, _) = tracker(10);
        let (events, _sub) = record(&quests);
        quests.add_quest_by_name("Delivery").expect("add");
        quests.add_quest_by_name("Delivery").expect("add again");
        assert_eq!(quests.statuses().len(), 1);
        assert_eq!(events.lock().len(), 1);
    }

    #[test]
    fn add_quest_tracks_catalog_definition() {
        let (mut quests, _, _) = tracker(10);
        let stray = Quest::new("Delivery").with_objective(Objective::new("other", "Not in the catalog"));
        quests.add_quest(&stray).expect("add");

        let status = quests.status("Delivery").expect("status");
        assert!(Arc::ptr_eq(status.quest(), &catalog_quest(&quests, "Delivery")));
        assert!(matches!(
            quests.complete_objective("Delivery", "other"),
            Err(ProgressionError::UnknownObjective { .. })
        ));

        quests.complete_objective("Delivery", "pickup").expect("pickup");
        let (mut restored, _, _) = tracker(10);
        restored.restore(&quests.capture()).expect("restore");
        assert_eq!(restored.statuses(), quests.statuses());
    }

    #[test]
    fn add_quest_outside_catalog_fails() {
        let mut quests = QuestTracker::new(
            Arc::new(QuestCatalog::default()),
            Arc::new(Bag::default()),
            Arc::new(Floor::default()),
        );
        let side = Quest::new("Side").with_objective(Objective::new("go", "Go"));
        assert!(matches!(
            quests.add_quest(&side),
            Err(ProgressionError::UnknownQuest(_))
        ));
        assert!(quests.statuses().is_empty());
    }

    #[test]
    fn add_unknown_name_fails() {
        let (mut quests, _, _) = tracker(10);
        assert!(matches!(
            quests.add_quest_by_name("Nope"),
            Err(ProgressionError::UnknownQuest(_))
        ));
    }

    #[test]
    fn rewards_dispatch_once_on_completion() {
        let (mut quests, bag, floor) = tracker(10);
        quests.add_quest_by_name("Delivery").expect("add");

        quests.complete_objective("Delivery", "pickup").expect("pickup");
        assert!(bag.items.lock().is_empty());

        quests.complete_objective("Delivery", "dropoff").expect("dropoff");
        quests.complete_objective("Delivery", "dropoff").expect("again");

        assert_eq!(
            *bag.items.lock(),
            vec![(ItemId::new("gold"), 50), (ItemId::new("potion"), 2)]
        );
        assert!(floor.0.lock().is_empty());
        assert!(quests.status("Delivery").expect("status").is_complete());
    }

    #[test]
    fn full_inventory_drops_rewards() {
        let (mut quests, bag, floor) = tracker(1);
        let (events, _sub) = record(&quests);
        quests.add_quest_by_name("Delivery").expect("add");
        quests.complete_objective("Delivery", "pickup").expect("pickup");
        quests.complete_objective("Delivery", "dropoff").expect("dropoff");

        assert_eq!(*bag.items.lock(), vec![(ItemId::new("gold"), 50)]);
        assert_eq!(*floor.0.lock(), vec![(ItemId::new("potion"), 2)]);
        assert!(events.lock().contains(&QuestEvent::RewardDropped {
            quest: "Delivery".to_string(),
            item: ItemId::new("potion"),
            count: 2,
        }));
    }

    #[test]
    fn update_fires_on_every_objective() {
        let (mut quests, _, _) = tracker(10);
        quests.add_quest_by_name("Delivery").expect("add");
        let (events, _sub) = record(&quests);
        quests.complete_objective("Delivery", "pickup").expect("pickup");
        quests.complete_objective("Delivery", "dropoff").expect("dropoff");
        assert_eq!(
            *events.lock(),
            vec![
                QuestEvent::ObjectiveCompleted {
                    quest: "Delivery".to_string(),
                    objective: "pickup".to_string(),
                    quest_complete: false,
                },
                QuestEvent::ObjectiveCompleted {
                    quest: "Delivery".to_string(),
                    objective: "dropoff".to_string(),
                    quest_complete: true,
                },
            ]
        );
    }

    #[test]
    fn completing_untracked_quest_fails_loudly() {
        let (mut quests, _, _) = tracker(10);
        assert!(matches!(
            quests.complete_objective("Delivery", "pickup"),
            Err(ProgressionError::UnknownQuest(_))
        ));
    }

    #[test]
    fn has_quest_vs_completed_quest_asymmetry() {
        let (quests, _, _) = tracker(10);
        let has = quests
            .evaluate("HasQuest", &["Delivery".to_string()])
            .expect("HasQuest tolerates unknown");
        assert_eq!(has, Some(false));
        assert!(matches!(
            quests.evaluate("CompletedQuest", &["Delivery".to_string()]),
            Err(ProgressionError::UnknownQuest(_))
        ));
        assert_eq!(quests.evaluate("MinimumTrait", &[]).expect("unhandled"), None);
    }

    #[test]
    fn sweep_completes_when_condition_holds() {
        let (mut quests, _, _) = tracker(10);
        quests.add_quest_by_name("Lever").expect("add");

        let off = Switch(false);
        assert_eq!(quests.complete_objectives_by_predicates(&[&off]).expect("sweep"), 0);
        assert!(!quests.status("Lever").expect("status").is_complete());

        let on = Switch(true);
        assert_eq!(quests.complete_objectives_by_predicates(&[&on]).expect("sweep"), 1);
        assert!(quests.status("Lever").expect("status").is_complete());
        assert_eq!(quests.complete_objectives_by_predicates(&[&on]).expect("sweep"), 0);
    }

    #[test]
    fn sweep_without_evaluator_for_predicate_leaves_objective_open() {
        let (mut quests, _, _) = tracker(10);
        quests.add_quest_by_name("Lever").expect("add");
        assert_eq!(quests.complete_objectives_by_predicates(&[]).expect("sweep"), 0);
    }

    #[test]
    fn sweep_uses_tracker_as_evaluator() {
        let (mut quests, _, _) = tracker(10);
        quests.add_quest_by_name("Delivery").expect("add");
        quests.add_quest_by_name("Epilogue").expect("add");

        assert_eq!(quests.complete_objectives_by_predicates(&[]).expect("sweep"), 0);
        quests.complete_objective("Delivery", "pickup").expect("pickup");
        quests.complete_objective("Delivery", "dropoff").expect("dropoff");
        assert_eq!(quests.complete_objectives_by_predicates(&[]).expect("sweep"), 1);
        assert!(quests.status("Epilogue").expect("status").is_complete());
    }

    #[test]
    fn sweep_surfaces_completed_quest_on_untracked_quest() {
        let (mut quests, _, _) = tracker(10);
        quests.add_quest_by_name("Epilogue").expect("add");
        assert!(matches!(
            quests.complete_objectives_by_predicates(&[]),
            Err(ProgressionError::UnknownQuest(_))
        ));
    }

    #[test]
    fn capture_restore_round_trip() {
        let (mut quests, _, _) = tracker(10);
        quests.add_quest_by_name("Delivery").expect("add");
        quests.add_quest_by_name("Lever").expect("add");
        quests.complete_objective("Delivery", "pickup").expect("pickup");

        let snapshot = quests.capture();
        assert_eq!(
            snapshot,
            serde_json::json!([
                { "quest": "Delivery", "completedObjectives": ["pickup"] },
                { "quest": "Lever", "completedObjectives": [] },
            ])
        );

        let (mut restored, _, _) = tracker(10);
        restored.add_quest_by_name("Epilogue").expect("add");
        restored.restore(&snapshot).expect("restore");

        assert_eq!(restored.statuses(), quests.statuses());
        assert!(!restored.has_quest("Epilogue"));
    }

    #[test]
    fn restore_does_not_redispatch_rewards() {
        let (mut restored, bag, _) = tracker(10);
        restored
            .restore(&serde_json::json!([
                { "quest": "Delivery", "completedObjectives": ["pickup", "dropoff"] }
            ]))
            .expect("restore");
        assert!(restored.status("Delivery").expect("status").is_complete());
        assert!(bag.items.lock().is_empty());
    }

    #[test]
    fn malformed_snapshot_leaves_state_untouched() {
        let (mut quests, _, _) = tracker(10);
        quests.add_quest_by_name("Delivery").expect("add");

        quests.restore(&serde_json::json!({ "quest": "Lever" })).expect("ignored");
        quests.restore(&serde_json::json!([{ "completedObjectives": [] }])).expect("ignored");

        assert_eq!(quests.statuses().len(), 1);
        assert!(quests.has_quest("Delivery"));
    }

    #[test]
    fn restore_skips_unknown_and_duplicate_records() {
        let (mut quests, _, _) = tracker(10);
        quests
            .restore(&serde_json::json!([
                { "quest": "Retired", "completedObjectives": ["x"] },
                { "quest": "Lever", "completedObjectives": [] },
                { "quest": "Lever", "completedObjectives": ["pull"] },
            ]))
            .expect("restore");
        assert_eq!(quests.statuses().len(), 1);
        assert!(!quests.status("Lever").expect("status").is_complete());
    }
}
