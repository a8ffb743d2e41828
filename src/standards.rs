//! Engineered standards
//!
//! Turns a task plus its first-occurrence flags into the seven standard-second
//! buckets. Card selection goes through the prebuilt `FlowCardTable`; every
//! configuration miss is recorded as an `EngineWarning` so a missing card can
//! be told apart from a card that correctly evaluates to zero.

use std::collections::{BTreeSet, HashMap};

use crate::cards::{CardLookup, FlowCardTable, FlowClass, JobOverheadSource, Multipliers, ResolvedCard};
use crate::config::EngineConfig;
use crate::types::{EngineWarning, OccurrenceFlags, StandardSeconds, TaskObject, TaskRole};

/// Result of evaluating one task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub flow_class: Option<FlowClass>,
    pub standards: StandardSeconds,
    /// Set when the task's own role fired its job overhead
    pub job_overhead_source: Option<JobOverheadSource>,
}

/// Whether any Put-Wall task in the run is an explicit sort or pack row.
///
/// This is a whole-run precondition: when it is false, every Put-Wall picking
/// task in the run absorbs the sorting and packing phases.
pub fn has_explicit_putwall_downstream(tasks: &[TaskObject], config: &EngineConfig) -> bool {
    tasks.iter().filter(|t| !t.is_synthetic()).any(|t| {
        matches!(t.role, Some(TaskRole::Sorting) | Some(TaskRole::Packing))
            && FlowClass::from_acronym(config.flow_class_acronym(&t.record.job_type))
                == Some(FlowClass::PutWall)
    })
}

/// Per-run standards calculator
pub struct StandardsCalculator<'a> {
    table: &'a FlowCardTable,
    config: &'a EngineConfig,
    putwall_absorbs_downstream: bool,
    flow_classes: HashMap<String, FlowClass>,
    warnings: BTreeSet<EngineWarning>,
}

impl<'a> StandardsCalculator<'a> {
    /// Create a calculator for one run over `tasks`
    pub fn new(table: &'a FlowCardTable, config: &'a EngineConfig, tasks: &[TaskObject]) -> Self {
        let putwall_absorbs_downstream = !has_explicit_putwall_downstream(tasks, config);
        tracing::debug!(putwall_absorbs_downstream, "standards calculator ready");

        Self {
            table,
            config,
            putwall_absorbs_downstream,
            flow_classes: HashMap::new(),
            warnings: BTreeSet::new(),
        }
    }

    pub fn putwall_absorbs_downstream(&self) -> bool {
        self.putwall_absorbs_downstream
    }

    /// Resolve a JobType to its flow class, falling back to Generic
    pub fn resolve_flow_class(&mut self, job_type: &str) -> FlowClass {
        let job_type = job_type.trim();
        if let Some(flow_class) = self.flow_classes.get(job_type) {
            return *flow_class;
        }

        let config: &'a EngineConfig = self.config;
        let acronym = config.flow_class_acronym(job_type);
        let flow_class = match FlowClass::from_acronym(acronym) {
            Some(flow_class) => flow_class,
            None => {
                let warning = EngineWarning::UnknownFlowClass {
                    job_type: job_type.to_string(),
                    acronym: acronym.to_string(),
                };
                self.warn(warning);
                FlowClass::Generic
            }
        };

        self.flow_classes.insert(job_type.to_string(), flow_class);
        flow_class
    }

    /// Evaluate the standards for one task
    pub fn evaluate(&mut self, task: &TaskObject, flags: &OccurrenceFlags) -> Evaluation {
        if task.is_synthetic() {
            return Evaluation::default();
        }

        let flow_class = self.resolve_flow_class(&task.record.job_type);
        let mut evaluation = Evaluation {
            flow_class: Some(flow_class),
            ..Default::default()
        };

        let Some(role) = task.role else {
            return evaluation;
        };

        let multipliers = multipliers(task, flags, role);
        if let Some(card) = self.card(flow_class, role) {
            let source = self.apply_card(&mut evaluation.standards, role, card, flags, &multipliers);
            evaluation.job_overhead_source = source;
        }

        if flow_class == FlowClass::PutWall
            && role == TaskRole::Picking
            && self.putwall_absorbs_downstream
        {
            for downstream in [TaskRole::Sorting, TaskRole::Packing] {
                if let Some(card) = self.card(flow_class, downstream) {
                    self.apply_card(&mut evaluation.standards, downstream, card, flags, &multipliers);
                }
            }
        }

        evaluation
    }

    /// Warnings raised so far, in deterministic order
    pub fn into_warnings(self) -> Vec<EngineWarning> {
        self.warnings.into_iter().collect()
    }

    fn card(&mut self, flow_class: FlowClass, role: TaskRole) -> Option<&'a ResolvedCard> {
        let table: &'a FlowCardTable = self.table;
        match table.lookup(flow_class, role) {
            CardLookup::Found(card) => Some(card),
            CardLookup::GenericFallback {
                missing_card_id,
                card,
            } => {
                self.warn(EngineWarning::GenericCardFallback {
                    flow_class,
                    role,
                    card_id: missing_card_id.clone(),
                });
                Some(card)
            }
            CardLookup::Missing { card_id } => {
                self.warn(EngineWarning::CardNotFound {
                    card_id: card_id.clone(),
                    role,
                });
                None
            }
        }
    }

    /// Add one card's contribution to `standards` under `role`.
    ///
    /// Job overhead fires on the first task of the evaluated task's role in
    /// the job; returns the overhead source when it fired.
    fn apply_card(
        &mut self,
        standards: &mut StandardSeconds,
        role: TaskRole,
        card: &ResolvedCard,
        flags: &OccurrenceFlags,
        multipliers: &Multipliers,
    ) -> Option<JobOverheadSource> {
        let init = if flags.is_first_role_task_in_job {
            if card.job_overhead_source == JobOverheadSource::NotFound {
                self.warn(EngineWarning::JobOverheadMissing {
                    card_id: card.card_id.clone(),
                    role,
                });
            }
            card.job_overhead
        } else {
            0.0
        };

        let process = card.process.evaluate(multipliers);
        let travel = card.travel.evaluate(multipliers);
        standards.add(role, init, process, travel);

        flags
            .is_first_role_task_in_job
            .then_some(card.job_overhead_source)
    }

    fn warn(&mut self, warning: EngineWarning) {
        if self.warnings.contains(&warning) {
            return;
        }
        tracing::warn!(?warning, "standards configuration miss");
        self.warnings.insert(warning);
    }
}

/// Bucket multipliers for `task` evaluated under `role`
fn multipliers(task: &TaskObject, flags: &OccurrenceFlags, role: TaskRole) -> Multipliers {
    let one = |b: bool| if b { 1.0 } else { 0.0 };
    let first_in_order = match role {
        TaskRole::Packing => flags.is_first_packing_task_in_order,
        _ => flags.is_first_task_in_order,
    };

    Multipliers {
        activity_overhead: one(flags.is_first_in_task_type_run),
        visit: one(flags.is_new_visit),
        sku: one(flags.is_new_sku),
        line: 1.0,
        order: one(first_in_order),
        units: task.record.units(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Bucket, CalculationCard, CardRegistry, MicroActivity};
    use crate::types::ShiftRecord;
    use chrono::{Duration, TimeZone, Utc};

    fn activity(name: &str, bucket: &str, seconds: f64) -> MicroActivity {
        MicroActivity {
            name: name.to_string(),
            bucket: Bucket::from(bucket.to_string()),
            default_sec: seconds,
            target_sec: None,
        }
    }

    fn registry(cards: Vec<(&str, Vec<MicroActivity>)>) -> CardRegistry {
        let mut registry = CardRegistry::new();
        for (id, activities) in cards {
            registry.insert(CalculationCard {
                id: id.to_string(),
                name: id.to_string(),
                activities,
            });
        }
        registry
    }

    fn task(job_type: &str, task_type: &str, quantity: f64) -> TaskObject {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let record = ShiftRecord {
            user: "u1".to_string(),
            client: String::new(),
            warehouse: String::new(),
            wave_code: String::new(),
            job_code: "J1".to_string(),
            job_type: job_type.to_string(),
            order_code: "O1".to_string(),
            task_type: task_type.to_string(),
            sku: "S1".to_string(),
            quantity,
            zone: String::new(),
            location: "A-01".to_string(),
            start,
            finish: start + Duration::seconds(30),
        };
        TaskObject::from_record(record, 1, 0.3)
    }

    fn all_first() -> OccurrenceFlags {
        OccurrenceFlags {
            is_first_task_in_job: true,
            is_first_role_task_in_job: true,
            is_first_in_task_type_run: true,
            is_new_visit: true,
            is_new_sku: true,
            is_first_task_in_order: true,
            is_first_packing_task_in_order: true,
        }
    }

    #[test]
    fn test_bucket_multipliers() {
        let registry = registry(vec![(
            "picking_standard",
            vec![
                activity("Setup", "Job Overhead", 100.0),
                activity("Switch task", "Activity Overhead", 7.0),
                activity("Walk", "Location Based", 10.0),
                activity("Verify SKU", "SKU Base", 5.0),
                activity("Scan", "Line Based", 3.0),
                activity("Order label", "Order Base", 11.0),
                activity("Pick unit", "Unit Variable", 2.0),
                activity("Aisle travel", "Travel", 13.0),
            ],
        )]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let t = task("STANDARD", "Pick", 4.0);
        let mut calc = StandardsCalculator::new(&table, &config, std::slice::from_ref(&t));

        let first = calc.evaluate(&t, &all_first());
        assert_eq!(first.standards.picking_init, 100.0);
        assert_eq!(first.standards.picking_process, 7.0 + 10.0 + 5.0 + 3.0 + 11.0 + 8.0);
        assert_eq!(first.standards.picking_travel, 13.0 * 4.0);
        assert_eq!(first.job_overhead_source, Some(JobOverheadSource::CardBucket));

        let repeat = calc.evaluate(&t, &OccurrenceFlags::default());
        assert_eq!(repeat.standards.picking_init, 0.0);
        assert_eq!(repeat.standards.picking_process, 3.0 + 8.0);
        assert_eq!(repeat.standards.picking_travel, 13.0 * 4.0);
        assert_eq!(repeat.job_overhead_source, None);
        assert!(calc.into_warnings().is_empty());
    }

    #[test]
    fn test_zero_quantity_unit_variable() {
        let registry = registry(vec![(
            "packing_obpp",
            vec![
                activity("Setup", "Job Overhead", 0.0),
                activity("Pack unit", "Unit Variable", 1_000_000.0),
                activity("Mystery", "Something Else", 50.0),
            ],
        )]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let t = task("OBPP", "Pack", 0.0);
        let mut calc = StandardsCalculator::new(&table, &config, std::slice::from_ref(&t));

        let evaluation = calc.evaluate(&t, &all_first());
        assert_eq!(evaluation.standards.packing_process, 0.0);
        assert_eq!(evaluation.standards.total(), 0.0);
    }

    #[test]
    fn test_missing_card_is_reported() {
        let registry = registry(vec![]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let t = task("MICP", "Pick", 1.0);
        let mut calc = StandardsCalculator::new(&table, &config, std::slice::from_ref(&t));

        let evaluation = calc.evaluate(&t, &all_first());
        assert_eq!(evaluation.standards.total(), 0.0);
        assert_eq!(
            calc.into_warnings(),
            vec![EngineWarning::CardNotFound {
                card_id: "picking_micp".to_string(),
                role: TaskRole::Picking,
            }]
        );
    }

    #[test]
    fn test_unknown_flow_class_uses_generic_card() {
        let registry = registry(vec![(
            "picking_duration",
            vec![activity("Scan", "Line Based", 9.0)],
        )]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let t = task("Mystery Flow", "Pick", 1.0);
        let mut calc = StandardsCalculator::new(&table, &config, std::slice::from_ref(&t));

        let evaluation = calc.evaluate(&t, &all_first());
        assert_eq!(evaluation.flow_class, Some(FlowClass::Generic));
        assert_eq!(evaluation.standards.picking_process, 9.0);

        let warnings = calc.into_warnings();
        assert!(warnings.contains(&EngineWarning::UnknownFlowClass {
            job_type: "Mystery Flow".to_string(),
            acronym: "Mystery Flow".to_string(),
        }));
        assert!(warnings.contains(&EngineWarning::JobOverheadMissing {
            card_id: "picking_duration".to_string(),
            role: TaskRole::Picking,
        }));
    }

    #[test]
    fn test_job_type_remapped_through_config() {
        let registry = registry(vec![(
            "picking_micp",
            vec![activity("Scan", "Line Based", 4.0)],
        )]);
        let table = FlowCardTable::build(&registry);
        let mut config = EngineConfig::default();
        config
            .job_type_map
            .insert("Cart Pick".to_string(), "MICP".to_string());
        let t = task("Cart Pick", "Pick", 1.0);
        let mut calc = StandardsCalculator::new(&table, &config, std::slice::from_ref(&t));

        let evaluation = calc.evaluate(&t, &OccurrenceFlags::default());
        assert_eq!(evaluation.flow_class, Some(FlowClass::Micp));
        assert_eq!(evaluation.standards.picking_process, 4.0);
    }

    #[test]
    fn test_putwall_picking_absorbs_downstream() {
        let registry = registry(vec![
            ("picking_putwall", vec![activity("Scan", "Line Based", 4.0)]),
            (
                "sorting_putwall",
                vec![
                    activity("Wall setup", "Job Overhead", 60.0),
                    activity("Put to slot", "Unit Variable", 3.0),
                ],
            ),
            (
                "packing_putwall",
                vec![
                    activity("Station setup", "Job Overhead", 40.0),
                    activity("Close order", "Order Base", 20.0),
                ],
            ),
        ]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let pick = task("Put-Wall", "Pick", 2.0);
        let mut calc = StandardsCalculator::new(&table, &config, std::slice::from_ref(&pick));
        assert!(calc.putwall_absorbs_downstream());

        let evaluation = calc.evaluate(&pick, &all_first());
        let s = evaluation.standards;
        assert_eq!(s.picking_process, 4.0);
        assert_eq!(s.sorting_init, 60.0);
        assert_eq!(s.sorting_process, 6.0);
        assert_eq!(s.packing_init, 40.0);
        assert_eq!(s.packing_process, 20.0);
    }

    #[test]
    fn test_explicit_putwall_sort_disables_absorption() {
        let registry = registry(vec![
            ("picking_putwall", vec![activity("Scan", "Line Based", 4.0)]),
            ("sorting_putwall", vec![activity("Put to slot", "Unit Variable", 3.0)]),
        ]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let pick = task("Put-Wall", "Pick", 2.0);
        let sort = task("PUTWALL", "Sort", 2.0);
        let tasks = vec![pick.clone(), sort];
        let mut calc = StandardsCalculator::new(&table, &config, &tasks);
        assert!(!calc.putwall_absorbs_downstream());

        let evaluation = calc.evaluate(&pick, &all_first());
        assert_eq!(evaluation.standards.sorting_process, 0.0);
        assert_eq!(evaluation.standards.picking_process, 4.0);
    }

    #[test]
    fn test_putwall_named_pick_row_still_absorbs() {
        let registry = registry(vec![
            ("picking_putwall", vec![activity("Scan", "Line Based", 4.0)]),
            ("sorting_putwall", vec![activity("Put to slot", "Unit Variable", 3.0)]),
        ]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let pick = task("Put-Wall", "Putwall Pick", 3.0);
        assert_eq!(pick.role, Some(TaskRole::Picking));

        let mut calc = StandardsCalculator::new(&table, &config, std::slice::from_ref(&pick));
        assert!(calc.putwall_absorbs_downstream());

        let evaluation = calc.evaluate(&pick, &OccurrenceFlags::default());
        assert_eq!(evaluation.standards.picking_process, 4.0);
        assert_eq!(evaluation.standards.sorting_process, 9.0);
    }

    #[test]
    fn test_synthetic_task_has_no_standards() {
        let registry = registry(vec![]);
        let table = FlowCardTable::build(&registry);
        let config = EngineConfig::default();
        let t = task("MICP", "Pick", 1.0);
        let gap = TaskObject::gap(&t.record, crate::types::TaskKind::Break, t.record.start, t.record.finish);
        let mut calc = StandardsCalculator::new(&table, &config, &[]);

        assert_eq!(calc.evaluate(&gap, &all_first()), Evaluation::default());
        assert!(calc.into_warnings().is_empty());
    }
}
