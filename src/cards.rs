//! Calculation cards and flow-class resolution
//!
//! A calculation card lists the micro activities that make up one role of one
//! flow class (e.g. `picking_micp`). Cards are owned by the configuration
//! layer; this module parses them, folds each card into per-bucket totals, and
//! builds the flow-class lookup table once per run so the per-task pass never
//! compares strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::EngineError;
use crate::types::TaskRole;

/// Id of the shared card holding role-specific job overhead variables
pub const JOB_INIT_CARD_ID: &str = "job_init";

/// Multiplier bucket of a micro activity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bucket {
    /// Once per job, on the first task of the role
    JobOverhead,
    /// Once per run of identical task types
    ActivityOverhead,
    /// Once per new location visit
    LocationBased,
    /// Once per new location + SKU pair
    SkuBase,
    /// Once per task line
    LineBased,
    /// Once per new order
    OrderBase,
    /// Per unit handled
    UnitVariable,
    /// Travel time; kept apart from process and costed per unit
    Travel,
    /// Unrecognized label; costed per unit
    Other(String),
}

impl From<String> for Bucket {
    fn from(label: String) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "job overhead" => Bucket::JobOverhead,
            "activity overhead" => Bucket::ActivityOverhead,
            "location based" | "location base" => Bucket::LocationBased,
            "sku base" | "sku based" => Bucket::SkuBase,
            "line based" | "line base" => Bucket::LineBased,
            "order base" | "order based" => Bucket::OrderBase,
            "unit variable" => Bucket::UnitVariable,
            s if s.contains("travel") => Bucket::Travel,
            _ => Bucket::Other(label),
        }
    }
}

impl From<Bucket> for String {
    fn from(bucket: Bucket) -> Self {
        bucket.as_str().to_string()
    }
}

impl Bucket {
    pub fn as_str(&self) -> &str {
        match self {
            Bucket::JobOverhead => "Job Overhead",
            Bucket::ActivityOverhead => "Activity Overhead",
            Bucket::LocationBased => "Location Based",
            Bucket::SkuBase => "SKU Base",
            Bucket::LineBased => "Line Based",
            Bucket::OrderBase => "Order Base",
            Bucket::UnitVariable => "Unit Variable",
            Bucket::Travel => "Travel",
            Bucket::Other(label) => label.as_str(),
        }
    }
}

/// One costed step on a calculation card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroActivity {
    pub name: String,
    pub bucket: Bucket,
    #[serde(default)]
    pub default_sec: f64,
    /// Overrides `default_sec` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sec: Option<f64>,
}

impl MicroActivity {
    /// Seconds this activity contributes per multiplier unit
    pub fn seconds(&self) -> f64 {
        let value = self.target_sec.unwrap_or(self.default_sec);
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    pub fn is_travel(&self) -> bool {
        self.bucket == Bucket::Travel || self.name.to_lowercase().contains("travel")
    }
}

/// An ordered list of micro activities for one flow class and role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationCard {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "micro_activities")]
    pub activities: Vec<MicroActivity>,
}

impl CalculationCard {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidCard("card id is empty".to_string()));
        }
        for activity in &self.activities {
            let seconds = activity.target_sec.unwrap_or(activity.default_sec);
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(EngineError::InvalidCard(format!(
                    "{}: activity '{}' has invalid seconds {}",
                    self.id, activity.name, seconds
                )));
            }
        }
        Ok(())
    }

    /// Sum of the card's explicit Job Overhead activities, if it has any
    pub fn job_overhead_total(&self) -> Option<f64> {
        let mut found = false;
        let mut total = 0.0;
        for activity in &self.activities {
            if activity.bucket == Bucket::JobOverhead {
                found = true;
                total += activity.seconds();
            }
        }
        found.then_some(total)
    }
}

/// Registry of calculation cards keyed by id
#[derive(Debug, Clone, Default)]
pub struct CardRegistry {
    cards: HashMap<String, CalculationCard>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryDocument {
    List(Vec<CalculationCard>),
    Map(HashMap<String, CalculationCard>),
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from a JSON array of cards or an object keyed by id
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let document: RegistryDocument = serde_json::from_str(json)
            .map_err(|e| EngineError::ParseError(format!("Failed to parse card registry: {}", e)))?;

        let cards = match document {
            RegistryDocument::List(cards) => cards,
            RegistryDocument::Map(map) => map
                .into_iter()
                .map(|(key, mut card)| {
                    if card.id.trim().is_empty() {
                        card.id = key;
                    }
                    card
                })
                .collect(),
        };

        let mut registry = Self::new();
        for card in cards {
            card.validate()?;
            registry.insert(card);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, card: CalculationCard) {
        self.cards.insert(card.id.trim().to_string(), card);
    }

    pub fn get(&self, id: &str) -> Option<&CalculationCard> {
        self.cards.get(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut cards: Vec<&CalculationCard> = self.cards.values().collect();
        cards.sort_by(|a, b| a.id.cmp(&b.id));
        serde_json::to_string(&cards)
    }
}

/// Named work-design pattern selecting which cards apply to a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlowClass {
    Standard,
    Mass,
    #[serde(rename = "Put-Wall")]
    PutWall,
    #[serde(rename = "IIBP")]
    Iibp,
    #[serde(rename = "IOBP")]
    Iobp,
    #[serde(rename = "SIBP")]
    Sibp,
    #[serde(rename = "MICP")]
    Micp,
    #[serde(rename = "SICP")]
    Sicp,
    #[serde(rename = "OBPP")]
    Obpp,
    /// Fallback for unrecognized job types
    Generic,
}

impl FlowClass {
    pub const ALL: [FlowClass; 10] = [
        FlowClass::Standard,
        FlowClass::Mass,
        FlowClass::PutWall,
        FlowClass::Iibp,
        FlowClass::Iobp,
        FlowClass::Sibp,
        FlowClass::Micp,
        FlowClass::Sicp,
        FlowClass::Obpp,
        FlowClass::Generic,
    ];

    /// Parse a flow-class acronym, ignoring case, spaces, dashes and underscores
    pub fn from_acronym(acronym: &str) -> Option<FlowClass> {
        let key: String = acronym
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_uppercase();

        match key.as_str() {
            "STANDARD" | "STD" => Some(FlowClass::Standard),
            "MASS" => Some(FlowClass::Mass),
            "PUTWALL" | "PW" => Some(FlowClass::PutWall),
            "IIBP" => Some(FlowClass::Iibp),
            "IOBP" => Some(FlowClass::Iobp),
            "SIBP" => Some(FlowClass::Sibp),
            "MICP" => Some(FlowClass::Micp),
            "SICP" => Some(FlowClass::Sicp),
            "OBPP" => Some(FlowClass::Obpp),
            _ => None,
        }
    }

    fn card_suffix(&self) -> &'static str {
        match self {
            FlowClass::Standard => "standard",
            FlowClass::Mass => "mass",
            FlowClass::PutWall => "putwall",
            FlowClass::Iibp => "iibp",
            FlowClass::Iobp => "iobp",
            FlowClass::Sibp => "sibp",
            FlowClass::Micp => "micp",
            FlowClass::Sicp => "sicp",
            FlowClass::Obpp => "obpp",
            FlowClass::Generic => "duration",
        }
    }

    /// Card id for this flow class and role, e.g. `picking_micp`
    pub fn card_id(&self, role: TaskRole) -> String {
        format!("{}_{}", role.as_str(), self.card_suffix())
    }
}

/// Which strategy supplied a card's job overhead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOverheadSource {
    /// Explicit Job Overhead activities on the card itself
    CardBucket,
    /// Role-specific variable on the shared `job_init` card
    SharedJobInit,
    /// Neither strategy matched; overhead is zero
    NotFound,
}

/// Lookup strategies in priority order
const JOB_OVERHEAD_STRATEGIES: [JobOverheadSource; 2] =
    [JobOverheadSource::CardBucket, JobOverheadSource::SharedJobInit];

/// Resolve a card's job overhead through the ordered strategy list
pub fn resolve_job_overhead(
    card: &CalculationCard,
    role: TaskRole,
    job_init: Option<&CalculationCard>,
) -> (f64, JobOverheadSource) {
    for strategy in JOB_OVERHEAD_STRATEGIES {
        let found = match strategy {
            JobOverheadSource::CardBucket => card.job_overhead_total(),
            JobOverheadSource::SharedJobInit => job_init.and_then(|c| shared_job_init(c, role)),
            JobOverheadSource::NotFound => None,
        };
        if let Some(seconds) = found {
            return (seconds, strategy);
        }
    }
    (0.0, JobOverheadSource::NotFound)
}

/// First activity on the shared card whose name mentions the role
fn shared_job_init(card: &CalculationCard, role: TaskRole) -> Option<f64> {
    let keyword = match role {
        TaskRole::Picking => "pick",
        TaskRole::Sorting => "sort",
        TaskRole::Packing => "pack",
    };
    card.activities
        .iter()
        .find(|a| a.name.to_lowercase().contains(keyword))
        .map(|a| a.seconds())
}

/// Multipliers for one task, one per bucket kind
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Multipliers {
    pub activity_overhead: f64,
    pub visit: f64,
    pub sku: f64,
    pub line: f64,
    pub order: f64,
    pub units: f64,
}

/// Per-bucket seconds of a card, pre-summed so evaluation is a dot product
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BucketSums {
    pub activity_overhead: f64,
    pub per_visit: f64,
    pub per_sku: f64,
    pub per_line: f64,
    pub per_order: f64,
    pub per_unit: f64,
}

impl BucketSums {
    fn add(&mut self, bucket: &Bucket, seconds: f64) {
        match bucket {
            // Folded into the card's job overhead instead
            Bucket::JobOverhead => {}
            Bucket::ActivityOverhead => self.activity_overhead += seconds,
            Bucket::LocationBased => self.per_visit += seconds,
            Bucket::SkuBase => self.per_sku += seconds,
            Bucket::LineBased => self.per_line += seconds,
            Bucket::OrderBase => self.per_order += seconds,
            // A bare travel tag only routes the seconds; it scales with quantity
            Bucket::UnitVariable | Bucket::Travel | Bucket::Other(_) => self.per_unit += seconds,
        }
    }

    pub fn evaluate(&self, m: &Multipliers) -> f64 {
        self.activity_overhead * m.activity_overhead
            + self.per_visit * m.visit
            + self.per_sku * m.sku
            + self.per_line * m.line
            + self.per_order * m.order
            + self.per_unit * m.units
    }
}

/// A card folded into the totals the calculator consumes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCard {
    pub card_id: String,
    pub job_overhead: f64,
    pub job_overhead_source: JobOverheadSource,
    pub process: BucketSums,
    pub travel: BucketSums,
}

impl ResolvedCard {
    pub fn resolve(card: &CalculationCard, role: TaskRole, job_init: Option<&CalculationCard>) -> Self {
        let (job_overhead, job_overhead_source) = resolve_job_overhead(card, role, job_init);
        let mut process = BucketSums::default();
        let mut travel = BucketSums::default();

        for activity in &card.activities {
            if activity.is_travel() {
                travel.add(&activity.bucket, activity.seconds());
            } else {
                process.add(&activity.bucket, activity.seconds());
            }
        }

        Self {
            card_id: card.id.clone(),
            job_overhead,
            job_overhead_source,
            process,
            travel,
        }
    }
}

/// Outcome of looking up a role's card for a flow class
#[derive(Debug, Clone, PartialEq)]
pub enum CardLookup {
    Found(ResolvedCard),
    /// The flow-class card is absent; the generic duration card stands in
    GenericFallback {
        missing_card_id: String,
        card: ResolvedCard,
    },
    Missing { card_id: String },
}

impl CardLookup {
    pub fn card(&self) -> Option<&ResolvedCard> {
        match self {
            CardLookup::Found(card) | CardLookup::GenericFallback { card, .. } => Some(card),
            CardLookup::Missing { .. } => None,
        }
    }
}

/// The three role cards selected by one flow class
#[derive(Debug, Clone, PartialEq)]
pub struct FlowCards {
    pub picking: CardLookup,
    pub sorting: CardLookup,
    pub packing: CardLookup,
}

impl FlowCards {
    pub fn for_role(&self, role: TaskRole) -> &CardLookup {
        match role {
            TaskRole::Picking => &self.picking,
            TaskRole::Sorting => &self.sorting,
            TaskRole::Packing => &self.packing,
        }
    }
}

/// Flow class → role cards, built once from the registry
#[derive(Debug, Clone)]
pub struct FlowCardTable {
    entries: HashMap<FlowClass, FlowCards>,
}

impl FlowCardTable {
    pub fn build(registry: &CardRegistry) -> Self {
        let job_init = registry.get(JOB_INIT_CARD_ID);
        let mut entries = HashMap::new();

        for flow_class in FlowClass::ALL {
            let lookup = |role: TaskRole| -> CardLookup {
                let card_id = flow_class.card_id(role);
                if let Some(card) = registry.get(&card_id) {
                    return CardLookup::Found(ResolvedCard::resolve(card, role, job_init));
                }
                let generic_id = FlowClass::Generic.card_id(role);
                match registry.get(&generic_id) {
                    Some(card) if flow_class != FlowClass::Generic => CardLookup::GenericFallback {
                        missing_card_id: card_id,
                        card: ResolvedCard::resolve(card, role, job_init),
                    },
                    _ => CardLookup::Missing { card_id },
                }
            };

            entries.insert(
                flow_class,
                FlowCards {
                    picking: lookup(TaskRole::Picking),
                    sorting: lookup(TaskRole::Sorting),
                    packing: lookup(TaskRole::Packing),
                },
            );
        }

        Self { entries }
    }

    pub fn cards(&self, flow_class: FlowClass) -> &FlowCards {
        // Every FlowClass variant is inserted by `build`
        &self.entries[&flow_class]
    }

    pub fn lookup(&self, flow_class: FlowClass, role: TaskRole) -> &CardLookup {
        self.cards(flow_class).for_role(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(name: &str, bucket: &str, seconds: f64) -> MicroActivity {
        MicroActivity {
            name: name.to_string(),
            bucket: Bucket::from(bucket.to_string()),
            default_sec: seconds,
            target_sec: None,
        }
    }

    fn card(id: &str, activities: Vec<MicroActivity>) -> CalculationCard {
        CalculationCard {
            id: id.to_string(),
            name: id.to_string(),
            activities,
        }
    }

    #[test]
    fn test_bucket_parsing() {
        assert_eq!(Bucket::from("Job Overhead".to_string()), Bucket::JobOverhead);
        assert_eq!(Bucket::from(" location based ".to_string()), Bucket::LocationBased);
        assert_eq!(Bucket::from("SKU Base".to_string()), Bucket::SkuBase);
        assert_eq!(Bucket::from("Travel Between Aisles".to_string()), Bucket::Travel);
        assert_eq!(
            Bucket::from("Weird".to_string()),
            Bucket::Other("Weird".to_string())
        );
    }

    #[test]
    fn test_flow_class_acronyms() {
        assert_eq!(FlowClass::from_acronym("micp"), Some(FlowClass::Micp));
        assert_eq!(FlowClass::from_acronym("Put-Wall"), Some(FlowClass::PutWall));
        assert_eq!(FlowClass::from_acronym("put wall"), Some(FlowClass::PutWall));
        assert_eq!(FlowClass::from_acronym("XYZ"), None);
        assert_eq!(FlowClass::Micp.card_id(TaskRole::Picking), "picking_micp");
        assert_eq!(FlowClass::Generic.card_id(TaskRole::Packing), "packing_duration");
    }

    #[test]
    fn test_target_overrides_default() {
        let mut a = activity("Scan", "Line Based", 4.0);
        a.target_sec = Some(3.5);
        assert_eq!(a.seconds(), 3.5);
    }

    #[test]
    fn test_job_overhead_from_card_bucket() {
        let c = card(
            "picking_micp",
            vec![
                activity("Get cart", "Job Overhead", 200.0),
                activity("Print labels", "Job Overhead", 50.0),
                activity("Scan", "Line Based", 4.0),
            ],
        );
        let (seconds, source) = resolve_job_overhead(&c, TaskRole::Picking, None);
        assert_eq!(seconds, 250.0);
        assert_eq!(source, JobOverheadSource::CardBucket);
    }

    #[test]
    fn test_job_overhead_falls_back_to_shared_card() {
        let c = card("packing_micp", vec![activity("Scan", "Line Based", 4.0)]);
        let shared = card(
            JOB_INIT_CARD_ID,
            vec![
                activity("Pick Job Init", "Job Overhead", 120.0),
                activity("Pack Job Init", "Job Overhead", 90.0),
            ],
        );
        let (seconds, source) = resolve_job_overhead(&c, TaskRole::Packing, Some(&shared));
        assert_eq!(seconds, 90.0);
        assert_eq!(source, JobOverheadSource::SharedJobInit);

        let (seconds, source) = resolve_job_overhead(&c, TaskRole::Sorting, Some(&shared));
        assert_eq!(seconds, 0.0);
        assert_eq!(source, JobOverheadSource::NotFound);
    }

    #[test]
    fn test_resolved_card_splits_travel() {
        let c = card(
            "picking_standard",
            vec![
                activity("Walk to location", "Location Based", 10.0),
                activity("Travel to aisle", "Location Based", 20.0),
                activity("Aisle travel", "Travel", 5.0),
                activity("Pick unit", "Unit Variable", 3.0),
            ],
        );
        let resolved = ResolvedCard::resolve(&c, TaskRole::Picking, None);
        assert_eq!(resolved.process.per_visit, 10.0);
        assert_eq!(resolved.travel.per_visit, 20.0);
        assert_eq!(resolved.travel.per_unit, 5.0);
        assert_eq!(resolved.process.per_unit, 3.0);
    }

    #[test]
    fn test_registry_from_object_uses_keys() {
        let json = r#"{
            "picking_micp": { "activities": [
                { "name": "Scan", "bucket": "Line Based", "default_sec": 4 }
            ]}
        }"#;
        let registry = CardRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("picking_micp").unwrap().activities.len(), 1);
    }

    #[test]
    fn test_registry_rejects_negative_seconds() {
        let json = r#"[{ "id": "picking_micp", "activities": [
            { "name": "Scan", "bucket": "Line Based", "default_sec": -4 }
        ]}]"#;
        assert!(matches!(
            CardRegistry::from_json(json),
            Err(EngineError::InvalidCard(_))
        ));
    }

    #[test]
    fn test_table_fallback_and_missing() {
        let mut registry = CardRegistry::new();
        registry.insert(card("picking_micp", vec![activity("Scan", "Line Based", 4.0)]));
        registry.insert(card("packing_duration", vec![activity("Pack", "Unit Variable", 2.0)]));
        let table = FlowCardTable::build(&registry);

        assert!(matches!(
            table.lookup(FlowClass::Micp, TaskRole::Picking),
            CardLookup::Found(_)
        ));
        assert!(matches!(
            table.lookup(FlowClass::Micp, TaskRole::Packing),
            CardLookup::GenericFallback { .. }
        ));
        assert!(matches!(
            table.lookup(FlowClass::Micp, TaskRole::Sorting),
            CardLookup::Missing { .. }
        ));
        assert!(matches!(
            table.lookup(FlowClass::Generic, TaskRole::Packing),
            CardLookup::Found(_)
        ));
    }
}
