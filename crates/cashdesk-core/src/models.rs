//! Core data models for the cash register dashboard

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{NavTarget, RecordStatus, Severity, ViewMode};

// ==================== Identity & Filters ====================

/// Identity used to scope counts to "records this user is responsible for"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap a raw identity; blank values are not identities
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Extract an identity from a JSON value (numeric ids and non-blank strings)
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::new(s),
            serde_json::Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Field a count filter may constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Responsible,
    Status,
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterField::Responsible => write!(f, "responsible"),
            FilterField::Status => write!(f, "status"),
        }
    }
}

/// Equality predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: FilterField,
    pub value: String,
}

/// Conjunction of equality predicates; empty means "every record"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    /// Unfiltered count
    pub fn all() -> Self {
        Self::default()
    }

    /// Scope to records owned by `identity`, or leave unscoped when absent
    pub fn owned_by(identity: Option<&Identity>) -> Self {
        match identity {
            Some(identity) => Self::all().responsible(identity),
            None => Self::all(),
        }
    }

    pub fn responsible(mut self, identity: &Identity) -> Self {
        self.conditions.push(Condition {
            field: FilterField::Responsible,
            value: identity.as_str().to_string(),
        });
        self
    }

    pub fn status(mut self, status: RecordStatus) -> Self {
        self.conditions.push(Condition {
            field: FilterField::Status,
            value: status.to_string(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "*");
        }
        let parts: Vec<String> = self
            .conditions
            .iter()
            .map(|c| format!("{}={}", c.field, c.value))
            .collect();
        write!(f, "{}", parts.join(" & "))
    }
}

// ==================== Statistics ====================

/// Record counts for one cash category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Records in scope
    pub total: u64,
    /// Records with status "open"
    pub open: u64,
    /// Records with status "closed"
    pub closed: u64,
    /// Records still in "draft"
    #[serde(default)]
    pub draft: u64,
    /// Reserved; always zero
    pub balance: Decimal,
}

impl CategoryStats {
    pub fn new(total: u64, open: u64, closed: u64) -> Self {
        Self {
            total,
            open,
            closed,
            draft: 0,
            balance: Decimal::ZERO,
        }
    }

    pub fn with_draft(mut self, draft: u64) -> Self {
        self.draft = draft;
        self
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// How the identity scope of a snapshot was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Counts restricted to the resolved identity
    Filtered,
    /// No identity resolved, global counts
    Unfiltered,
    /// Aggregation failed wholesale, every entry is zero
    Unavailable,
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionMode::Filtered => write!(f, "filtered"),
            ResolutionMode::Unfiltered => write!(f, "unfiltered"),
            ResolutionMode::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Stats of one category inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub key: String,
    pub stats: CategoryStats,
}

/// Complete set of per-category statistics displayed at one time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub mode: ResolutionMode,
    pub entries: Vec<CategoryEntry>,
}

impl StatsSnapshot {
    /// All-zero snapshot covering `keys`, in order
    pub fn zeroed<'a, I>(keys: I, mode: ResolutionMode) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            mode,
            entries: keys
                .into_iter()
                .map(|key| CategoryEntry {
                    key: key.to_string(),
                    stats: CategoryStats::default(),
                })
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CategoryStats> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.stats)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==================== Actions ====================

/// Ad-hoc description of a view, usable without a registered action name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub title: String,
    pub collection: String,
    pub view_modes: Vec<ViewMode>,
    pub target: NavTarget,
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl ActionDescriptor {
    /// Window action on `collection`, list view in the current tab
    pub fn window(title: &str, collection: &str) -> Self {
        Self {
            title: title.to_string(),
            collection: collection.to_string(),
            view_modes: vec![ViewMode::List],
            target: NavTarget::Current,
            context: serde_json::Map::new(),
        }
    }

    pub fn with_views(mut self, views: &[ViewMode]) -> Self {
        self.view_modes = views.to_vec();
        self
    }

    pub fn with_context(mut self, key: &str, value: serde_json::Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }

    /// Comma-separated view modes, e.g. "kanban,list,form"
    pub fn view_mode(&self) -> String {
        self.view_modes
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// What the action service is asked to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "action", rename_all = "lowercase")]
pub enum ActionRequest {
    /// Pre-registered symbolic action
    Named(String),
    /// Synthesized descriptor
    Descriptor(ActionDescriptor),
}

/// User-visible toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub title: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: &str, message: &str) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn success(title: &str, message: &str) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn danger(title: &str, message: &str) -> Self {
        Self::new(Severity::Danger, title, message)
    }

    fn new(severity: Severity, title: &str, message: &str) -> Self {
        Self {
            message: message.to_string(),
            title: title.to_string(),
            severity,
        }
    }
}

// ==================== Intents ====================

/// Navigation the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Open the category list
    Select,
    /// Open the creation form
    Create,
    /// Show only open records
    ViewOpen,
    /// Show the movement lines of the current period
    MovementAnalysis,
}

impl std::str::FromStr for IntentKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "select" => Ok(IntentKind::Select),
            "create" => Ok(IntentKind::Create),
            "open" | "view_open" => Ok(IntentKind::ViewOpen),
            "movements" | "movement_analysis" => Ok(IntentKind::MovementAnalysis),
            _ => Err(format!("Invalid intent: {}", s)),
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentKind::Select => write!(f, "select"),
            IntentKind::Create => write!(f, "create"),
            IntentKind::ViewOpen => write!(f, "view_open"),
            IntentKind::MovementAnalysis => write!(f, "movement_analysis"),
        }
    }
}

/// Intent bound to a category key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionIntent {
    pub category: String,
    pub kind: IntentKind,
}

impl ActionIntent {
    pub fn new(category: &str, kind: IntentKind) -> Self {
        Self {
            category: category.to_string(),
            kind,
        }
    }
}

/// How a dispatch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The registered action ran
    Primary,
    /// The synthesized descriptor ran
    Fallback,
    /// Nothing to open; the user was informed
    NothingToShow,
    /// Navigation failed; the user saw an error
    Failed,
}
