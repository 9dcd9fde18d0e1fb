//! Basic enumerations shared by the dashboard components

use serde::{Deserialize, Serialize};

/// Lifecycle state of a cash register record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Being prepared, not yet open
    Draft,
    /// Open and accepting movements
    Open,
    /// Closed
    Closed,
    /// Cancelled
    Cancelled,
}

impl Default for RecordStatus {
    fn default() -> Self {
        RecordStatus::Draft
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(RecordStatus::Draft),
            "open" => Ok(RecordStatus::Open),
            "closed" => Ok(RecordStatus::Closed),
            "cancelled" => Ok(RecordStatus::Cancelled),
            _ => Err(format!("Invalid record status: {}", s)),
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Draft => write!(f, "draft"),
            RecordStatus::Open => write!(f, "open"),
            RecordStatus::Closed => write!(f, "closed"),
            RecordStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// View mode of a window action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    List,
    Kanban,
    Form,
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::List => write!(f, "list"),
            ViewMode::Kanban => write!(f, "kanban"),
            ViewMode::Form => write!(f, "form"),
        }
    }
}

/// Where a view is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavTarget {
    /// Replace the current tab content
    Current,
}

impl Default for NavTarget {
    fn default() -> Self {
        NavTarget::Current
    }
}

impl std::fmt::Display for NavTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavTarget::Current => write!(f, "current"),
        }
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}
