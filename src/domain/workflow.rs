//! Financing status lifecycle and the role-gated transition table.
//!
//! The table is immutable once built. Lookups are pure and never fail: an
//! unknown status or a missing role simply yields no transitions.

use crate::error::{FinancingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FinancingStatus {
    Draft,
    PendingApproval,
    Approved,
    /// Terminal.
    Rejected,
    InProgress,
    OnHold,
    /// Can be reopened back to `InProgress`.
    Completed,
    /// Terminal.
    Cancelled,
}

impl FinancingStatus {
    pub const ALL: [Self; 8] = [
        Self::Draft,
        Self::PendingApproval,
        Self::Approved,
        Self::Rejected,
        Self::InProgress,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns `true` for the absorbing states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FinancingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinancingStatus {
    type Err = FinancingError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| FinancingError::Validation(format!("Unknown financing status: {s}")))
    }
}

impl TryFrom<String> for FinancingStatus {
    type Error = FinancingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Authorization tier of the user requesting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    Admin,
    Operador,
    Productor,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operador => "operador",
            Self::Productor => "productor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FinancingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "operador" => Ok(Self::Operador),
            "productor" => Ok(Self::Productor),
            other => Err(FinancingError::Validation(format!("Unknown role: {other}"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = FinancingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A single edge of the lifecycle.
///
/// `roles: None` means any authenticated role may take the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTransition {
    pub from: Vec<FinancingStatus>,
    pub to: FinancingStatus,
    pub roles: Option<Vec<Role>>,
}

impl WorkflowTransition {
    fn new(from: FinancingStatus, to: FinancingStatus, roles: &[Role]) -> Self {
        Self {
            from: vec![from],
            to,
            roles: Some(roles.to_vec()),
        }
    }

    fn applies_to(&self, current: FinancingStatus) -> bool {
        self.from.contains(&current)
    }

    fn permits(&self, role: Role) -> bool {
        self.roles
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&role))
    }
}

static STANDARD: LazyLock<WorkflowTable> = LazyLock::new(WorkflowTable::standard);

/// Immutable mapping from a status to its outgoing transition rules.
#[derive(Debug, Clone, Default)]
pub struct WorkflowTable {
    rules: BTreeMap<FinancingStatus, Vec<WorkflowTransition>>,
}

impl WorkflowTable {
    /// Builds a table from explicit rules, keyed by each source status.
    pub fn from_rules(rules: impl IntoIterator<Item = WorkflowTransition>) -> Self {
        let mut table: BTreeMap<FinancingStatus, Vec<WorkflowTransition>> = BTreeMap::new();
        for rule in rules {
            for from in &rule.from {
                table.entry(*from).or_default().push(rule.clone());
            }
        }
        Self { rules: table }
    }

    /// The Bolívar Digital financing lifecycle.
    pub fn standard() -> Self {
        use FinancingStatus::*;
        use Role::*;

        let staff = &[Admin, Operador];
        let admin = &[Admin];

        Self::from_rules([
            WorkflowTransition::new(Draft, PendingApproval, staff),
            WorkflowTransition::new(Draft, Cancelled, staff),
            WorkflowTransition::new(PendingApproval, Approved, admin),
            WorkflowTransition::new(PendingApproval, Rejected, admin),
            WorkflowTransition::new(PendingApproval, Draft, staff),
            WorkflowTransition::new(Approved, InProgress, staff),
            WorkflowTransition::new(Approved, Cancelled, admin),
            WorkflowTransition::new(InProgress, OnHold, staff),
            WorkflowTransition::new(InProgress, Completed, staff),
            WorkflowTransition::new(InProgress, Cancelled, admin),
            WorkflowTransition::new(OnHold, InProgress, staff),
            WorkflowTransition::new(OnHold, Cancelled, admin),
            WorkflowTransition::new(Completed, InProgress, admin),
        ])
    }

    /// Process-wide shared copy of [`WorkflowTable::standard`].
    pub fn global() -> &'static Self {
        &STANDARD
    }

    /// Rules leaving `current`, in declaration order.
    pub fn rules_from(&self, current: FinancingStatus) -> &[WorkflowTransition] {
        self.rules
            .get(&current)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every destination `role` may move a financing to from `current`.
    pub fn allowed_destinations(
        &self,
        current: FinancingStatus,
        role: Option<Role>,
    ) -> BTreeSet<FinancingStatus> {
        let Some(role) = role else {
            return BTreeSet::new();
        };
        self.rules_from(current)
            .iter()
            .filter(|rule| rule.applies_to(current) && rule.permits(role))
            .map(|rule| rule.to)
            .collect()
    }

    #[must_use]
    pub fn can_transition(
        &self,
        current: FinancingStatus,
        target: FinancingStatus,
        role: Option<Role>,
    ) -> bool {
        let Some(role) = role else {
            return false;
        };
        self.rules_from(current)
            .iter()
            .any(|rule| rule.to == target && rule.applies_to(current) && rule.permits(role))
    }

    /// String form of [`Self::allowed_destinations`] for untyped callers.
    ///
    /// Unrecognized status or role strings produce an empty set.
    pub fn allowed_destinations_raw(
        &self,
        current: &str,
        role: Option<&str>,
    ) -> BTreeSet<FinancingStatus> {
        match (current.parse(), parse_role(role)) {
            (Ok(current), Some(role)) => self.allowed_destinations(current, Some(role)),
            _ => BTreeSet::new(),
        }
    }

    /// String form of [`Self::can_transition`]; unrecognized input is `false`.
    pub fn can_transition_raw(&self, current: &str, target: &str, role: Option<&str>) -> bool {
        match (current.parse(), target.parse(), parse_role(role)) {
            (Ok(current), Ok(target), Some(role)) => {
                self.can_transition(current, target, Some(role))
            }
            _ => false,
        }
    }
}

fn parse_role(role: Option<&str>) -> Option<Role> {
    role.and_then(|r| r.parse().ok())
}
