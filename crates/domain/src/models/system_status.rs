//! System status domain models.
//!
//! Each client has one status row tracking four independent sub-systems and
//! the overall implementation phase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Status of the CRM integration and calendar sync sub-systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    #[default]
    Pending,
    InProgress,
    Connected,
}

impl IntegrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationStatus::Pending => "pending",
            IntegrationStatus::InProgress => "in_progress",
            IntegrationStatus::Connected => "connected",
        }
    }
}

impl FromStr for IntegrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IntegrationStatus::Pending),
            "in_progress" => Ok(IntegrationStatus::InProgress),
            "connected" => Ok(IntegrationStatus::Connected),
            _ => Err(format!("Invalid integration status: {}", s)),
        }
    }
}

impl fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of the SMS (A2P 10DLC) registration. `Rejected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsRegistrationStatus {
    #[default]
    Pending,
    InProgress,
    Approved,
    Rejected,
}

impl SmsRegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsRegistrationStatus::Pending => "pending",
            SmsRegistrationStatus::InProgress => "in_progress",
            SmsRegistrationStatus::Approved => "approved",
            SmsRegistrationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SmsRegistrationStatus::Approved | SmsRegistrationStatus::Rejected
        )
    }
}

impl FromStr for SmsRegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SmsRegistrationStatus::Pending),
            "in_progress" => Ok(SmsRegistrationStatus::InProgress),
            "approved" => Ok(SmsRegistrationStatus::Approved),
            "rejected" => Ok(SmsRegistrationStatus::Rejected),
            _ => Err(format!("Invalid SMS registration status: {}", s)),
        }
    }
}

impl fmt::Display for SmsRegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of the workflow automation sub-system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Pending,
    InProgress,
    Active,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Active => "active",
        }
    }
}

impl FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WorkflowStatus::Pending),
            "in_progress" => Ok(WorkflowStatus::InProgress),
            "active" => Ok(WorkflowStatus::Active),
            _ => Err(format!("Invalid workflow status: {}", s)),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Implementation phase. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Phase {
    AccountSetup = 1,
    A2pRegistration = 2,
    SystemIntegration = 3,
    TestingQa = 4,
    GoLive = 5,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::AccountSetup,
        Phase::A2pRegistration,
        Phase::SystemIntegration,
        Phase::TestingQa,
        Phase::GoLive,
    ];

    /// Phase a freshly provisioned client starts in (account setup already done).
    pub const INITIAL: Phase = Phase::A2pRegistration;

    pub fn number(&self) -> i32 {
        *self as i32
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::AccountSetup => "Account Setup",
            Phase::A2pRegistration => "A2P Registration",
            Phase::SystemIntegration => "System Integration",
            Phase::TestingQa => "Testing & QA",
            Phase::GoLive => "Go Live",
        }
    }

    /// The following phase, or `None` at go-live.
    pub fn next(&self) -> Option<Phase> {
        Phase::try_from(self.number() + 1).ok()
    }

    /// Maps a stored phase number onto the sequence, clamping out-of-range values.
    pub fn from_number_clamped(n: i32) -> Phase {
        Phase::try_from(n.clamp(1, 5)).unwrap_or(Phase::AccountSetup)
    }
}

impl TryFrom<i32> for Phase {
    type Error = String;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Phase::AccountSetup),
            2 => Ok(Phase::A2pRegistration),
            3 => Ok(Phase::SystemIntegration),
            4 => Ok(Phase::TestingQa),
            5 => Ok(Phase::GoLive),
            _ => Err(format!("Invalid phase: {}", n)),
        }
    }
}

impl From<Phase> for i32 {
    fn from(phase: Phase) -> Self {
        phase.number()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-client system status row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub id: Uuid,
    pub client_id: Uuid,
    pub crm_integration: IntegrationStatus,
    pub sms_registration: SmsRegistrationStatus,
    pub workflow_automation: WorkflowStatus,
    pub calendar_sync: IntegrationStatus,
    pub estimated_go_live: Option<NaiveDate>,
    pub current_phase: Phase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a status row. Sub-system states start as pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSystemStatus {
    pub client_id: Uuid,
    pub current_phase: Phase,
}

impl NewSystemStatus {
    pub fn initial(client_id: Uuid) -> Self {
        Self {
            client_id,
            current_phase: Phase::INITIAL,
        }
    }
}
