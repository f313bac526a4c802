//! Dashboard view model.
//!
//! Derives the cards and the five-phase journey timeline from the cached
//! portal data. Nothing here touches the network.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::a2p_submission::{A2PStatus, A2PSubmission};
use super::client::ClientProfile;
use super::system_status::{Phase, SystemStatus};

/// Combined result of the portal data lookups for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalUserData {
    pub client: ClientProfile,
    pub system_status: Option<SystemStatus>,
    pub a2p_submission: Option<A2PSubmission>,
}

impl PortalUserData {
    /// The registration step is complete once any submission exists.
    pub fn is_a2p_complete(&self) -> bool {
        self.a2p_submission.is_some()
    }

    /// Stored phase, or account setup when no status row exists yet.
    pub fn current_phase(&self) -> Phase {
        self.system_status
            .as_ref()
            .map(|s| s.current_phase)
            .unwrap_or(Phase::AccountSetup)
    }
}

/// Position of a phase relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Complete,
    InProgress,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub phase: Phase,
    pub label: &'static str,
    pub status: StepStatus,
}

/// One sub-system card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemCard {
    pub name: &'static str,
    pub status: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub display_name: String,
    pub current_phase: Phase,
    pub progress_percent: u8,
    pub timeline: Vec<TimelineStep>,
    pub subsystems: Vec<SubsystemCard>,
    pub estimated_go_live: String,
    pub a2p_complete: bool,
    pub a2p_status: Option<A2PStatus>,
}

impl DashboardSummary {
    pub fn from_user_data(data: &PortalUserData) -> Self {
        let phase = data.current_phase();
        let subsystems = match &data.system_status {
            Some(s) => vec![
                card("CRM Integration", s.crm_integration.as_str()),
                card("SMS Registration", s.sms_registration.as_str()),
                card("Workflow Automation", s.workflow_automation.as_str()),
                card("Calendar Sync", s.calendar_sync.as_str()),
            ],
            None => [
                "CRM Integration",
                "SMS Registration",
                "Workflow Automation",
                "Calendar Sync",
            ]
            .into_iter()
            .map(|name| card(name, "pending"))
            .collect(),
        };

        Self {
            display_name: data.client.display_name(),
            current_phase: phase,
            progress_percent: progress_percent(phase),
            timeline: timeline(phase),
            subsystems,
            estimated_go_live: format_go_live(
                data.system_status.as_ref().and_then(|s| s.estimated_go_live),
            ),
            a2p_complete: data.is_a2p_complete(),
            a2p_status: data.a2p_submission.as_ref().map(|s| s.status),
        }
    }
}

/// Share of the journey reached, rounded to the nearest percent.
pub fn progress_percent(phase: Phase) -> u8 {
    ((phase.number() as f64 / Phase::ALL.len() as f64) * 100.0).round() as u8
}

pub fn timeline(current: Phase) -> Vec<TimelineStep> {
    Phase::ALL
        .iter()
        .map(|&phase| TimelineStep {
            phase,
            label: phase.label(),
            status: if phase < current {
                StepStatus::Complete
            } else if phase == current {
                StepStatus::InProgress
            } else {
                StepStatus::Pending
            },
        })
        .collect()
}

/// Display label for a stored sub-system status value.
pub fn status_label(status: &str) -> &'static str {
    match status {
        "connected" => "Connected",
        "active" => "Active",
        "approved" => "Approved",
        "in_progress" => "In Progress",
        "rejected" => "Rejected",
        _ => "Pending",
    }
}

pub fn format_go_live(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => "TBD".to_string(),
    }
}

fn card(name: &'static str, status: &str) -> SubsystemCard {
    SubsystemCard {
        name,
        status: status.to_string(),
        label: status_label(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::client::{ClientProfile, OnboardingStatus};
    use crate::models::system_status::{
        IntegrationStatus, SmsRegistrationStatus, WorkflowStatus,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn client() -> ClientProfile {
        let now = Utc::now();
        ClientProfile {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            company_name: None,
            user_type: "client".to_string(),
            ghl_location_id: None,
            onboarding_status: OnboardingStatus::InProgress,
            created_at: now,
            updated_at: now,
        }
    }

    fn status(client_id: Uuid, phase: Phase) -> SystemStatus {
        let now = Utc::now();
        SystemStatus {
            id: Uuid::new_v4(),
            client_id,
            crm_integration: IntegrationStatus::Connected,
            sms_registration: SmsRegistrationStatus::InProgress,
            workflow_automation: WorkflowStatus::Pending,
            calendar_sync: IntegrationStatus::Pending,
            estimated_go_live: NaiveDate::from_ymd_opt(2025, 3, 5),
            current_phase: phase,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_progress_percent() {
        let values: Vec<u8> = Phase::ALL.iter().map(|p| progress_percent(*p)).collect();
        assert_eq!(values, vec![20, 40, 60, 80, 100]);
    }

    #[test]
    fn test_timeline_marks_steps() {
        let steps = timeline(Phase::SystemIntegration);
        let statuses: Vec<StepStatus> = steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Complete,
                StepStatus::Complete,
                StepStatus::InProgress,
                StepStatus::Pending,
                StepStatus::Pending
            ]
        );
        assert_eq!(steps[3].label, "Testing & QA");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label("connected"), "Connected");
        assert_eq!(status_label("in_progress"), "In Progress");
        assert_eq!(status_label("approved"), "Approved");
        assert_eq!(status_label("rejected"), "Rejected");
        assert_eq!(status_label("pending"), "Pending");
        assert_eq!(status_label("unknown"), "Pending");
    }

    #[test]
    fn test_go_live_format() {
        assert_eq!(format_go_live(NaiveDate::from_ymd_opt(2025, 3, 5)), "Mar 5, 2025");
        assert_eq!(format_go_live(None), "TBD");
    }

    #[test]
    fn test_summary_without_status_defaults_to_first_phase() {
        let data = PortalUserData {
            client: client(),
            system_status: None,
            a2p_submission: None,
        };
        let summary = DashboardSummary::from_user_data(&data);
        assert_eq!(summary.current_phase, Phase::AccountSetup);
        assert_eq!(summary.progress_percent, 20);
        assert_eq!(summary.estimated_go_live, "TBD");
        assert!(summary.subsystems.iter().all(|c| c.label == "Pending"));
        assert!(!summary.a2p_complete);
        assert_eq!(summary.display_name, "Ada");
    }

    #[test]
    fn test_summary_with_status() {
        let client = client();
        let data = PortalUserData {
            system_status: Some(status(client.id, Phase::A2pRegistration)),
            client,
            a2p_submission: None,
        };
        let summary = DashboardSummary::from_user_data(&data);
        assert_eq!(summary.progress_percent, 40);
        assert_eq!(summary.estimated_go_live, "Mar 5, 2025");
        let labels: Vec<&str> = summary.subsystems.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Connected", "In Progress", "Pending", "Pending"]);
        assert_eq!(summary.a2p_status, None);
    }
}
