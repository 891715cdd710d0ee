//! Request lifecycle: the closed status set, the legal transitions between
//! statuses, and which role may drive each edge.
//!
//! Every view decides what to offer through [`next_actions`] so the rule set
//! lives in exactly one place.

use serde::{Deserialize, Serialize};

use crate::models::{LabRequest, Role, User};

/// Status of a lab request.
///
/// Unknown strings are preserved verbatim: an unrecognized status renders its
/// literal text and offers no actions, it never fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Draft,
    PendingApproval,
    AwaitingShipment,
    InTransit,
    ArrivedAtProvider,
    InProgress,
    ValidationPending,
    Completed,
    Unknown(String),
}

impl RequestStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "draft" => RequestStatus::Draft,
            "pending_approval" => RequestStatus::PendingApproval,
            "awaiting_shipment" => RequestStatus::AwaitingShipment,
            "in_transit" => RequestStatus::InTransit,
            "arrived_at_provider" => RequestStatus::ArrivedAtProvider,
            "in_progress" => RequestStatus::InProgress,
            "validation_pending" => RequestStatus::ValidationPending,
            "completed" => RequestStatus::Completed,
            // Pre-v7 wire names
            "submitted" => RequestStatus::ArrivedAtProvider,
            "awaiting_other_departments" => RequestStatus::InProgress,
            "rejected" => RequestStatus::Draft,
            other => RequestStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Draft => "draft",
            RequestStatus::PendingApproval => "pending_approval",
            RequestStatus::AwaitingShipment => "awaiting_shipment",
            RequestStatus::InTransit => "in_transit",
            RequestStatus::ArrivedAtProvider => "arrived_at_provider",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::ValidationPending => "validation_pending",
            RequestStatus::Completed => "completed",
            RequestStatus::Unknown(value) => value,
        }
    }

    /// Label for list views. Unknown statuses show their literal string.
    pub fn label(&self) -> &str {
        match self {
            RequestStatus::Draft => "Draft",
            RequestStatus::PendingApproval => "Pending approval",
            RequestStatus::AwaitingShipment => "Awaiting shipment",
            RequestStatus::InTransit => "In transit",
            RequestStatus::ArrivedAtProvider => "Arrived at provider",
            RequestStatus::InProgress => "In progress",
            RequestStatus::ValidationPending => "Validation pending",
            RequestStatus::Completed => "Completed",
            RequestStatus::Unknown(value) => value,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed)
    }

    /// The shipment-tracking sub-lifecycle.
    pub fn is_logistics_stage(&self) -> bool {
        matches!(
            self,
            RequestStatus::AwaitingShipment
                | RequestStatus::InTransit
                | RequestStatus::ArrivedAtProvider
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RequestStatus::Unknown(_))
    }
}

impl From<String> for RequestStatus {
    fn from(value: String) -> Self {
        RequestStatus::parse(&value)
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition the current user may trigger on a request. Each action maps
/// onto a single status update persisted via the generic request-update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// draft → pending_approval (company user submits for company approval)
    SubmitForApproval,
    /// draft → awaiting_shipment (company admin submits directly)
    Submit,
    /// pending_approval → awaiting_shipment
    Approve,
    /// pending_approval → draft
    Reject,
    /// awaiting_shipment → in_transit (shipment scan)
    StartTransit,
    /// in_transit → arrived_at_provider (arrival scan)
    ConfirmArrival,
    /// arrived_at_provider → in_progress (lab begins work)
    BeginProcessing,
    /// in_progress → validation_pending (department work done)
    SubmitForValidation,
    /// validation_pending → completed
    AcceptValidation,
    /// validation_pending → in_progress (sent back with a reason)
    RejectValidation,
}

impl Action {
    pub fn source(&self) -> RequestStatus {
        match self {
            Action::SubmitForApproval | Action::Submit => RequestStatus::Draft,
            Action::Approve | Action::Reject => RequestStatus::PendingApproval,
            Action::StartTransit => RequestStatus::AwaitingShipment,
            Action::ConfirmArrival => RequestStatus::InTransit,
            Action::BeginProcessing => RequestStatus::ArrivedAtProvider,
            Action::SubmitForValidation => RequestStatus::InProgress,
            Action::AcceptValidation | Action::RejectValidation => RequestStatus::ValidationPending,
        }
    }

    pub fn target(&self) -> RequestStatus {
        match self {
            Action::SubmitForApproval => RequestStatus::PendingApproval,
            Action::Submit | Action::Approve => RequestStatus::AwaitingShipment,
            Action::Reject => RequestStatus::Draft,
            Action::StartTransit => RequestStatus::InTransit,
            Action::ConfirmArrival => RequestStatus::ArrivedAtProvider,
            Action::BeginProcessing | Action::RejectValidation => RequestStatus::InProgress,
            Action::SubmitForValidation => RequestStatus::ValidationPending,
            Action::AcceptValidation => RequestStatus::Completed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::SubmitForApproval => "Submit for approval",
            Action::Submit => "Submit",
            Action::Approve => "Approve",
            Action::Reject => "Reject",
            Action::StartTransit => "Start transit",
            Action::ConfirmArrival => "Confirm arrival",
            Action::BeginProcessing => "Begin processing",
            Action::SubmitForValidation => "Submit for validation",
            Action::AcceptValidation => "Accept validation",
            Action::RejectValidation => "Reject validation",
        }
    }
}

/// True when a legal edge exists between the two statuses, regardless of role.
fn edge_exists(from: &RequestStatus, to: &RequestStatus) -> bool {
    use RequestStatus::*;
    matches!(
        (from, to),
        (Draft, PendingApproval)
            | (Draft, AwaitingShipment)
            | (PendingApproval, AwaitingShipment)
            | (PendingApproval, Draft)
            | (AwaitingShipment, InTransit)
            | (InTransit, ArrivedAtProvider)
            | (ArrivedAtProvider, InProgress)
            | (InProgress, ValidationPending)
            | (ValidationPending, Completed)
            | (ValidationPending, InProgress)
    )
}

/// Role-level transition check.
///
/// Ownership and department guards are layered on top by [`next_actions`];
/// this answers only "may this role ever drive this edge".
pub fn can_transition(role: &Role, from: &RequestStatus, to: &RequestStatus) -> bool {
    use RequestStatus::*;

    if !edge_exists(from, to) {
        return false;
    }
    if *role == Role::SuperAdmin {
        return true;
    }
    match (from, to) {
        (Draft, PendingApproval) => *role == Role::CompanyUser,
        (Draft, AwaitingShipment) => *role == Role::CompanyAdmin,
        (PendingApproval, AwaitingShipment) | (PendingApproval, Draft) => {
            *role == Role::CompanyAdmin
        }
        (AwaitingShipment, InTransit) | (InTransit, ArrivedAtProvider) => role.is_logistics(),
        (InProgress, ValidationPending) => *role == Role::LaborStaff,
        // status edit and validation decisions are super-admin only
        _ => false,
    }
}

/// All actions the user may trigger on this request right now.
///
/// This is the single source of truth for which controls a view offers; the
/// backend re-validates every transition on its side.
pub fn next_actions(user: &User, request: &LabRequest) -> Vec<Action> {
    use RequestStatus::*;

    let mut actions = Vec::new();
    let is_super = user.role == Role::SuperAdmin;
    let same_company = request.belongs_to_company(user.company_id);

    match &request.status {
        Draft => {
            // A request with no test items cannot leave draft.
            if request.test_results.is_empty() {
                return actions;
            }
            let owns = request.is_owned_by(user.id);
            if (user.role == Role::CompanyUser && owns && same_company) || is_super {
                actions.push(Action::SubmitForApproval);
            }
            if (user.role == Role::CompanyAdmin && same_company) || is_super {
                actions.push(Action::Submit);
            }
        }
        PendingApproval => {
            if (user.role == Role::CompanyAdmin && same_company) || is_super {
                actions.push(Action::Approve);
                actions.push(Action::Reject);
            }
        }
        AwaitingShipment => {
            if user.role.is_logistics() || is_super {
                actions.push(Action::StartTransit);
            }
        }
        InTransit => {
            if user.role.is_logistics() || is_super {
                actions.push(Action::ConfirmArrival);
            }
        }
        ArrivedAtProvider => {
            // Terminal for the logistics scope; only a status edit moves on.
            if is_super {
                actions.push(Action::BeginProcessing);
            }
        }
        InProgress => {
            if user.role == Role::LaborStaff {
                if let Some(dept) = user.department_id {
                    let mine: Vec<_> = request
                        .test_results
                        .iter()
                        .filter(|tr| tr.department_id == Some(dept))
                        .collect();
                    if !mine.is_empty() && mine.iter().all(|tr| tr.status.is_completed()) {
                        actions.push(Action::SubmitForValidation);
                    }
                }
            } else if is_super
                && !request.test_results.is_empty()
                && request.test_results.iter().all(|tr| tr.status.is_completed())
            {
                actions.push(Action::SubmitForValidation);
            }
        }
        ValidationPending => {
            if is_super {
                actions.push(Action::AcceptValidation);
                actions.push(Action::RejectValidation);
            }
        }
        Completed | Unknown(_) => {}
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TestResult, TestResultStatus};

    fn user(role: Role) -> User {
        User {
            id: 1,
            name: "Test User".to_string(),
            email: "user@example.com".to_string(),
            role,
            company_id: Some(10),
            company_name: None,
            department_id: None,
            department_name: None,
            phone: None,
            active: true,
        }
    }

    fn test_item(id: i64, department_id: i64, status: TestResultStatus) -> TestResult {
        TestResult {
            id,
            test_type_id: id,
            test_type_name: None,
            price: None,
            department_id: Some(department_id),
            department_name: None,
            status,
            result_text: None,
            result_filename: None,
            completed_by: None,
            completed_at: None,
        }
    }

    fn request(status: RequestStatus, items: Vec<TestResult>) -> LabRequest {
        LabRequest {
            id: 100,
            request_number: Some("LAB-2026-0001".to_string()),
            internal_id: None,
            sample_id: None,
            sample_description: Some("water sample".to_string()),
            sampling_datetime: None,
            sampling_location: None,
            logistics_type: Default::default(),
            shipping_address: None,
            contact_person: None,
            contact_phone: None,
            urgency: Default::default(),
            deadline: None,
            special_instructions: None,
            attachment_filename: None,
            status,
            total_price: None,
            category: None,
            company_id: Some(10),
            company_name: None,
            user_id: Some(1),
            user_name: None,
            test_results: items,
            created_at: None,
            approved_by: None,
            approved_at: None,
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for name in [
            "draft",
            "pending_approval",
            "awaiting_shipment",
            "in_transit",
            "arrived_at_provider",
            "in_progress",
            "validation_pending",
            "completed",
        ] {
            let status = RequestStatus::parse(name);
            assert!(status.is_known());
            assert_eq!(status.as_str(), name);
        }
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!(
            RequestStatus::parse("submitted"),
            RequestStatus::ArrivedAtProvider
        );
        assert_eq!(
            RequestStatus::parse("awaiting_other_departments"),
            RequestStatus::InProgress
        );
        assert_eq!(RequestStatus::parse("rejected"), RequestStatus::Draft);
    }

    #[test]
    fn test_unknown_status_keeps_literal_and_offers_nothing() {
        let status = RequestStatus::parse("foo");
        assert_eq!(status, RequestStatus::Unknown("foo".to_string()));
        assert_eq!(status.label(), "foo");

        let req = request(status, vec![test_item(1, 1, TestResultStatus::Pending)]);
        assert!(next_actions(&user(Role::SuperAdmin), &req).is_empty());
    }

    #[test]
    fn test_transition_table_roles() {
        use RequestStatus::*;

        assert!(can_transition(&Role::CompanyUser, &Draft, &PendingApproval));
        assert!(!can_transition(&Role::CompanyUser, &Draft, &AwaitingShipment));
        assert!(can_transition(&Role::CompanyAdmin, &Draft, &AwaitingShipment));
        assert!(can_transition(&Role::CompanyAdmin, &PendingApproval, &Draft));
        assert!(can_transition(&Role::UniversityLogistics, &AwaitingShipment, &InTransit));
        assert!(can_transition(&Role::CompanyLogistics, &InTransit, &ArrivedAtProvider));
        assert!(!can_transition(&Role::CompanyLogistics, &ArrivedAtProvider, &InProgress));
        assert!(can_transition(&Role::LaborStaff, &InProgress, &ValidationPending));
        assert!(!can_transition(&Role::LaborStaff, &ValidationPending, &Completed));
        assert!(can_transition(&Role::SuperAdmin, &ValidationPending, &Completed));
        assert!(can_transition(&Role::SuperAdmin, &ValidationPending, &InProgress));
    }

    #[test]
    fn test_no_edge_means_no_transition_even_for_super_admin() {
        use RequestStatus::*;
        assert!(!can_transition(&Role::SuperAdmin, &Draft, &Completed));
        assert!(!can_transition(&Role::SuperAdmin, &Completed, &Draft));
        assert!(!can_transition(
            &Role::SuperAdmin,
            &Unknown("foo".to_string()),
            &Draft
        ));
    }

    #[test]
    fn test_unknown_role_is_denied_everywhere() {
        use RequestStatus::*;
        let role = Role::Unknown("intern".to_string());
        assert!(!can_transition(&role, &Draft, &PendingApproval));
        assert!(!can_transition(&role, &AwaitingShipment, &InTransit));

        let req = request(Draft, vec![test_item(1, 1, TestResultStatus::Pending)]);
        assert!(next_actions(&user(role), &req).is_empty());
    }

    // Scenario A: company user, own draft
    #[test]
    fn test_company_user_own_draft() {
        let req = request(
            RequestStatus::Draft,
            vec![test_item(1, 1, TestResultStatus::Pending)],
        );
        let actions = next_actions(&user(Role::CompanyUser), &req);
        assert_eq!(actions, vec![Action::SubmitForApproval]);
        assert!(!actions.contains(&Action::Approve));
    }

    #[test]
    fn test_company_user_cannot_submit_foreign_draft() {
        let mut req = request(
            RequestStatus::Draft,
            vec![test_item(1, 1, TestResultStatus::Pending)],
        );
        req.user_id = Some(999);
        assert!(next_actions(&user(Role::CompanyUser), &req).is_empty());
    }

    #[test]
    fn test_empty_draft_cannot_progress() {
        let req = request(RequestStatus::Draft, vec![]);
        assert!(next_actions(&user(Role::CompanyUser), &req).is_empty());
        assert!(next_actions(&user(Role::SuperAdmin), &req).is_empty());
    }

    // Scenario B: company admin approves or rejects within their company
    #[test]
    fn test_company_admin_approval() {
        let req = request(
            RequestStatus::PendingApproval,
            vec![test_item(1, 1, TestResultStatus::Pending)],
        );
        let actions = next_actions(&user(Role::CompanyAdmin), &req);
        assert_eq!(actions, vec![Action::Approve, Action::Reject]);
        assert_eq!(Action::Approve.target(), RequestStatus::AwaitingShipment);
        assert_eq!(Action::Reject.target(), RequestStatus::Draft);
    }

    #[test]
    fn test_company_admin_other_company_gets_nothing() {
        let mut req = request(
            RequestStatus::PendingApproval,
            vec![test_item(1, 1, TestResultStatus::Pending)],
        );
        req.company_id = Some(77);
        assert!(next_actions(&user(Role::CompanyAdmin), &req).is_empty());
    }

    // Scenario D: all department items completed enables validation submit
    #[test]
    fn test_labor_staff_validation_submit_guard() {
        let mut staff = user(Role::LaborStaff);
        staff.department_id = Some(5);

        let pending = request(
            RequestStatus::InProgress,
            vec![
                test_item(1, 5, TestResultStatus::Completed),
                test_item(2, 5, TestResultStatus::Pending),
            ],
        );
        assert!(next_actions(&staff, &pending).is_empty());

        let done = request(
            RequestStatus::InProgress,
            vec![
                test_item(1, 5, TestResultStatus::Completed),
                test_item(2, 5, TestResultStatus::Completed),
                // another department's item does not gate this submit
                test_item(3, 9, TestResultStatus::Pending),
            ],
        );
        assert_eq!(next_actions(&staff, &done), vec![Action::SubmitForValidation]);
    }

    #[test]
    fn test_labor_staff_without_matching_department_gets_nothing() {
        let mut staff = user(Role::LaborStaff);
        staff.department_id = Some(42);
        let req = request(
            RequestStatus::InProgress,
            vec![test_item(1, 5, TestResultStatus::Completed)],
        );
        assert!(next_actions(&staff, &req).is_empty());
    }

    // Scenario E: arrived_at_provider is terminal for logistics
    #[test]
    fn test_logistics_scope_ends_at_arrival() {
        let req = request(
            RequestStatus::ArrivedAtProvider,
            vec![test_item(1, 1, TestResultStatus::Pending)],
        );
        assert!(next_actions(&user(Role::UniversityLogistics), &req).is_empty());
        assert!(next_actions(&user(Role::CompanyLogistics), &req).is_empty());
        assert_eq!(
            next_actions(&user(Role::SuperAdmin), &req),
            vec![Action::BeginProcessing]
        );
    }

    #[test]
    fn test_logistics_scans() {
        let waiting = request(
            RequestStatus::AwaitingShipment,
            vec![test_item(1, 1, TestResultStatus::Pending)],
        );
        assert_eq!(
            next_actions(&user(Role::CompanyLogistics), &waiting),
            vec![Action::StartTransit]
        );

        let moving = request(
            RequestStatus::InTransit,
            vec![test_item(1, 1, TestResultStatus::Pending)],
        );
        assert_eq!(
            next_actions(&user(Role::UniversityLogistics), &moving),
            vec![Action::ConfirmArrival]
        );
    }

    #[test]
    fn test_validation_decision_is_super_admin_only() {
        let req = request(
            RequestStatus::ValidationPending,
            vec![test_item(1, 5, TestResultStatus::Completed)],
        );
        assert_eq!(
            next_actions(&user(Role::SuperAdmin), &req),
            vec![Action::AcceptValidation, Action::RejectValidation]
        );
        let mut staff = user(Role::LaborStaff);
        staff.department_id = Some(5);
        assert!(next_actions(&staff, &req).is_empty());
    }

    #[test]
    fn test_completed_is_terminal() {
        let req = request(
            RequestStatus::Completed,
            vec![test_item(1, 5, TestResultStatus::Completed)],
        );
        assert!(next_actions(&user(Role::SuperAdmin), &req).is_empty());
        assert!(RequestStatus::Completed.is_terminal());
    }

    #[test]
    fn test_action_source_and_target_agree_with_table() {
        let all = [
            Action::SubmitForApproval,
            Action::Submit,
            Action::Approve,
            Action::Reject,
            Action::StartTransit,
            Action::ConfirmArrival,
            Action::BeginProcessing,
            Action::SubmitForValidation,
            Action::AcceptValidation,
            Action::RejectValidation,
        ];
        for action in all {
            assert!(
                edge_exists(&action.source(), &action.target()),
                "missing edge for {:?}",
                action
            );
        }
    }
}
