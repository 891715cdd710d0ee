//! Per-role visibility and edit rights over requests and test items.
//!
//! Rules are evaluated in precedence order (super admin, company roles,
//! department staff, logistics) and anything not explicitly granted is denied.
//! The backend enforces the same rules authoritatively; these checks decide
//! what a client shows at all.

use crate::lifecycle::RequestStatus;
use crate::models::{LabRequest, Role, TestResult, User};

/// Whether the request appears in this user's list views.
pub fn can_view(user: &User, request: &LabRequest) -> bool {
    match &user.role {
        Role::SuperAdmin => true,
        Role::CompanyAdmin => request.belongs_to_company(user.company_id),
        Role::CompanyUser => {
            request.belongs_to_company(user.company_id) && request.is_owned_by(user.id)
        }
        Role::LaborStaff => match user.department_id {
            Some(dept) => request.has_department(dept),
            None => false,
        },
        Role::CompanyLogistics | Role::UniversityLogistics => {
            request.status.is_logistics_stage()
        }
        Role::Unknown(_) => false,
    }
}

/// Whether the user may edit the request's own fields (sample data, test
/// selection, attachment). Only drafts are editable below super admin.
pub fn can_edit_request(user: &User, request: &LabRequest) -> bool {
    match &user.role {
        Role::SuperAdmin => true,
        Role::CompanyUser | Role::CompanyAdmin => {
            request.status == RequestStatus::Draft
                && request.is_owned_by(user.id)
                && request.belongs_to_company(user.company_id)
        }
        _ => false,
    }
}

/// Deletion is allowed for a draft's owner and unconditionally for super
/// admin; actual deletion happens server-side.
pub fn can_delete_request(user: &User, request: &LabRequest) -> bool {
    match &user.role {
        Role::SuperAdmin => true,
        Role::CompanyUser | Role::CompanyAdmin => {
            request.status == RequestStatus::Draft
                && request.is_owned_by(user.id)
                && request.belongs_to_company(user.company_id)
        }
        _ => false,
    }
}

/// Whether the user may record a result on this test item. Department staff
/// only touch their own department's items, and only while the parent
/// request is in progress.
pub fn can_edit_test_item(user: &User, request: &LabRequest, item: &TestResult) -> bool {
    match &user.role {
        Role::SuperAdmin => true,
        Role::LaborStaff => {
            request.status == RequestStatus::InProgress
                && user.department_id.is_some()
                && item.department_id == user.department_id
        }
        _ => false,
    }
}

/// Test items the user sees on a request detail view. Department staff see
/// only their department's items; every other role that can view the request
/// sees all of them.
pub fn visible_test_items<'a>(user: &User, request: &'a LabRequest) -> Vec<&'a TestResult> {
    if !can_view(user, request) {
        return Vec::new();
    }
    match (&user.role, user.department_id) {
        (Role::LaborStaff, Some(dept)) => request
            .test_results
            .iter()
            .filter(|tr| tr.department_id == Some(dept))
            .collect(),
        (Role::LaborStaff, None) => Vec::new(),
        _ => request.test_results.iter().collect(),
    }
}
