use crate::api::attendance::{
    AttendanceFilter, AttendanceListResponse, CheckInReq, ManualMarkReq, MonthlySummary,
    SummaryQuery, VerifyNetworkReq,
};
use crate::api::break_request::{
    ApproveBreak, BreakFilter, BreakListResponse, CreateBreak, RejectBreak,
};
use crate::api::leave_request::{
    CreateLeave, LeaveFilter, LeaveListResponse, LeaveType, ReviewLeave, UpdateLeave,
};
use crate::api::notification::{CreateNotification, NotificationListResponse};
use crate::api::organization::{AddNetwork, CreateOrganization};
use crate::api::salary::{CreateSalary, SalaryListResponse, TransitionSalary, UpdateSalary};
use crate::api::salary_history::CreateSalaryChange;
use crate::api::users::{CreateUser, UserListResponse};
use crate::domain::wifi::NetworkVerification;
use crate::model::attendance::AttendanceRecord;
use crate::model::break_request::{BreakRequest, BreakStatus};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::notification::Notification;
use crate::model::organization::{OfficeWifiNetwork, Organization};
use crate::model::salary::{SalaryRecord, SalaryStatus};
use crate::model::salary_history::SalaryHistoryEntry;
use crate::model::user::User;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workforce Management API",
        version = "1.0.0",
        description = r#"
## Workforce Management System

This API powers a workforce management backend covering the daily HR
operations of an organization.

### 🔹 Key Features
- **Attendance**
  - Self check-in/check-out with WiFi office-presence verification,
    manual marking by HR, monthly summaries
- **Leave Management**
  - Apply for leave, update or cancel pending requests, approve/reject
- **Break Requests**
  - Request breaks inside an attendance day, HR approval with adjusted windows
- **Salary**
  - Monthly salary records with a forward-only status lifecycle,
    plus a staged salary-change ledger applied on effective dates
- **Organization Admin**
  - Organizations, office WiFi networks, user profiles, notifications

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::manual_mark,
        crate::api::attendance::list_attendance,
        crate::api::attendance::delete_record,
        crate::api::attendance::monthly_summary,
        crate::api::attendance::verify_network,

        crate::api::break_request::create_break,
        crate::api::break_request::approve_break,
        crate::api::break_request::reject_break,
        crate::api::break_request::cancel_break,
        crate::api::break_request::list_breaks,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,

        crate::api::salary::create_salary,
        crate::api::salary::update_salary,
        crate::api::salary::transition_salary,
        crate::api::salary::get_salary,
        crate::api::salary::list_salaries,

        crate::api::salary_history::create_change,
        crate::api::salary_history::list_history,
        crate::api::salary_history::latest_entry,
        crate::api::salary_history::apply_pending,

        crate::api::users::create_user,
        crate::api::users::list_users,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::users::get_user,

        crate::api::organization::create_organization,
        crate::api::organization::list_organizations,
        crate::api::organization::get_organization,
        crate::api::organization::add_network,
        crate::api::organization::deactivate_network,
        crate::api::organization::list_networks,

        crate::api::notification::create_notification,
        crate::api::notification::list_notifications,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read
    ),
    components(
        schemas(
            CheckInReq,
            ManualMarkReq,
            AttendanceFilter,
            AttendanceListResponse,
            SummaryQuery,
            MonthlySummary,
            VerifyNetworkReq,
            NetworkVerification,
            AttendanceRecord,
            CreateBreak,
            ApproveBreak,
            RejectBreak,
            BreakFilter,
            BreakListResponse,
            BreakRequest,
            BreakStatus,
            CreateLeave,
            UpdateLeave,
            ReviewLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            CreateSalary,
            UpdateSalary,
            TransitionSalary,
            SalaryListResponse,
            SalaryRecord,
            SalaryStatus,
            CreateSalaryChange,
            SalaryHistoryEntry,
            CreateUser,
            UserListResponse,
            User,
            CreateOrganization,
            AddNetwork,
            Organization,
            OfficeWifiNetwork,
            CreateNotification,
            NotificationListResponse,
            Notification
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance tracking and presence verification APIs"),
        (name = "Breaks", description = "Break request APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Salary", description = "Salary record APIs"),
        (name = "SalaryHistory", description = "Staged salary-change ledger APIs"),
        (name = "Users", description = "User administration APIs"),
        (name = "Organizations", description = "Organization and office network APIs"),
        (name = "Notifications", description = "Notification APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
