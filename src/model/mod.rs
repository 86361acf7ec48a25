pub mod attendance;
pub mod break_request;
pub mod leave_request;
pub mod notification;
pub mod organization;
pub mod role;
pub mod salary;
pub mod salary_history;
pub mod user;
