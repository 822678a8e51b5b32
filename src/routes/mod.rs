pub mod assignments;

pub mod attendance;

pub mod auth;

pub mod courses;

pub mod enrollments;

pub mod exams;

pub mod files;

pub mod grades;

pub mod lessons;

pub mod me;

pub mod pqrs;

pub mod reports;

pub mod users;

pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use files::configure_file_routes;
pub use me::configure_me_routes;
pub use pqrs::configure_pqr_routes;
pub use reports::configure_report_routes;
pub use users::configure_user_routes;
