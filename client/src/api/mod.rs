//! Resource API modules
//!
//! One thin module per REST resource. Each method maps a domain operation
//! to an HTTP verb and path and returns the decoded body (or `()` for
//! deletes). Errors from the transport are propagated unchanged; the one
//! exception is `WeeksApi::get_week`, where 404 means "no schedule yet".

pub mod auth;
pub mod classes;
pub mod schedules;
pub mod staff;
pub mod students;
pub mod weeks;

pub use auth::AuthApi;
pub use classes::ClassesApi;
pub use schedules::SchedulesApi;
pub use staff::StaffApi;
pub use students::StudentsApi;
pub use weeks::WeeksApi;

use crate::transport::ApiClient;

/// All resource modules over one shared client
#[derive(Clone)]
pub struct Api {
    pub auth: AuthApi,
    pub classes: ClassesApi,
    pub schedules: SchedulesApi,
    pub staff: StaffApi,
    pub students: StudentsApi,
    pub weeks: WeeksApi,
    client: ApiClient,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            classes: ClassesApi::new(client.clone()),
            schedules: SchedulesApi::new(client.clone()),
            staff: StaffApi::new(client.clone()),
            students: StudentsApi::new(client.clone()),
            weeks: WeeksApi::new(client.clone()),
            client,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn check_health(&self) -> bool {
        self.client.check_health().await
    }
}
