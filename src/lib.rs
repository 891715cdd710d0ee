pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notifier;
pub mod progress;
pub mod session;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use lifecycle::{Action, RequestStatus};
pub use progress::Progress;
pub use session::{Session, SessionStore};
