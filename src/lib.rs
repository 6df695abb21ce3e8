pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod navigation;
pub mod profiles;
pub mod session;
pub mod trial;

pub use api::{ApiClient, ApiError, HttpTransport, Transport};
pub use config::Config;
pub use navigation::{MemoryNavigator, Navigator};
pub use profiles::{PaywallNotice, ProfileView, ProfileViewer};
pub use session::{SessionError, SessionManager, SessionSnapshot};
