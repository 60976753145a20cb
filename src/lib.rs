pub mod config;
pub mod error;
pub mod metrics;
pub mod modality;
pub mod routing;
pub mod server;
pub mod upstream;

pub use config::AppConfig;
pub use error::AppError;
pub use server::proxy::ProxyState;
pub use server::router::create_router;
