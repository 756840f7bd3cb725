pub mod app;
pub mod client;
pub mod config;
pub mod nonce;
pub mod oauth;
pub mod observe;
pub mod restlet;
pub mod types;

pub use app::build_app;
pub use client::{ClientError, ForwardError, RestletClient};
pub use config::{ConfigError, RelayConfig};
pub use oauth::{AuthorizationHeader, Credentials, SignatureMethod, Signer};
pub use observe::{NoopObserver, RelayObserver, TracingObserver};
pub use restlet::RestletEndpoint;
