// bambou: Async Rust session layer for the Nuage VSD REST API
//
// A `Session` authenticates against the VSD root object (`/me`), then
// fetches, saves, deletes and lists resources described by the
// `Identifiable` trait. `PushCenter` long-polls `/events` in the background.

pub mod config;
pub mod context;
mod decode;
pub mod dynamic;
pub mod error;
pub mod fetching;
pub mod identity;
pub mod notification;
pub mod push;
pub mod session;
pub mod storer;
pub mod transport;

pub use config::{Credentials, DEFAULT_PAGE_SIZE, SessionConfig};
pub use context::SessionContext;
pub use dynamic::{DynamicEntity, DynamicRoot};
pub use error::Error;
pub use fetching::FetchingInfo;
pub use identity::{Identifiable, Identity, Rootable};
pub use notification::{Event, Notification};
pub use push::{BackoffConfig, EventHandler, PushCenter};
pub use session::Session;
pub use storer::Storer;
pub use transport::{ClientCertificate, TlsMode, TransportConfig};
