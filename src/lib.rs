//! Client library for the AveoEarth marketplace backend.
//!
//! Wraps the REST API behind typed services, keeps a TTL response cache for
//! admin and catalog reads, and stores the shopping cart locally.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod presentation;
pub mod state;

pub use application::admin::AdminService;
pub use application::cart::{CartService, CartSession};
pub use application::storefront::StorefrontService;
pub use domain::error::{ApiError, ApiErrorKind, AveoError, ValidationIssue};
pub use domain::model::{Cart, CartItem, Product};
pub use domain::traits::{Clock, KeyValueStore, StoreEvent};
pub use infrastructure::clock::{ManualClock, SystemClock};
pub use infrastructure::config::Config;
pub use infrastructure::network::ApiClient;
pub use infrastructure::storage::{MemoryStore, SqliteStore, TtlCache};
pub use state::AppState;
