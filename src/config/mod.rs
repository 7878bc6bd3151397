//! Configuration parsing
//!
//! The suite needs little more than the collection URL, which normally comes
//! from the `URL` environment variable. A YAML file can tune timeouts and
//! switch scenarios off.
//!
//! ## Configuration Format
//!
//! ```yaml
//! endpoint:
//!   url: http://localhost:8000/todos
//!   timeout: 10s
//!
//! title: Walk the dog
//! origin: http://someplace.com
//!
//! scenarios:
//!   cors:
//!     enabled: false
//!   update:
//!     timeout: 30s
//! ```

mod suite;

pub use suite::{
    Config, ConfigError, DEFAULT_ORIGIN, DEFAULT_TIMEOUT, DEFAULT_TITLE, DEFAULT_URL, Endpoint,
    ScenarioConfig,
};
