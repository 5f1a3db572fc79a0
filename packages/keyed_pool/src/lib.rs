#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A bounded pool of expensive, slow-to-construct resources, indexed by a key derived from the
//! request that needs them.
//!
//! Typical resources are hardware-bound objects such as video decoders, where a decoder built
//! for one frame size can be reused for every later request with the same frame size. The pool
//! keeps up to a fixed number of such resources and reuses a matching one when available.
//!
//! When a new key arrives at a full pool, the resource with the lowest hit score is replaced.
//! Scores grow with repeated use and erode while the pool is under pressure, so the pool
//! favors keeping resources that are requested often and recently. See [`KeyedPool`] for the
//! exact scoring rules and [`ScorePolicy`] for the tunable constants.
//!
//! # Example
//!
//! ```
//! use keyed_pool::{KeyedPool, PoolKey};
//!
//! struct Decoder {
//!     device_id: u16,
//! }
//!
//! let mut pool = KeyedPool::<Decoder>::builder().capacity(4).device_id(1).build();
//!
//! for (width, height) in [(1920, 1080), (1280, 720), (1920, 1080)] {
//!     let key = PoolKey::from_dimensions(width, height);
//!
//!     let decoder = pool
//!         .acquire(key, |config| {
//!             Ok::<_, std::io::Error>(Decoder {
//!                 device_id: config.device_id(),
//!             })
//!         })
//!         .unwrap();
//!
//!     assert_eq!(decoder.device_id, 1);
//! }
//!
//! // Two distinct frame sizes means two decoders.
//! assert_eq!(pool.len(), 2);
//! ```
//!
//! # Thread safety
//!
//! [`KeyedPool`] lends out borrowed resources and requires exclusive access for every call.
//! [`SyncKeyedPool`] serializes all calls behind a lock and hands out shared handles that stay
//! valid even after the resource is evicted from the pool.
//!
//! # Observability
//!
//! Pool activity is logged via `tracing` and counted via `nm` events named `keyed_pool_*`.

mod builder;
mod error;
mod key;
mod metrics;
mod policy;
mod pool;
mod resource_config;
mod slot;
mod sync_pool;

pub use builder::*;
pub use error::*;
pub use key::*;
pub use policy::*;
pub use pool::*;
pub use resource_config::*;
pub use sync_pool::*;
