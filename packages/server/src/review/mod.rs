//! Review aggregate core: tag resolution, aggregate construction and heart state.
//!
//! `tag_resolver`, `builder` and `heart` only speak `DbErr` and assume every entity
//! reference they receive is valid. `validate` and `service` sit in front of them and
//! own lookups, authorship checks and response composition.

pub mod builder;
pub mod heart;
pub mod service;
pub mod tag_resolver;
pub mod validate;

pub use builder::{ReviewAggregate, ReviewBuilder};
pub use heart::HeartService;
pub use service::ReviewService;
pub use tag_resolver::{TagResolver, split_tags};
