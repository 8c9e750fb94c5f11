//! # Entity Model
//!
//! Two layers describe everything in the block world:
//! - **Prototypes**: immutable templates, identified by their load position
//! - **Instances**: placed occurrences of a prototype with a process-unique id
//!
//! Instances only ever come out of the [`InstanceFactory`].

mod factory;
mod instance;
mod prototype;

pub use factory::InstanceFactory;
pub use instance::{EntityInstance, InstanceId, InstanceTemplate, DEBUG_COLOR};
pub use prototype::{AudicleKind, Prototype, PrototypeId};
