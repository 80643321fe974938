//! Configuration layering
//!
//! Two independent config domains are resolved the same way:
//! 1. Inner build properties (written by the backend build)
//! 2. Workflow properties (owned by the front-end project)
//!
//! Each domain is a mandatory base JSON file plus an optional override file
//! merged shallowly on top. Both are resolved once per run into a
//! [`HandoffConfig`] that every stage reads and none mutates.

mod merge;
mod properties;
mod resolver;
mod settings;

pub use merge::{merge_shallow, ConfigLayer};
pub use properties::{HandoffLayout, InnerProperties, WorkflowProperties};
pub use resolver::{
    load_layer, resolve, ConfigError, LayerFiles, LayerOrigin, LayerSource, MergedConfig,
    INNER_OVERRIDE_FILE, INNER_PROPERTIES_FILE, WORKFLOW_OVERRIDE_FILE, WORKFLOW_PROPERTIES_FILE,
};
pub use settings::HandoffConfig;
