//! Declarations for the resources this crate knows by name.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use osf_resources::{ApiContext, ListOptions, resources};
//!
//! # async fn run() -> Result<(), osf_resources::ClientError> {
//! let context = Arc::new(ApiContext::from_default_url()?);
//! let nodes = context.client(resources::nodes())?;
//!
//! for node in nodes.list(&ListOptions::new().page_size(100)).await? {
//!     println!("{node} {:?}", node.get_str("title"));
//! }
//!
//! let node = nodes.detail("abc12").await?;
//! println!("{:?}", node.get("public"));
//! # Ok(())
//! # }
//! ```

use crate::model::ModelKind;
use crate::resource::ResourceConfig;

pub const USER: ModelKind = ModelKind::new("User");
pub const NODE: ModelKind = ModelKind::new("Node");
pub const APPLICATION: ModelKind = ModelKind::new("Application");

/// The `users` resource.
pub fn users() -> ResourceConfig {
    ResourceConfig::new(USER, "users", "user")
}

/// The `nodes` (projects and components) resource.
pub fn nodes() -> ResourceConfig {
    ResourceConfig::new(NODE, "nodes", "node")
}

/// The `applications` (OAuth developer applications) resource.
pub fn applications() -> ResourceConfig {
    ResourceConfig::new(APPLICATION, "applications", "application")
}

/// Every declared resource.
pub fn all() -> Vec<ResourceConfig> {
    vec![users(), nodes(), applications()]
}

/// Looks up a declared resource by path segment.
pub fn by_path_segment(segment: &str) -> Option<ResourceConfig> {
    all()
        .into_iter()
        .find(|config| config.path_segment.as_deref() == Some(segment))
}

#[cfg(test)]
mod tests {
    use super::{by_path_segment, nodes};

    #[test]
    fn looks_up_declared_resources() {
        assert_eq!(by_path_segment("nodes"), Some(nodes()));
        assert_eq!(
            by_path_segment("users").and_then(|config| config.name),
            Some("user".to_owned())
        );
        assert!(by_path_segment("widgets").is_none());
    }
}
