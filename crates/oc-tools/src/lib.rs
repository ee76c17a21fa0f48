//! oc-tools: annotation tools served by oc-server
//!
//! Three variant lookups backed by the OpenCRAVAT annotate API plus two
//! introspection tools over the local annotator module registry.

use std::sync::Arc;

use oc_core::ToolManager;

pub mod annotate;
pub mod introspect;
pub mod modules;
pub mod variant;

pub use annotate::{AnnotateClient, DEFAULT_ANNOTATORS, OC_API_BASE};
pub use introspect::{DescribeAnnotatorTool, ListAnnotatorsTool};
pub use modules::ModuleRegistry;
pub use variant::{GetAlleleTool, GetCaidTool, GetRsidTool};

/// Register the full annotation tool catalog with the tool manager
pub fn register_annotation_tools(manager: &mut ToolManager, modules_dir: &str) {
    let client = AnnotateClient::new();
    let registry = ModuleRegistry::new(modules_dir);

    manager.register(Arc::new(GetAlleleTool::new(client.clone())));
    manager.register(Arc::new(GetRsidTool::new(client.clone())));
    manager.register(Arc::new(GetCaidTool::new(client)));
    manager.register(Arc::new(ListAnnotatorsTool::new(registry.clone())));
    manager.register(Arc::new(DescribeAnnotatorTool::new(registry)));
}
