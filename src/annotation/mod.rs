// mod.rs - Structure annotation module

pub mod cache;
pub mod gpcrdb;
pub mod klifs;
pub mod services;
pub mod state;
pub mod traits;

// Re-export main types for convenience
pub use cache::{AnnotationCache, CachedAnnotations};
pub use gpcrdb::GpcrdbClient;
pub use klifs::KlifsClient;
pub use services::RemoteAnnotations;
pub use state::{GpcrState, KinaseConformation, StateSelector};
pub use traits::{AnnotationSource, GpcrAnnotation, KinaseAnnotation};
