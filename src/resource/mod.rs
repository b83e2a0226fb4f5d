//! GPU resources and their ownership discipline.

mod gpu_resource;
mod ownership;

pub use gpu_resource::GpuResource;
pub use ownership::{OwnershipMode, ResourceOwner};
