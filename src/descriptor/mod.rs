//! Descriptor slot tables and the views written into them.

mod allocator;
mod view;

pub use allocator::DescriptorAllocator;
pub use view::View;
