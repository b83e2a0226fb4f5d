//! Device configuration.

use crate::buffer::ConstantRing;

/// Number of slots in each descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorCapacities {
    pub shader_resource: u32,
    pub render_target: u32,
    pub depth_stencil: u32,
}

impl Default for DescriptorCapacities {
    fn default() -> Self {
        Self {
            shader_resource: 1024,
            render_target: 32,
            depth_stencil: 8,
        }
    }
}

/// Configuration for creating a [`Device`](crate::Device).
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Descriptor table sizes. Tables never grow.
    pub descriptor_capacities: DescriptorCapacities,
    /// Size in bytes of the constant ring used for per-draw constants.
    pub constant_ring_size: u64,
    /// Alignment of every constant buffer placed in the ring.
    pub constant_alignment: u64,
    /// Number of swapchain back buffers per viewport.
    pub back_buffer_count: u32,
    /// Vertical blanks to wait on present (0 disables vsync).
    pub sync_interval: u32,
    /// Ask the backend for its validation layer.
    pub debug_layer: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            descriptor_capacities: DescriptorCapacities::default(),
            constant_ring_size: 4 * 1024 * 1024,
            constant_alignment: ConstantRing::DEFAULT_ALIGNMENT,
            back_buffer_count: 2,
            sync_interval: 1,
            debug_layer: cfg!(debug_assertions),
        }
    }
}

impl DeviceConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the descriptor table sizes.
    pub fn with_descriptor_capacities(mut self, capacities: DescriptorCapacities) -> Self {
        self.descriptor_capacities = capacities;
        self
    }

    /// Set the constant ring size in bytes.
    pub fn with_constant_ring_size(mut self, size: u64) -> Self {
        self.constant_ring_size = size;
        self
    }

    /// Set the number of swapchain back buffers.
    pub fn with_back_buffer_count(mut self, count: u32) -> Self {
        self.back_buffer_count = count;
        self
    }

    /// Set the present sync interval.
    pub fn with_sync_interval(mut self, interval: u32) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Enable or disable the backend validation layer.
    pub fn with_debug_layer(mut self, enabled: bool) -> Self {
        self.debug_layer = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DeviceConfig::new()
            .with_constant_ring_size(4096)
            .with_back_buffer_count(3)
            .with_sync_interval(0);
        assert_eq!(config.constant_ring_size, 4096);
        assert_eq!(config.back_buffer_count, 3);
        assert_eq!(config.sync_interval, 0);
        assert_eq!(config.constant_alignment, ConstantRing::DEFAULT_ALIGNMENT);
        assert_eq!(ConstantRing::DEFAULT_ALIGNMENT, 256);
    }
}
