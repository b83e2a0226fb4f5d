//! The single in-order command stream: one command list, its queue and a fence.

use std::sync::Arc;

use crate::backend::{GpuBackend, GpuCommand, NativeCommandList, NativeFence};
use crate::error::RhiResult;

/// Command list plus submission fence.
///
/// Commands are recorded in call order. [`submit`](Self::submit) executes the
/// recorded list and signals a monotonically increasing fence value.
pub struct CommandStream {
    backend: Arc<dyn GpuBackend>,
    list: NativeCommandList,
    fence: NativeFence,
    last_signaled: u64,
    pending: usize,
}

impl CommandStream {
    pub(crate) fn new(backend: &Arc<dyn GpuBackend>) -> RhiResult<Self> {
        let list = backend.create_command_list()?;
        let fence = backend.create_fence()?;
        Ok(Self {
            backend: Arc::clone(backend),
            list,
            fence,
            last_signaled: 0,
            pending: 0,
        })
    }

    /// Record a command.
    pub fn record(&mut self, command: GpuCommand) {
        self.backend.record(self.list, command);
        self.pending += 1;
    }

    /// Number of commands recorded since the last submission.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Execute the recorded commands and signal the next fence value.
    pub fn submit(&mut self) -> RhiResult<u64> {
        self.backend.execute_command_list(self.list)?;
        self.last_signaled += 1;
        self.backend.signal(self.fence, self.last_signaled)?;
        self.pending = 0;
        Ok(self.last_signaled)
    }

    /// Block until the GPU reaches `value`.
    pub fn wait_for(&self, value: u64) -> RhiResult<()> {
        if value == 0 || self.backend.completed_value(self.fence) >= value {
            return Ok(());
        }
        self.backend.wait_for_fence(self.fence, value)?;
        Ok(())
    }

    /// Last fence value signaled by [`submit`](Self::submit).
    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    /// Last fence value the GPU completed.
    pub fn completed_value(&self) -> u64 {
        self.backend.completed_value(self.fence)
    }
}
