//! A `Memcpy` wrapper that records every call.

use std::sync::Mutex;

use segio_memtype::{Memcpy, MemoryType};

/// One recorded `memcpy` call. Addresses are kept as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemcpyCall {
    pub dst: usize,
    pub dst_type: MemoryType,
    pub src: usize,
    pub src_type: MemoryType,
    pub len: usize,
}

/// Forwards every call to the inner `Memcpy` and records it.
pub struct RecordingMemcpy<M> {
    inner: M,
    calls: Mutex<Vec<MemcpyCall>>,
}

impl<M: Memcpy> RecordingMemcpy<M> {
    pub fn new(inner: M) -> Self {
        RecordingMemcpy {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls recorded so far, in call order.
    pub fn calls(&self) -> Vec<MemcpyCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Forgets the recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: Memcpy> Memcpy for RecordingMemcpy<M> {
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    ) {
        self.calls.lock().unwrap().push(MemcpyCall {
            dst: dst as usize,
            dst_type,
            src: src as usize,
            src_type,
            len,
        });
        unsafe { self.inner.memcpy(dst, dst_type, src, src_type, len) };
    }
}
