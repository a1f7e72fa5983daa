//! `Memcpy`: copying bytes between memory domains.

use std::{fmt, sync::Arc};

use crate::{MemoryDetect, MemoryType};

/// A synchronous copy service parametrized by the memory types of both sides.
///
/// The copy is complete when `memcpy` returns. Implementations have no recoverable
/// error path: a copy route they cannot serve (e.g. device memory handed to a
/// host-only engine) is a programming error and panics.
///
/// A side passed as [`MemoryType::Unknown`] means "route by address": the
/// implementation is expected to determine the memory type of that side itself.
pub trait Memcpy: Send + Sync {
    /// Copies `len` bytes from `src` to `dst`.
    ///
    /// # Safety
    ///
    /// - `src` must be valid for reads of `len` bytes in the memory domain described
    ///   by `src_type`.
    /// - `dst` must be valid for writes of `len` bytes in the memory domain described
    ///   by `dst_type`.
    /// - The two regions must not overlap.
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    );
}

impl<T: Memcpy + ?Sized> Memcpy for &T {
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    ) {
        unsafe { (**self).memcpy(dst, dst_type, src, src_type, len) }
    }
}

impl<T: Memcpy + ?Sized> Memcpy for Box<T> {
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    ) {
        unsafe { (**self).memcpy(dst, dst_type, src, src_type, len) }
    }
}

impl<T: Memcpy + ?Sized> Memcpy for Arc<T> {
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    ) {
        unsafe { (**self).memcpy(dst, dst_type, src, src_type, len) }
    }
}

/// Plain CPU copy. Serves host-accessible memory only; `Unknown` sides are assumed
/// to be host memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMemcpy;

impl Memcpy for HostMemcpy {
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    ) {
        assert!(
            is_host_side(dst_type) && is_host_side(src_type),
            "HostMemcpy cannot copy {src_type} -> {dst_type} memory"
        );
        if len != 0 {
            unsafe { std::ptr::copy_nonoverlapping(src, dst, len) };
        }
    }
}

#[inline]
fn is_host_side(t: MemoryType) -> bool {
    t == MemoryType::Unknown || t.is_host_accessible()
}

/// A `Memcpy` that routes each copy to a per-memory-type engine.
///
/// Host-to-host copies (including managed memory) are performed directly. A copy
/// with a device-only side goes to the engine registered for that side's memory
/// type; when both sides are device memory, the destination's engine is used.
///
/// `Unknown` sides are resolved through the optional resolver. Sides that remain
/// unresolved are treated as host memory.
pub struct DispatchMemcpy {
    engines: [Option<Arc<dyn Memcpy>>; MemoryType::COUNT],
    resolver: Option<Arc<dyn MemoryDetect>>,
}

impl DispatchMemcpy {
    /// A dispatcher with no engines and no resolver: copies host memory only.
    pub fn host_only() -> DispatchMemcpy {
        Self::builder().build()
    }

    pub fn builder() -> DispatchMemcpyBuilder {
        Default::default()
    }

    /// Returns `true` if an engine is registered for `memory_type`.
    pub fn has_engine(&self, memory_type: MemoryType) -> bool {
        self.engines[memory_type.index()].is_some()
    }

    fn resolve(&self, ptr: *const u8, len: usize, memory_type: MemoryType) -> MemoryType {
        if memory_type != MemoryType::Unknown {
            return memory_type;
        }
        let Some(resolver) = self.resolver.as_ref() else {
            return MemoryType::Host;
        };
        match resolver.detect(ptr, len) {
            Ok(info) if info.memory_type != MemoryType::Unknown => info.memory_type,
            Ok(_) => MemoryType::Host,
            Err(e) => {
                log::debug!("memcpy: cannot resolve {len} bytes at {ptr:p} ({e}), assuming host");
                MemoryType::Host
            }
        }
    }
}

impl Memcpy for DispatchMemcpy {
    unsafe fn memcpy(
        &self,
        dst: *mut u8,
        dst_type: MemoryType,
        src: *const u8,
        src_type: MemoryType,
        len: usize,
    ) {
        if len == 0 {
            return;
        }
        let dst_type = self.resolve(dst, len, dst_type);
        let src_type = self.resolve(src, len, src_type);

        if dst_type.is_host_accessible() && src_type.is_host_accessible() {
            unsafe { std::ptr::copy_nonoverlapping(src, dst, len) };
            return;
        }

        let engine_type = if dst_type.is_host_accessible() {
            src_type
        } else {
            dst_type
        };
        let Some(engine) = self.engines[engine_type.index()].as_ref() else {
            panic!("no copy engine registered for {engine_type} memory ({src_type} -> {dst_type})");
        };
        unsafe { engine.memcpy(dst, dst_type, src, src_type, len) };
    }
}

impl fmt::Debug for DispatchMemcpy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engines = MemoryType::ALL
            .iter()
            .filter(|t| self.has_engine(**t))
            .collect::<Vec<_>>();
        f.debug_struct("DispatchMemcpy")
            .field("engines", &engines)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

#[derive(Default)]
pub struct DispatchMemcpyBuilder {
    engines: [Option<Arc<dyn Memcpy>>; MemoryType::COUNT],
    resolver: Option<Arc<dyn MemoryDetect>>,
}

impl DispatchMemcpyBuilder {
    /// Registers the copy engine for `memory_type`, replacing any previous one.
    pub fn engine(mut self, memory_type: MemoryType, engine: Arc<dyn Memcpy>) -> Self {
        self.engines[memory_type.index()] = Some(engine);
        self
    }

    /// Sets the service used to resolve `Unknown` sides by address.
    pub fn resolver(mut self, resolver: Arc<dyn MemoryDetect>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> DispatchMemcpy {
        DispatchMemcpy {
            engines: self.engines,
            resolver: self.resolver,
        }
    }
}
