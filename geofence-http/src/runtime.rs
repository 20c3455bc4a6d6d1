//! Bridge from the synchronous `Transport`/`EventSink` traits to async reqwest.

use std::future::Future;

use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Owned current-thread runtime, bypassed when the caller already runs inside
/// a multi-threaded Tokio runtime.
pub(crate) struct BlockingRuntime {
    runtime: Runtime,
}

impl BlockingRuntime {
    pub(crate) fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    /// Drive `future` to completion from synchronous code.
    ///
    /// Inside a multi-threaded runtime the caller's handle is used through
    /// `block_in_place`. Anywhere else, including a `current_thread` runtime
    /// where `block_in_place` would panic, the owned runtime is used.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl std::fmt::Debug for BlockingRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<tokio::runtime::Runtime>")
    }
}
