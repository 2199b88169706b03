//! State shared between the two worker loops.
//!
//! The shutdown flag is the only cross-thread mutable state in the process.
//! It is set exactly once, either by the signal forwarder or by a worker
//! that hit an unrecoverable hardware error, and polled by both loops.

use std::sync::Mutex;

use crate::nixie::ColonMode;

#[derive(Debug)]
pub struct Context {
    /// How the display loop drives the colon lamps. Read-only to the
    /// workers; written only by whatever control surface constructs it.
    pub colon: ColonMode,

    shutdown: ShutdownFlag,
}

impl Context {
    pub fn new(colon: ColonMode) -> Self {
        Self {
            colon,
            shutdown: ShutdownFlag::default(),
        }
    }

    /// Idempotent: signalling an already-stopping process is a no-op.
    pub fn signal_shutdown(&self) {
        *self.shutdown.lock() = true;
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.lock()
    }
}

#[derive(Debug, Default)]
struct ShutdownFlag {
    kill: Mutex<bool>,
}

impl ShutdownFlag {
    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        // A poisoned set-true flag is still a valid flag.
        match self.kill.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_shutting_down() {
        let context = Context::new(ColonMode::On);
        assert!(!context.is_shutting_down());
    }

    #[test]
    fn signal_is_sticky_and_idempotent() {
        let context = Context::new(ColonMode::On);
        context.signal_shutdown();
        assert!(context.is_shutting_down());
        context.signal_shutdown();
        assert!(context.is_shutting_down());
    }

    #[test]
    fn visible_across_threads() {
        let context = std::sync::Arc::new(Context::new(ColonMode::Off));
        let signaller = std::sync::Arc::clone(&context);
        std::thread::spawn(move || signaller.signal_shutdown())
            .join()
            .unwrap();
        assert!(context.is_shutting_down());
    }
}
