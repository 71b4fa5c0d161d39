use std::{
    sync::{
        Arc,
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::Duration,
};

use tracing::{debug, error};

use crate::core::world::Core;

/// Coalesces bursts of terminal resize notifications into a single
/// layout-and-redraw of the whole tree.
///
/// A background thread waits for a notification, then keeps absorbing
/// further notifications until none arrives for the configured debounce
/// period. Dropping the debouncer flushes any pending redraw and stops the
/// thread.
#[derive(Debug)]
pub struct ResizeDebouncer {
    /// Notification channel. Dropped first on shutdown.
    tx: Option<mpsc::Sender<()>>,
    /// Worker thread.
    handle: Option<thread::JoinHandle<()>>,
}

impl ResizeDebouncer {
    /// Start the worker for a core, using the core's debounce option.
    pub fn spawn(core: Arc<Core>) -> Self {
        let debounce = core.options().debounce;
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || Self::worker(&core, &rx, debounce));
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Record a resize. Cheap and non-blocking.
    pub fn notify(&self) {
        if let Some(tx) = &self.tx
            && tx.send(()).is_err()
        {
            debug!("resize worker has exited");
        }
    }

    /// Worker loop: wait, settle, redraw.
    fn worker(core: &Core, rx: &mpsc::Receiver<()>, debounce: Duration) {
        while rx.recv().is_ok() {
            let mut absorbed = 0;
            let closed = loop {
                match rx.recv_timeout(debounce) {
                    Ok(()) => absorbed += 1,
                    Err(RecvTimeoutError::Timeout) => break false,
                    Err(RecvTimeoutError::Disconnected) => break true,
                }
            };
            debug!(absorbed, "resize settled");
            if let Err(e) = core.redraw() {
                error!("redraw after resize failed: {e}");
            }
            if closed {
                return;
            }
        }
    }
}

impl Drop for ResizeDebouncer {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(h) = self.handle.take() {
            drop(h.join());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{
        error::Result, event::Event, geom::Expanse, options::Options,
        testing::backend::TestTerminal,
    };

    #[test]
    fn burst_yields_one_layout() -> Result<()> {
        let (buf, tt) = TestTerminal::create(Expanse::new(10, 2));
        let core = Arc::new(Core::with_options(
            tt,
            Options {
                debounce: Duration::from_millis(30),
                ..Options::default()
            },
        ));
        let layouts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&layouts);
        core.add_event_listener(core.root_id(), Event::LayoutUpdated, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        })?;

        let debouncer = ResizeDebouncer::spawn(Arc::clone(&core));
        buf.lock().unwrap().size = Some(Expanse::new(6, 3));
        for _ in 0..5 {
            debouncer.notify();
        }
        drop(debouncer);

        assert_eq!(layouts.load(Ordering::SeqCst), 1);
        assert_eq!(core.rect(core.root_id())?.width(), 6);
        assert!(!buf.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn drop_without_notifications() {
        let (_, tt) = TestTerminal::create(Expanse::new(1, 1));
        let core = Arc::new(Core::new(tt));
        let seen = Arc::new(Mutex::new(0));
        let s = Arc::clone(&seen);
        drop(core.add_event_listener(core.root_id(), Event::LayoutUpdated, move |_, _| {
            *s.lock().unwrap() += 1;
        }));
        drop(ResizeDebouncer::spawn(core));
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
