use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    backend::Terminal,
    error::{Error, Result},
    geom::Expanse,
    testing::grid::Grid,
};

/// A handle to everything written to a [`TestTerminal`].
#[derive(Debug, Default)]
pub struct TestBuf {
    /// Captured writes, one entry per terminal write.
    pub text: Vec<String>,
    /// Size reported to layout. `None` makes size queries fail.
    pub size: Option<Expanse>,
}

impl TestBuf {
    /// Return true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Return true if any write contains the provided substring.
    pub fn contains(&self, s: &str) -> bool {
        self.text.iter().any(|l| l.contains(s))
    }

    /// Forget captured writes.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Take captured writes, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<String> {
        mem::take(&mut self.text)
    }

    /// Replay every write onto a blank grid of the current size.
    pub fn grid(&self) -> Grid {
        let mut g = Grid::new(self.size.unwrap_or_default());
        for t in &self.text {
            g.apply(t);
        }
        g
    }
}

/// A terminal for tests that records writes and reports a configurable size.
#[derive(Debug, Clone)]
pub struct TestTerminal {
    /// Shared buffer of captured output.
    pub buf: Arc<Mutex<TestBuf>>,
}

impl TestTerminal {
    /// Create returns a `TestBuf` protected by a mutex, and a `TestTerminal`
    /// that reports `size` and writes into the buffer.
    pub fn create(size: Expanse) -> (Arc<Mutex<TestBuf>>, Self) {
        let tb = Arc::new(Mutex::new(TestBuf {
            text: Vec::new(),
            size: Some(size),
        }));
        (tb.clone(), Self { buf: tb })
    }

    /// Lock the shared buffer.
    fn lock(&self) -> MutexGuard<'_, TestBuf> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Terminal for TestTerminal {
    fn size(&self) -> Result<Expanse> {
        self.lock()
            .size
            .ok_or_else(|| Error::Terminal("no terminal size available".into()))
    }

    fn write(&self, out: &str) -> Result<()> {
        self.lock().text.push(out.to_string());
        Ok(())
    }
}
