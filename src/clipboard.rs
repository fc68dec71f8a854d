//! Clipboard abstraction so the reader can be driven in tests without a
//! display server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard error: {0}")]
    System(#[from] arboard::Error),
}

pub trait Clipboard: Send {
    fn set(&mut self, contents: &str) -> Result<(), ClipboardError>;
}

/// System clipboard using arboard. The handle is opened lazily on first use so
/// starting without a display does not fail until something is copied.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn ensure(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        Ok(self.inner.insert(clipboard))
    }
}

impl Clipboard for SystemClipboard {
    fn set(&mut self, contents: &str) -> Result<(), ClipboardError> {
        self.ensure()?.set_text(contents.to_string())?;
        Ok(())
    }
}
