//! Clipboard backends for row copy.

use std::cell::RefCell;
use std::rc::Rc;

use futebol_core::table::Clipboard;

/// The OS clipboard. Headless sessions (no display server) get a clipboard
/// that reports every copy as failed instead of aborting startup.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                tracing::warn!(error = %e, "system clipboard unavailable");
                None
            }
        };
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        match &mut self.inner {
            Some(cb) => cb.set_text(text.to_owned()).map_err(|e| e.to_string()),
            None => Err("clipboard unavailable".to_string()),
        }
    }
}

/// Keeps copies in memory; clones share the same history, so a test can
/// hand one to the app and inspect the other.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    copies: Rc<RefCell<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn copies(&self) -> Vec<String> {
        self.copies.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.copies.borrow().last().cloned()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        self.copies.borrow_mut().push(text.to_owned());
        Ok(())
    }
}
