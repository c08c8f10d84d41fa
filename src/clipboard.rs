use anyhow::{Context, Result};

/// System clipboard, opened on first use
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn ensure(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
            self.inner = Some(clipboard);
        }
        self.inner.as_mut().context("clipboard unavailable")
    }

    pub fn get(&mut self) -> Result<String> {
        self.ensure()?
            .get_text()
            .context("failed to read clipboard")
    }

    pub fn set(&mut self, contents: &str) -> Result<()> {
        self.ensure()?
            .set_text(contents.to_string())
            .context("failed to write clipboard")
    }
}
