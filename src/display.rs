//! Live view and the cancellation key

use anyhow::{Context, Result};
use opencv::{core::Mat, highgui};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Cancellation raised outside the loop (Ctrl-C), honoured at the next
/// outer iteration like the `q` key.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise this flag on SIGINT instead of killing the process, so that
    /// the camera, pins and window are released by their destructors.
    pub fn install_ctrlc_handler(&self) -> Result<()> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received, stopping after the current cycle");
            flag.raise();
        })
        .context("Failed to install Ctrl-C handler")
    }
}

/// Shows annotated frames and reports whether the operator asked to stop
pub trait Display {
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// Polled once per outer iteration.
    fn cancel_requested(&mut self) -> Result<bool>;
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        (**self).show(frame)
    }

    fn cancel_requested(&mut self) -> Result<bool> {
        (**self).cancel_requested()
    }
}

/// OpenCV window; `q` or the cancel flag stops the run. Windows are
/// destroyed on drop.
pub struct WindowDisplay {
    title: String,
    cancel: CancelFlag,
}

impl WindowDisplay {
    pub fn open(title: &str, cancel: CancelFlag) -> Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
            .with_context(|| format!("Failed to open window '{}'", title))?;
        Ok(Self {
            title: title.to_string(),
            cancel,
        })
    }
}

impl Display for WindowDisplay {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.title, frame).context("Failed to show frame")
    }

    fn cancel_requested(&mut self) -> Result<bool> {
        let key = highgui::wait_key(1)?;
        Ok((key & 0xFF) == i32::from(b'q') || self.cancel.is_raised())
    }
}

impl Drop for WindowDisplay {
    fn drop(&mut self) {
        if highgui::destroy_all_windows().is_ok() {
            info!("Display closed");
        }
    }
}

/// No window; only the cancel flag or the cycle limit stops the run.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    cancel: CancelFlag,
}

impl HeadlessDisplay {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { cancel }
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, _frame: &Mat) -> Result<()> {
        Ok(())
    }

    fn cancel_requested(&mut self) -> Result<bool> {
        Ok(self.cancel.is_raised())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_follows_flag() -> Result<()> {
        let flag = CancelFlag::new();
        let mut display = HeadlessDisplay::new(flag.clone());

        assert!(!display.cancel_requested()?);
        flag.raise();
        assert!(display.cancel_requested()?);
        // Stays raised.
        assert!(display.cancel_requested()?);
        Ok(())
    }
}
