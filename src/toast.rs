use std::sync::Arc;
use std::time::Duration;

use crate::page::ToastSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Shows transient status messages. Every call schedules its own hide; a
/// newer message is not protected from an older call's pending hide.
#[derive(Clone)]
pub struct Toaster {
    surface: Option<Arc<dyn ToastSurface>>,
    duration: Duration,
}

impl Toaster {
    pub fn new(surface: Option<Arc<dyn ToastSurface>>, duration: Duration) -> Self {
        Self { surface, duration }
    }

    pub fn show(&self, kind: ToastKind, message: &str) {
        let Some(surface) = self.surface.clone() else {
            tracing::debug!("No toast element, dropping message: {message}");
            return;
        };

        surface.set_text(message);
        surface.set_error(kind == ToastKind::Error);
        surface.set_visible(true);

        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            surface.set_visible(false);
        });
    }

    pub fn success(&self, message: &str) {
        self.show(ToastKind::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.show(ToastKind::Error, message);
    }
}
