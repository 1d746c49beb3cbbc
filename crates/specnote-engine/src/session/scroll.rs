/// Pixel slack when recognising the echo of a mirrored scroll.
const ECHO_TOLERANCE: f64 = 1.0;

/// Scroll geometry of one pane, as reported by its editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// How far the content can scroll; zero or less means not scrollable.
    pub fn scrollable(&self) -> f64 {
        self.scroll_height - self.client_height
    }

    /// Position as a fraction of the scrollable range, 0 when nothing scrolls.
    pub fn ratio(&self) -> f64 {
        let range = self.scrollable();
        if range <= 0.0 {
            0.0
        } else {
            self.scroll_top / range
        }
    }

    /// The `scroll_top` that puts this pane at `ratio`.
    pub fn scroll_top_at(&self, ratio: f64) -> f64 {
        ratio * self.scrollable()
    }
}

/// Per-pane view state. Two panes showing one document still scroll apart.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PaneView {
    pub(crate) metrics: Option<ScrollMetrics>,
    /// Position we last pushed into this pane and expect to hear back.
    echo: Option<f64>,
}

impl PaneView {
    /// Record a scroll event; returns false when it is our own mirrored write
    /// coming back and must not be mirrored again.
    pub(crate) fn observe(&mut self, metrics: ScrollMetrics) -> bool {
        self.metrics = Some(metrics);
        match self.echo.take() {
            Some(expected) if (expected - metrics.scroll_top).abs() <= ECHO_TOLERANCE => {
                log::debug!("Suppressing mirrored scroll echo at {expected}");
                false
            }
            _ => true,
        }
    }

    /// Move this pane to `ratio` of its range. `None` until the pane has
    /// reported its geometry at least once, or when it already sits at the
    /// target: writing the same position raises no scroll event, so no echo
    /// is expected either.
    pub(crate) fn mirror(&mut self, ratio: f64) -> Option<f64> {
        let metrics = self.metrics?;
        let target = metrics.scroll_top_at(ratio);
        if (target - metrics.scroll_top).abs() <= ECHO_TOLERANCE {
            self.echo = None;
            return None;
        }
        self.metrics = Some(ScrollMetrics {
            scroll_top: target,
            ..metrics
        });
        self.echo = Some(target);
        Some(target)
    }
}
