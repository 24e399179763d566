use std::collections::HashMap;

use super::Transform;

/// Physical window size in pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Cache key for a requested aspect ratio.
///
/// Aspect ratios are quantized to 1e-6 so that `4.0 / 3.0` computed in two
/// different places still lands on the same entry. Two requests closer than
/// that share a fit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AspectKey(i64);

impl AspectKey {
    const SCALE: f64 = 1_000_000.0;

    pub fn new(aspect: f64) -> Self {
        Self((aspect * Self::SCALE).round() as i64)
    }
}

/// Letterboxed viewport for one (window size, aspect) pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fit {
    /// Maps logical coordinates into NDC `[-1, 1]²`.
    pub transform: Transform,
    /// Fitted width in physical pixels.
    pub width: u32,
    /// Fitted height in physical pixels.
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Fit {
    /// Computes the fit of `aspect` inside `window`. Never crops.
    pub fn compute(window: WindowSize, aspect: f64) -> Self {
        assert!(window.is_valid(), "window size must be non-zero, got {window:?}");
        assert!(
            aspect.is_finite() && aspect > 0.0,
            "aspect ratio must be finite and positive, got {aspect}"
        );

        let (win_w, win_h) = (window.width, window.height);
        // Ties go to even, so a half-pixel fit never grows past the window.
        let (width, height) = if window.aspect() > aspect {
            ((aspect * win_h as f64).round_ties_even() as u32, win_h)
        } else {
            (win_w, (win_w as f64 / aspect).round_ties_even() as u32)
        };
        assert!(
            width > 0 && height > 0,
            "aspect {aspect} collapses inside {window:?} to {width}x{height}"
        );

        let offset_x = (win_w - width) / 2;
        let offset_y = (win_h - height) / 2;

        let mut transform = Transform::identity();
        transform.translate(-1.0, -1.0, 0.0);
        transform.scale(2.0 / win_w as f32, 2.0 / win_h as f32, 1.0);
        transform.translate(offset_x as f32, offset_y as f32, 0.0);
        // Square logical units: both axes scale by the fitted width.
        transform.scale(width as f32, width as f32, 1.0);

        Self {
            transform,
            width,
            height,
            offset_x,
            offset_y,
        }
    }
}

/// Aspect-fit calculator with per-window-size memoization.
///
/// Logical drawing space is `[0, 1] × [0, top]` where `top = height / width`;
/// one logical unit equals the fitted width in pixels.
#[derive(Debug, Clone)]
pub struct ViewportFitter {
    window: WindowSize,
    requested: Option<f64>,
    aspect: f64,
    current: Fit,

    cache_window: Option<WindowSize>,
    cache: HashMap<AspectKey, Fit>,
    misses: u64,
}

impl ViewportFitter {
    /// Creates a fitter for `window` and immediately fits `aspect`.
    ///
    /// Panics if `window` has a zero dimension.
    pub fn new(window: WindowSize, aspect: Option<f64>) -> Self {
        assert!(window.is_valid(), "window size must be non-zero, got {window:?}");
        let mut fitter = Self {
            window,
            requested: aspect,
            aspect: window.aspect(),
            current: Fit {
                transform: Transform::identity(),
                width: window.width,
                height: window.height,
                offset_x: 0,
                offset_y: 0,
            },
            cache_window: None,
            cache: HashMap::new(),
            misses: 0,
        };
        fitter.set_aspect(aspect);
        fitter
    }

    /// Selects the target aspect ratio and returns the resulting fit.
    ///
    /// `None` uses the window's own aspect ratio.
    pub fn set_aspect(&mut self, aspect: Option<f64>) -> &Fit {
        self.requested = aspect;
        let aspect = aspect.unwrap_or_else(|| self.window.aspect());
        self.aspect = aspect;

        if self.cache_window != Some(self.window) {
            if !self.cache.is_empty() {
                log::debug!(
                    "viewport cache invalidated ({} entries) for window {}x{}",
                    self.cache.len(),
                    self.window.width,
                    self.window.height
                );
            }
            self.cache.clear();
            self.cache_window = Some(self.window);
        }

        let key = AspectKey::new(aspect);
        if let Some(fit) = self.cache.get(&key) {
            self.current = *fit;
            return &self.current;
        }

        let fit = Fit::compute(self.window, aspect);
        self.misses += 1;
        log::trace!(
            "viewport fit aspect={aspect:.4} -> {}x{} at ({}, {})",
            fit.width,
            fit.height,
            fit.offset_x,
            fit.offset_y
        );
        self.cache.insert(key, fit);
        self.current = fit;
        &self.current
    }

    /// Records a new window size and refits with the requested aspect.
    ///
    /// Panics if `window` has a zero dimension; callers filter minimized
    /// windows before getting here.
    pub fn resize(&mut self, window: WindowSize) -> &Fit {
        assert!(window.is_valid(), "window size must be non-zero, got {window:?}");
        self.window = window;
        self.set_aspect(self.requested)
    }

    #[inline]
    pub fn window(&self) -> WindowSize {
        self.window
    }

    /// Aspect ratio the current fit was computed for.
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    #[inline]
    pub fn requested_aspect(&self) -> Option<f64> {
        self.requested
    }

    #[inline]
    pub fn fit(&self) -> &Fit {
        &self.current
    }

    #[inline]
    pub fn view_matrix(&self) -> &Transform {
        &self.current.transform
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.current.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.current.height
    }

    /// Logical vertical extent.
    #[inline]
    pub fn top(&self) -> f32 {
        self.current.height as f32 / self.current.width as f32
    }

    /// Snaps a logical coordinate to the pixel grid of the current fit.
    #[inline]
    pub fn round_coord(&self, c: f32) -> f32 {
        let w = self.current.width as f32;
        (c * w).round_ties_even() / w
    }

    /// Number of fits computed (cache misses) since creation.
    #[inline]
    pub fn cache_misses(&self) -> u64 {
        self.misses
    }

    #[inline]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
