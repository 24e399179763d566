use crate::coords::{ColorRgba, WindowSize};

/// Display session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub title: String,
    /// Initial window width in physical pixels.
    pub width: u32,
    /// Initial window height in physical pixels.
    pub height: u32,
    pub fullscreen: bool,
    /// Target logical aspect ratio; `None` follows the window.
    pub aspect: Option<f64>,
    pub clear_color: ColorRgba,
}

impl SessionConfig {
    #[inline]
    pub fn window_size(&self) -> WindowSize {
        WindowSize::new(self.width, self.height)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            title: "blitz".to_string(),
            width: 640,
            height: 480,
            fullscreen: false,
            aspect: None,
            clear_color: ColorRgba::BLACK,
        }
    }
}
