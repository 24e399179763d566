use crate::coords::ColorRgba;

/// Whether the render loop should keep going after an iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Command buffer handed to frame steps and input handlers.
///
/// Commands are applied by the session at the next iteration boundary, never
/// in the middle of a frame.
#[derive(Debug, Default)]
pub struct SessionCtl {
    commands: Vec<Command>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Command {
    Exit,
    ToggleFullscreen,
    SetClearColor(ColorRgba),
}

impl SessionCtl {
    /// Requests a clean shutdown after the current frame.
    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.commands.push(Command::ToggleFullscreen);
    }

    /// Changes the clear color, effective from the next frame.
    pub fn set_clear_color(&mut self, color: ColorRgba) {
        self.commands.push(Command::SetClearColor(color));
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.commands.drain(..)
    }
}
