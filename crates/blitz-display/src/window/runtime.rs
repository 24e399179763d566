use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::backend::Renderer;
use crate::coords::WindowSize;
use crate::core::LoopControl;
use crate::device::{Gpu, GpuInit, WgpuBackend};
use crate::input::{Key, KeyEvent, KeyState, Modifiers};
use crate::session::{DisplaySession, SessionConfig};

/// Session type driven by the [`Runtime`].
pub type WgpuSession<R> = DisplaySession<WgpuBackend, R>;

/// Entry point: opens one window and drives a [`DisplaySession`] on it.
pub struct Runtime;

impl Runtime {
    /// Runs until the frame source ends, an exit is requested, or the
    /// session fails.
    ///
    /// `setup` runs once the window and GPU exist; it installs the frame
    /// source and handlers. A session error is returned after the window
    /// closed.
    pub fn run<R, S>(config: SessionConfig, gpu_init: GpuInit, renderer: R, setup: S) -> Result<()>
    where
        R: Renderer + 'static,
        S: FnOnce(&mut WgpuSession<R>) -> Result<()> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState {
            config,
            gpu_init,
            pending: Some((renderer, setup)),
            entry: None,
            modifiers: Modifiers::default(),
            error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct WindowEntry<R: Renderer> {
    window: Arc<Window>,
    session: WgpuSession<R>,
}

struct RuntimeState<R, S>
where
    R: Renderer + 'static,
{
    config: SessionConfig,
    gpu_init: GpuInit,
    pending: Option<(R, S)>,
    entry: Option<WindowEntry<R>>,
    modifiers: Modifiers,
    error: Option<anyhow::Error>,
}

impl<R, S> RuntimeState<R, S>
where
    R: Renderer + 'static,
    S: FnOnce(&mut WgpuSession<R>) -> Result<()>,
{
    fn create_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some((renderer, setup)) = self.pending.take() else {
            return Ok(());
        };

        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        if self.config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(window.clone(), self.gpu_init.clone()))
            .context("GPU initialization failed")?;

        // The window manager may not honour the requested size.
        let size = window.inner_size();
        let config = SessionConfig {
            width: size.width,
            height: size.height,
            ..self.config.clone()
        };

        let mut session = DisplaySession::new(&config, WgpuBackend::new(gpu), renderer);
        session.initialize()?;
        setup(&mut session).context("session setup failed")?;

        window.request_redraw();
        self.entry = Some(WindowEntry { window, session });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }
}

impl<R, S> ApplicationHandler for RuntimeState<R, S>
where
    R: Renderer + 'static,
    S: FnOnce(&mut WgpuSession<R>) -> Result<()>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        if let Err(err) = self.create_entry(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                entry.session.queue_exit();
                entry.window.request_redraw();
            }

            WindowEvent::Resized(size) => {
                entry.session.backend_mut().resize(size);
                entry.session.resize(WindowSize::new(size.width, size.height));
                entry.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.window.inner_size();
                entry.session.backend_mut().resize(size);
                entry.session.resize(WindowSize::new(size.width, size.height));
            }

            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let key_event = KeyEvent {
                    key: map_key(&event.logical_key),
                    state: match event.state {
                        ElementState::Pressed => KeyState::Pressed,
                        ElementState::Released => KeyState::Released,
                    },
                    modifiers: self.modifiers,
                    repeat: event.repeat,
                };
                entry.session.handle_key(&key_event);
                apply_fullscreen(entry);
            }

            WindowEvent::RedrawRequested => {
                entry.window.pre_present_notify();
                match entry.session.step() {
                    Ok(LoopControl::Continue) => {
                        apply_fullscreen(entry);
                        entry.window.request_redraw();
                    }
                    Ok(LoopControl::Exit) => {
                        log::info!(
                            "render loop finished after {} frames",
                            entry.session.frames_presented()
                        );
                        event_loop.exit();
                    }
                    Err(err) => self.fail(event_loop, err),
                }
            }

            _ => {}
        }
    }
}

fn apply_fullscreen<R: Renderer>(entry: &mut WindowEntry<R>) {
    if let Some(on) = entry.session.take_fullscreen_change() {
        log::debug!("fullscreen {}", if on { "on" } else { "off" });
        entry
            .window
            .set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
    }
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => Key::Unknown,
            }
        }
        WinitKey::Named(named) => map_named_key(*named),
        _ => Key::Unknown,
    }
}

fn map_named_key(named: NamedKey) -> Key {
    match named {
        NamedKey::Escape => Key::Escape,
        NamedKey::Enter => Key::Enter,
        NamedKey::Tab => Key::Tab,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Space => Key::Space,

        NamedKey::Insert => Key::Insert,
        NamedKey::Delete => Key::Delete,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,

        NamedKey::ArrowUp => Key::ArrowUp,
        NamedKey::ArrowDown => Key::ArrowDown,
        NamedKey::ArrowLeft => Key::ArrowLeft,
        NamedKey::ArrowRight => Key::ArrowRight,

        NamedKey::F1 => Key::F(1),
        NamedKey::F2 => Key::F(2),
        NamedKey::F3 => Key::F(3),
        NamedKey::F4 => Key::F(4),
        NamedKey::F5 => Key::F(5),
        NamedKey::F6 => Key::F(6),
        NamedKey::F7 => Key::F(7),
        NamedKey::F8 => Key::F(8),
        NamedKey::F9 => Key::F(9),
        NamedKey::F10 => Key::F(10),
        NamedKey::F11 => Key::F(11),
        NamedKey::F12 => Key::F(12),

        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_char_maps_to_char() {
        assert_eq!(map_key(&WinitKey::Character("q".into())), Key::Char('q'));
    }

    #[test]
    fn multi_char_string_is_unknown() {
        assert_eq!(map_key(&WinitKey::Character("ab".into())), Key::Unknown);
    }

    #[test]
    fn named_keys_map() {
        assert_eq!(map_key(&WinitKey::Named(NamedKey::Escape)), Key::Escape);
        assert_eq!(map_key(&WinitKey::Named(NamedKey::F11)), Key::F(11));
        assert_eq!(map_key(&WinitKey::Named(NamedKey::MediaPlay)), Key::Unknown);
    }
}
