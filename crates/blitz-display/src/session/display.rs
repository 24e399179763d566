use std::time::Instant;

use anyhow::{Context, Result};

use crate::backend::{BlendFactor, ClearBuffers, GraphicsBackend, Renderer, UniformLocation};
use crate::coords::{ColorRgba, Fit, Transform, ViewportFitter, WindowSize};
use crate::core::{Command, FrameCtx, LoopControl, SessionCtl};
use crate::frames::{from_fn, Advance, FrameScheduler, FrameSource};
use crate::input::KeyEvent;
use crate::time::{FrameClock, FrameTime, LoopTimer};

use super::SessionConfig;

/// Session lifecycle.
///
/// `Running -> ExitRequested -> Terminated`; there is no way back.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lifecycle {
    Running,
    ExitRequested,
    Terminated,
}

type ExitHandler = Box<dyn FnOnce()>;
type KeyboardHandler = Box<dyn FnMut(&KeyEvent, &mut SessionCtl)>;

/// Render loop driver for one window.
///
/// Owns the letterboxing state, the frame scheduler and the lifecycle hooks,
/// and talks to the graphics API only through `B`. Everything here runs on the
/// thread that owns the window.
pub struct DisplaySession<B: GraphicsBackend, R: Renderer> {
    backend:  B,
    renderer: R,

    viewport:    ViewportFitter,
    matrix:      Transform,
    clear_color: ColorRgba,

    scheduler: FrameScheduler<B>,
    clock:     FrameClock,
    timer:     LoopTimer,
    last_time: Option<FrameTime>,
    presented: u64,

    lifecycle:    Lifecycle,
    exit_handler: Option<ExitHandler>,
    kbd_handler:  Option<KeyboardHandler>,
    ctl:          SessionCtl,

    fullscreen: bool,
    fullscreen_changed: bool,
}

impl<B: GraphicsBackend, R: Renderer> DisplaySession<B, R> {
    pub fn new(config: &SessionConfig, backend: B, renderer: R) -> Self {
        Self {
            backend,
            renderer,
            viewport: ViewportFitter::new(config.window_size(), config.aspect),
            matrix: Transform::identity(),
            clear_color: config.clear_color,
            scheduler: FrameScheduler::new(),
            clock: FrameClock::new(),
            timer: LoopTimer::new(),
            last_time: None,
            presented: 0,
            lifecycle: Lifecycle::Running,
            exit_handler: None,
            kbd_handler: None,
            ctl: SessionCtl::default(),
            fullscreen: config.fullscreen,
            fullscreen_changed: false,
        }
    }

    /// Sets up the common pipeline state: texture unit 0 and premultiplied
    /// alpha blending.
    pub fn initialize(&mut self) -> Result<()> {
        self.backend
            .active_texture(0)
            .context("failed to select texture unit 0")?;
        self.backend
            .blend_func(BlendFactor::One, BlendFactor::OneMinusSrcAlpha)
            .context("failed to set blend function")?;
        self.backend.enable_blend().context("failed to enable blending")?;
        Ok(())
    }

    // ── frame source ──────────────────────────────────────────────────────

    /// Installs the frame source built by `factory`, discarding the old one.
    pub fn set_render_gen<F, S>(&mut self, factory: F)
    where
        F: FnOnce() -> S,
        S: FrameSource<B> + 'static,
    {
        self.scheduler.set_source(Box::new(factory()));
    }

    /// Installs a closure as the frame source.
    pub fn set_render_fn<F>(&mut self, f: F)
    where
        F: FnMut(&mut FrameCtx<'_, B>) -> Result<Advance> + 'static,
        B: 'static,
    {
        self.scheduler.set_source(Box::new(from_fn::<B, F>(f)));
    }

    #[inline]
    pub fn has_render_gen(&self) -> bool {
        self.scheduler.is_active()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    pub fn set_keyboard_handler<F>(&mut self, f: F)
    where
        F: FnMut(&KeyEvent, &mut SessionCtl) + 'static,
    {
        self.kbd_handler = Some(Box::new(f));
    }

    /// Registers the callback run by [`do_exit`](Self::do_exit). It runs at most once.
    pub fn set_exit_handler<F>(&mut self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.exit_handler = Some(Box::new(f));
    }

    /// Asks the loop to stop at the next iteration boundary. Idempotent.
    pub fn queue_exit(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            log::debug!("exit requested");
            self.lifecycle = Lifecycle::ExitRequested;
        }
    }

    /// Runs the exit handler (if still registered) and terminates the session.
    pub fn do_exit(&mut self) {
        if let Some(handler) = self.exit_handler.take() {
            log::debug!("running exit handler");
            handler();
        }
        self.lifecycle = Lifecycle::Terminated;
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn exit_requested(&self) -> bool {
        self.lifecycle != Lifecycle::Running
    }

    /// Delivers a key event to the keyboard handler, if any.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let Some(handler) = self.kbd_handler.as_mut() {
            handler(event, &mut self.ctl);
        }
        self.apply_commands();
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.fullscreen_changed = true;
    }

    #[inline]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Returns the new fullscreen flag if it changed since the last call.
    pub fn take_fullscreen_change(&mut self) -> Option<bool> {
        std::mem::take(&mut self.fullscreen_changed).then_some(self.fullscreen)
    }

    // ── viewport ──────────────────────────────────────────────────────────

    /// Records a new window size reported by the backend.
    ///
    /// Zero-sized windows (minimized) are ignored.
    pub fn resize(&mut self, size: WindowSize) {
        if !size.is_valid() {
            log::debug!("ignoring resize to {}x{}", size.width, size.height);
            return;
        }
        if size != self.viewport.window() {
            let fit = self.viewport.resize(size);
            log::debug!(
                "window {}x{} -> viewport {}x{} at ({}, {})",
                size.width,
                size.height,
                fit.width,
                fit.height,
                fit.offset_x,
                fit.offset_y
            );
        }
    }

    pub fn set_aspect(&mut self, aspect: Option<f64>) -> &Fit {
        self.viewport.set_aspect(aspect)
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportFitter {
        &self.viewport
    }

    #[inline]
    pub fn window_size(&self) -> WindowSize {
        self.viewport.window()
    }

    /// Fitted width in pixels; one logical unit.
    #[inline]
    pub fn width(&self) -> u32 {
        self.viewport.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.viewport.height()
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.viewport.top()
    }

    #[inline]
    pub fn round_coord(&self, c: f32) -> f32 {
        self.viewport.round_coord(c)
    }

    /// Uploads `view * matrix` to `uniform`.
    pub fn commit_matrix(&mut self, uniform: UniformLocation) -> Result<()> {
        let m = *self.viewport.view_matrix() * self.matrix;
        self.backend.uniform_matrix4(uniform, m.as_cols())
    }

    #[inline]
    pub fn matrix_mut(&mut self) -> &mut Transform {
        &mut self.matrix
    }

    // ── misc state ────────────────────────────────────────────────────────

    #[inline]
    pub fn clear_color(&self) -> ColorRgba {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: ColorRgba) {
        debug_assert!(color.is_finite(), "non-finite clear color {color:?}");
        self.clear_color = color;
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Timing of the most recent frame.
    #[inline]
    pub fn frame_time(&self) -> Option<FrameTime> {
        self.last_time
    }

    #[inline]
    pub fn fps(&self) -> Option<f32> {
        self.clock.fps()
    }

    /// Frames swapped to the display since creation.
    #[inline]
    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Timing diagnostic: `[since_iteration_ms since_last_ms] msg`.
    pub fn log(&mut self, msg: &str) -> String {
        self.timer.log(msg)
    }

    // ── loop ──────────────────────────────────────────────────────────────

    /// Runs iterations until the frame source ends or an exit is requested.
    pub fn main_loop(&mut self) -> Result<()> {
        log::debug!("main loop started");
        let first = self.presented;
        while self.step()? == LoopControl::Continue {}
        log::debug!("main loop finished after {} frames", self.presented - first);
        Ok(())
    }

    /// Runs one loop iteration: clear, advance the frame source, clean up, swap.
    ///
    /// Returns [`LoopControl::Exit`] when the session terminated or the frame
    /// source is exhausted. The iteration that finds the source exhausted has
    /// already cleared but does not swap.
    pub fn step(&mut self) -> Result<LoopControl> {
        self.apply_commands();
        match self.lifecycle {
            Lifecycle::Running => {}
            Lifecycle::ExitRequested => {
                self.do_exit();
                return Ok(LoopControl::Exit);
            }
            Lifecycle::Terminated => return Ok(LoopControl::Exit),
        }

        if self.render()? == Advance::EndOfSequence {
            return Ok(LoopControl::Exit);
        }

        self.backend.swap_buffers().context("failed to swap buffers")?;
        self.presented += 1;

        self.apply_commands();
        Ok(LoopControl::Continue)
    }

    fn render(&mut self) -> Result<Advance> {
        let now = Instant::now();
        self.timer.mark_iteration(now);
        let time = self.clock.tick_at(now);
        self.last_time = Some(time);

        self.matrix.reset();

        self.backend
            .clear_color(self.clear_color)
            .context("failed to set clear color")?;
        self.backend
            .clear(ClearBuffers::COLOR_DEPTH)
            .context("failed to clear buffers")?;

        let mut ctx = FrameCtx {
            backend: &mut self.backend,
            renderer: &mut self.renderer,
            matrix: &mut self.matrix,
            viewport: &mut self.viewport,
            timer: &mut self.timer,
            ctl: &mut self.ctl,
            time,
        };
        let advance = self.scheduler.advance(&mut ctx)?;

        if advance == Advance::Frame {
            self.renderer.cleanup();
        }
        Ok(advance)
    }

    fn apply_commands(&mut self) {
        let mut ctl = std::mem::take(&mut self.ctl);
        for cmd in ctl.drain() {
            match cmd {
                Command::Exit => self.queue_exit(),
                Command::ToggleFullscreen => self.toggle_fullscreen(),
                Command::SetClearColor(color) => self.set_clear_color(color),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use anyhow::bail;

    use super::*;
    use crate::input::Key;
    use crate::testing::{Call, CountingRenderer, RecordingBackend};

    type Session = DisplaySession<RecordingBackend, CountingRenderer>;

    fn session() -> Session {
        DisplaySession::new(
            &SessionConfig::default(),
            RecordingBackend::default(),
            CountingRenderer::default(),
        )
    }

    /// Draws `total` frames, uploading the matrix once per frame.
    struct Steps {
        left: u32,
    }

    impl FrameSource<RecordingBackend> for Steps {
        fn next_frame(&mut self, ctx: &mut FrameCtx<'_, RecordingBackend>) -> Result<Advance> {
            if self.left == 0 {
                return Ok(Advance::EndOfSequence);
            }
            self.left -= 1;
            ctx.commit_matrix(UniformLocation(0))?;
            Ok(Advance::Frame)
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move || h.set(h.get() + 1))
    }

    // ── main loop ─────────────────────────────────────────────────────────

    #[test]
    fn three_step_sequence_runs_three_cycles() {
        let mut s = session();
        s.set_render_gen(|| Steps { left: 3 });
        s.main_loop().unwrap();

        let b = s.backend();
        assert_eq!(b.swaps(), 3);
        assert_eq!(b.uploads().len(), 3);
        assert_eq!(s.renderer().cleanups, 3);
        assert_eq!(s.frames_presented(), 3);
        // The fourth iteration clears, then finds the sequence exhausted.
        assert_eq!(b.clears(), 4);
        assert_eq!(s.lifecycle(), Lifecycle::Running);
        assert!(!s.has_render_gen());
    }

    #[test]
    fn iteration_order_is_clear_draw_swap() {
        let mut s = session();
        s.set_render_gen(|| Steps { left: 1 });
        assert_eq!(s.step().unwrap(), LoopControl::Continue);

        let calls = &s.backend().calls;
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::ClearColor(ColorRgba::BLACK));
        assert_eq!(calls[1], Call::Clear(ClearBuffers::COLOR_DEPTH));
        assert!(matches!(calls[2], Call::UniformMatrix4(UniformLocation(0), _)));
        assert_eq!(calls[3], Call::Swap);
    }

    #[test]
    fn no_source_ends_immediately() {
        let mut s = session();
        s.main_loop().unwrap();
        assert_eq!(s.backend().swaps(), 0);
        assert_eq!(s.renderer().cleanups, 0);
    }

    #[test]
    fn new_source_resumes_after_end_of_sequence() {
        let mut s = session();
        s.set_render_gen(|| Steps { left: 2 });
        s.main_loop().unwrap();
        s.set_render_gen(|| Steps { left: 1 });
        s.main_loop().unwrap();
        assert_eq!(s.backend().swaps(), 3);
    }

    #[test]
    fn replacing_source_discards_old_state() {
        let mut s = session();
        s.set_render_gen(|| Steps { left: 100 });
        s.step().unwrap();
        s.set_render_gen(|| Steps { left: 1 });
        s.main_loop().unwrap();
        assert_eq!(s.backend().swaps(), 2);
    }

    #[test]
    fn working_matrix_is_reset_every_frame() {
        let mut s = session();
        s.set_render_fn(|ctx| {
            assert!(ctx.matrix.is_identity());
            ctx.matrix.translate(0.25, 0.0, 0.0);
            ctx.commit_matrix(UniformLocation(3))?;
            Ok(if ctx.time.frame_index < 2 { Advance::Frame } else { Advance::EndOfSequence })
        });
        s.main_loop().unwrap();

        let expected = *s.viewport().view_matrix() * Transform::translation(0.25, 0.0, 0.0);
        let uploads = s.backend().uploads();
        assert_eq!(uploads.len(), 3);
        assert!(uploads.iter().all(|m| *m == expected.to_cols_array()));
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn frame_error_propagates_without_swap() {
        let mut s = session();
        s.set_render_fn(|_ctx| bail!("shader exploded"));
        let err = s.main_loop().unwrap_err();
        assert_eq!(err.to_string(), "shader exploded");
        assert_eq!(s.backend().swaps(), 0);
        assert_eq!(s.renderer().cleanups, 0);
    }

    #[test]
    fn swap_error_propagates_with_context() {
        let mut s = session();
        s.backend_mut().fail_swap = true;
        s.set_render_gen(|| Steps { left: 5 });
        let err = s.step().unwrap_err();
        assert_eq!(err.to_string(), "failed to swap buffers");
        assert_eq!(format!("{err:#}"), "failed to swap buffers: swap chain lost");
    }

    // ── exit ──────────────────────────────────────────────────────────────

    #[test]
    fn queue_exit_stops_loop_and_fires_handler_once() {
        let mut s = session();
        let (hits, handler) = counter();
        s.set_exit_handler(handler);
        s.set_render_gen(|| Steps { left: u32::MAX });

        assert_eq!(s.step().unwrap(), LoopControl::Continue);
        s.queue_exit();
        s.queue_exit();
        assert_eq!(s.lifecycle(), Lifecycle::ExitRequested);

        assert_eq!(s.step().unwrap(), LoopControl::Exit);
        assert_eq!(s.lifecycle(), Lifecycle::Terminated);
        assert_eq!(hits.get(), 1);

        s.do_exit();
        s.do_exit();
        assert_eq!(hits.get(), 1);
        assert_eq!(s.step().unwrap(), LoopControl::Exit);
        assert_eq!(s.backend().swaps(), 1);
    }

    #[test]
    fn exit_from_frame_waits_for_swap() {
        let mut s = session();
        let (hits, handler) = counter();
        s.set_exit_handler(handler);
        s.set_render_fn(|ctx| {
            ctx.ctl.exit();
            Ok(Advance::Frame)
        });
        s.main_loop().unwrap();

        assert_eq!(s.backend().swaps(), 1);
        assert_eq!(s.renderer().cleanups, 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(s.lifecycle(), Lifecycle::Terminated);
    }

    #[test]
    fn queue_exit_after_termination_is_noop() {
        let mut s = session();
        s.do_exit();
        s.queue_exit();
        assert_eq!(s.lifecycle(), Lifecycle::Terminated);
    }

    // ── input ─────────────────────────────────────────────────────────────

    #[test]
    fn keyboard_handler_can_request_exit() {
        let mut s = session();
        let seen = Rc::new(Cell::new(0));
        let seen2 = seen.clone();
        s.set_keyboard_handler(move |ev, ctl| {
            seen2.set(seen2.get() + 1);
            if ev.key == Key::Escape {
                ctl.exit();
            }
        });

        s.handle_key(&KeyEvent::pressed(Key::Char('a')));
        assert_eq!(s.lifecycle(), Lifecycle::Running);
        s.handle_key(&KeyEvent::pressed(Key::Escape));
        assert_eq!(s.lifecycle(), Lifecycle::ExitRequested);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn key_without_handler_is_ignored() {
        let mut s = session();
        s.handle_key(&KeyEvent::pressed(Key::Escape));
        assert_eq!(s.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn fullscreen_toggle_is_reported_once() {
        let mut s = session();
        s.set_keyboard_handler(|ev, ctl| {
            if ev.is_char('f') {
                ctl.toggle_fullscreen();
            }
        });
        s.handle_key(&KeyEvent::pressed(Key::Char('F')));
        assert!(s.is_fullscreen());
        assert_eq!(s.take_fullscreen_change(), Some(true));
        assert_eq!(s.take_fullscreen_change(), None);
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[test]
    fn initialize_sets_common_state() {
        let mut s = session();
        s.initialize().unwrap();
        assert_eq!(
            s.backend().calls,
            vec![
                Call::ActiveTexture(0),
                Call::BlendFunc(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
                Call::EnableBlend,
            ]
        );
    }

    #[test]
    fn clear_color_change_applies_next_frame() {
        let red = ColorRgba::new(1.0, 0.0, 0.0, 1.0);
        let mut s = session();
        s.set_render_fn(move |ctx| {
            ctx.ctl.set_clear_color(red);
            Ok(Advance::Frame)
        });
        s.step().unwrap();
        s.step().unwrap();

        let colors: Vec<_> = s
            .backend()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::ClearColor(c) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![ColorRgba::BLACK, red]);
    }

    #[test]
    fn resize_refits_viewport() {
        let mut s = DisplaySession::new(
            &SessionConfig { aspect: Some(4.0 / 3.0), ..Default::default() },
            RecordingBackend::default(),
            CountingRenderer::default(),
        );
        assert_eq!((s.width(), s.height()), (640, 480));

        s.resize(WindowSize::new(1920, 1080));
        assert_eq!((s.width(), s.height()), (1440, 1080));
        assert_eq!(s.viewport().fit().offset_x, 240);
        assert!((s.top() - 0.75).abs() < 1e-6);

        s.resize(WindowSize::new(0, 0));
        assert_eq!(s.window_size(), WindowSize::new(1920, 1080));
    }

    #[test]
    fn log_line_has_two_timestamps() {
        let mut s = session();
        let line = s.log("lyrics laid out");
        assert!(line.starts_with('['), "{line}");
        assert!(line.ends_with("] lyrics laid out"), "{line}");
    }
}
