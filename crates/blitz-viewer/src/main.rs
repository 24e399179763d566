mod band;
mod cycle;

use anyhow::Result;
use clap::Parser;

use blitz_display::backend::NullRenderer;
use blitz_display::coords::ColorRgba;
use blitz_display::device::GpuInit;
use blitz_display::input::Key;
use blitz_display::logging::{init_logging, LoggingConfig};
use blitz_display::session::SessionConfig;
use blitz_display::window::Runtime;

use band::Letterbox;
use cycle::ColorCycle;

const PALETTE: [ColorRgba; 4] = [
    ColorRgba::new(0.05, 0.05, 0.10, 1.0),
    ColorRgba::new(0.10, 0.05, 0.20, 1.0),
    ColorRgba::new(0.20, 0.05, 0.10, 1.0),
    ColorRgba::new(0.05, 0.15, 0.10, 1.0),
];

/// Letterboxed test pattern for the blitz display loop.
#[derive(Parser, Debug)]
#[command(name = "blitz-viewer", version)]
struct Args {
    /// Stop after this many frames; runs until closed by default.
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let args = Args::parse();
    let config = SessionConfig {
        title: "blitz viewer".to_string(),
        aspect: Some(16.0 / 9.0),
        ..Default::default()
    };

    // The band pipeline draws without depth state.
    let gpu_init = GpuInit {
        depth_buffer: false,
        ..Default::default()
    };

    let frames = args.frames;
    Runtime::run(config, gpu_init, NullRenderer, move |session| {
        session.set_exit_handler(|| log::info!("viewer closed"));
        session.set_keyboard_handler(|ev, ctl| {
            if !ev.is_press() || ev.repeat {
                return;
            }
            if ev.key == Key::Escape || ev.is_char('q') {
                ctl.exit();
            } else if ev.key == Key::F(11) || ev.is_char('f') {
                ctl.toggle_fullscreen();
            }
        });
        session.set_render_gen(|| {
            Letterbox::new(ColorCycle::new(PALETTE.to_vec(), 90).with_limit(frames))
        });
        Ok(())
    })
}
