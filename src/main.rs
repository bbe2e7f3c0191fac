use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

use umbra::app::{run_headless, ViewerApp};
use umbra::config::{LightCapacity, RenderConfig};
use umbra::engine::window::GameWindow;
use umbra::error::{RenderError, Result};

#[derive(Parser)]
#[command(name = "umbra", about = "Shadow-mapped forward renderer demo")]
struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Side of the square directional shadow map in texels
    #[arg(long, default_value_t = 2048)]
    shadow_resolution: u32,

    /// Point light slots compiled into the shading program
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_point_lights: u32,

    /// Spot light slots compiled into the shading program
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_spot_lights: u32,

    /// Render without a window against an in-memory GPU
    #[arg(long)]
    headless: bool,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u32,
}

impl Args {
    fn config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            light_capacity: LightCapacity::new(self.max_point_lights as usize, self.max_spot_lights as usize),
            shadow_width: self.shadow_resolution.max(1),
            shadow_height: self.shadow_resolution.max(1),
            ..RenderConfig::default()
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.config();
    if args.headless {
        return run_headless(&config, args.frames);
    }

    let sdl = sdl2::init().map_err(RenderError::Window)?;
    let window = GameWindow::new(&sdl, "Umbra", config.window_width, config.window_height)?;
    let mut app = ViewerApp::new(&config)?;
    app.run(&sdl, &window)
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "umbra",
            "--shadow-resolution",
            "1024",
            "--max-point-lights",
            "5",
            "--headless",
        ]);
        let config = args.config();
        assert!(args.headless);
        assert_eq!((config.shadow_width, config.shadow_height), (1024, 1024));
        assert_eq!(config.light_capacity, LightCapacity { point: 5, spot: 3 });
        assert_eq!(config.window_width, 1280);
    }

    #[test]
    fn zero_light_slots_are_rejected() {
        assert!(Args::try_parse_from(["umbra", "--max-point-lights", "0"]).is_err());
        assert!(Args::try_parse_from(["umbra", "--max-spot-lights", "0"]).is_err());
        let args = Args::try_parse_from(["umbra", "--max-spot-lights", "1"]).unwrap();
        assert_eq!(args.config().light_capacity, LightCapacity { point: 3, spot: 1 });
    }
}
