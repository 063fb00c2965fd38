use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use tidewalk_common::Settings;
use tidewalk_locomotion::{Controls, Integrator, MoveKey, MoveState, Tuning};
use tidewalk_terrain::Heightfield;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tidewalk-cli", about = "CLI tools for tidewalk")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default settings
    Info {
        /// Write the default settings as YAML to this path
        #[arg(long)]
        dump: Option<PathBuf>,
    },
    /// Generate a terrain heightfield and save it as a JSON snapshot
    Bake {
        /// Grid vertices per side
        #[arg(long, default_value = "129")]
        size: usize,
        /// Half-extent of the island in world units
        #[arg(long, default_value = "50.0")]
        extent: f32,
        /// Generation seed
        #[arg(short, long, default_value = "7")]
        seed: u32,
        /// Output file
        #[arg(short, long, default_value = "terrain.json")]
        out: PathBuf,
    },
    /// Run the walker headless and print the trajectory
    Walk {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "120")]
        frames: u32,
        /// Frame delta in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Keys held for the whole run: any of w, a, s, d; j jumps on frame 0
        #[arg(short, long, default_value = "w")]
        keys: String,
        /// Settings file (YAML); defaults are used when absent
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

/// Headless stand-in for the camera: fixed yaw, position only.
struct Walker {
    position: Vec3,
    yaw: f32,
}

impl Walker {
    fn new(position: Vec3, yaw_deg: f32) -> Self {
        Self {
            position,
            yaw: yaw_deg.to_radians(),
        }
    }

    fn forward(&self) -> Vec3 {
        // Yaw 0 faces -z, matching the desktop camera.
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }
}

impl Controls for Walker {
    fn move_right(&mut self, distance: f32) {
        let f = self.forward();
        self.position += Vec3::new(-f.z, 0.0, f.x) * distance;
    }

    fn move_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_height(&mut self, y: f32) {
        self.position.y = y;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { dump } => {
            println!("tidewalk-cli v{}", env!("CARGO_PKG_VERSION"));
            let s = Settings::default();
            println!(
                "movement: damping={} accel={} gravity={} jump={}",
                s.movement.damping, s.movement.accel, s.movement.gravity, s.movement.jump_impulse
            );
            println!(
                "terrain: size={} extent={} seed={}",
                s.terrain.size, s.terrain.extent, s.terrain.seed
            );
            println!(
                "water: level={} distortion={}",
                s.water.level, s.water.distortion_scale
            );
            if let Some(path) = dump {
                s.save(&path)?;
                println!("defaults written to {}", path.display());
            }
        }
        Commands::Bake {
            size,
            extent,
            seed,
            out,
        } => {
            if size < 2 {
                anyhow::bail!("terrain size must be at least 2, got {size}");
            }
            let hf = Heightfield::generate(size, extent, seed);
            hf.save(&out)?;
            println!(
                "baked {}x{} terrain (extent {extent}, seed {seed}) to {}",
                size,
                size,
                out.display()
            );
        }
        Commands::Walk {
            frames,
            dt,
            keys,
            settings,
        } => {
            let settings = match &settings {
                Some(path) => match Settings::load(path) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(
                            "settings file {} unusable ({e}); using defaults",
                            path.display()
                        );
                        Settings::default()
                    }
                },
                None => Settings::default(),
            };
            let t = settings.terrain;
            let terrain = Heightfield::generate(t.size, t.extent, t.seed);

            let mut walker = Walker::new(settings.spawn.position_vec(), settings.spawn.yaw_deg);
            let mut integrator = Integrator::new(Tuning::from(settings.movement));
            let mut input = MoveState::default();
            for c in keys.chars() {
                match c {
                    'w' => input.on_key_down(MoveKey::Forward),
                    's' => input.on_key_down(MoveKey::Backward),
                    'a' => input.on_key_down(MoveKey::Left),
                    'd' => input.on_key_down(MoveKey::Right),
                    'j' => {}
                    other => anyhow::bail!("unknown key '{other}' (expected w/a/s/d/j)"),
                }
            }
            let jump = keys.contains('j');

            println!("frame,x,y,z,vx,vy,vz,grounded");
            for frame in 0..frames {
                integrator.step(&mut input, dt, &mut walker, &terrain);
                if frame == 0 && jump {
                    integrator.try_jump(&mut input);
                }
                let p = walker.position;
                let v = integrator.velocity();
                println!(
                    "{frame},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{}",
                    p.x, p.y, p.z, v.x, v.y, v.z, input.grounded
                );
            }
        }
    }

    Ok(())
}
