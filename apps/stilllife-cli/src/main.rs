use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use stilllife_assets::TEXTURE_CAPACITY;
use stilllife_input::ViewState;
use stilllife_render::{MeshKind, RecordingBackend};
use stilllife_scene::{SceneComposer, SceneConfig, SpinMode, still_life};
use stilllife_tools::{ObjectInfo, SceneInspector, SceneSummary};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stilllife-cli", about = "Inspect the still-life scene without a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene catalog info
    Info,
    /// Run frames against a recording backend and list the draw calls
    Scene {
        /// Number of frames to run before listing
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Texture tags whose load should fail
        #[arg(long = "fail-texture")]
        fail_textures: Vec<String>,
        /// Emit objects as JSON instead of the draw listing
        #[arg(long)]
        json: bool,
    },
    /// List the material catalog
    Materials {
        #[arg(long)]
        json: bool,
    },
    /// Show how the bowl spin advances
    Spin {
        #[arg(short, long, default_value = "10")]
        frames: u32,
        #[arg(long, value_enum, default_value = "frame")]
        mode: SpinArg,
        /// Degrees per frame, or per second in wall-clock mode
        #[arg(long, default_value = "0.01")]
        step: f64,
        /// Simulated frame rate for wall-clock mode
        #[arg(long, default_value = "60")]
        fps: f32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SpinArg {
    Frame,
    WallClock,
}

impl From<SpinArg> for SpinMode {
    fn from(arg: SpinArg) -> Self {
        match arg {
            SpinArg::Frame => SpinMode::Frame,
            SpinArg::WallClock => SpinMode::WallClock,
        }
    }
}

#[derive(Serialize)]
struct SceneDump {
    summary: SceneSummary,
    objects: Vec<ObjectInfo>,
}

/// Prepare the built-in scene on a recording backend and run `frames` frames.
/// The backend log holds only the last frame.
fn run_scene(frames: u32, fail_tags: &[String]) -> (SceneComposer, RecordingBackend) {
    let config = SceneConfig::default();
    let definition = still_life::definition();

    // Several tags share one image file, so fail by load order rather than path.
    let mut backend = RecordingBackend::new();
    for (index, source) in definition.textures.iter().enumerate() {
        if fail_tags.contains(&source.tag) {
            backend.fail_texture_call(index);
        }
    }

    let mut scene = SceneComposer::new(definition, &config);
    let view = ViewState::default();
    scene.prepare(&mut backend);

    for _ in 0..frames.max(1) {
        backend.clear_log();
        view.upload(&mut backend, 16.0 / 9.0);
        scene.update(1.0 / 60.0);
        scene.render(&mut backend);
    }
    tracing::debug!(frames, draws = backend.draws().len(), "recorded scene run");
    (scene, backend)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            let definition = still_life::definition();
            println!("stilllife-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "meshes: {}",
                MeshKind::ALL.map(|k| k.to_string()).join(", ")
            );
            println!("objects: {}", definition.objects.len());
            println!("materials: {}", definition.materials.len());
            println!("lights: {}", definition.lights.len());
            println!(
                "textures: {} of {TEXTURE_CAPACITY} units",
                definition.textures.len()
            );
            let root: PathBuf = SceneConfig::default().texture_root;
            println!("texture root: {}", root.display());
            let scene = SceneComposer::new(definition, &SceneConfig::default());
            println!("draw order: {}", SceneInspector::list_objects(&scene).join(", "));
        }
        Commands::Scene {
            frames,
            fail_textures,
            json,
        } => {
            let (scene, backend) = run_scene(frames, &fail_textures);
            if json {
                let dump = SceneDump {
                    summary: SceneInspector::summary(&scene),
                    objects: (0..scene.objects().len())
                        .filter_map(|i| SceneInspector::inspect_object(&scene, i))
                        .collect(),
                };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                println!("{}", SceneInspector::summary(&scene));
                println!("{}", SceneInspector::view_summary(&ViewState::default()));
                for i in 0..scene.objects().len() {
                    if let Some(info) = SceneInspector::inspect_object(&scene, i) {
                        println!("{info}");
                    }
                }
                print!("{}", backend.describe_draws());
            }
        }
        Commands::Materials { json } => {
            let materials = still_life::materials();
            if json {
                println!("{}", serde_json::to_string_pretty(&materials)?);
            } else {
                for m in &materials {
                    println!(
                        "{:<10} ambient={:.2}×({:.2}, {:.2}, {:.2}) diffuse=({:.2}, {:.2}, {:.2}) specular=({:.2}, {:.2}, {:.2}) shininess={}",
                        m.tag,
                        m.ambient_strength,
                        m.ambient_color.x,
                        m.ambient_color.y,
                        m.ambient_color.z,
                        m.diffuse_color.x,
                        m.diffuse_color.y,
                        m.diffuse_color.z,
                        m.specular_color.x,
                        m.specular_color.y,
                        m.specular_color.z,
                        m.shininess
                    );
                }
            }
        }
        Commands::Spin {
            frames,
            mode,
            step,
            fps,
        } => {
            let config = SceneConfig {
                spin_mode: mode.into(),
                spin_step_degrees: step,
                ..SceneConfig::default()
            };
            let mut scene = SceneComposer::new(still_life::definition(), &config);
            let dt = 1.0 / fps.max(1.0);
            println!("Spin: mode={:?} step={step} dt={dt:.4}", scene.spin().mode());
            for frame in 1..=frames {
                scene.update(dt);
                println!("frame {frame:>4}: {:>8.3}°", scene.spin().angle_degrees());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_run_keeps_only_last_frame() {
        let (scene, backend) = run_scene(3, &[]);
        assert_eq!(backend.draws().len(), scene.objects().len());
        assert!(scene.spin().angle_degrees() > 0.0);
    }

    #[test]
    fn failed_texture_tag_is_reported_missing() {
        let (scene, _) = run_scene(1, &["glass".to_string()]);
        let vase = (0..scene.objects().len())
            .filter_map(|i| SceneInspector::inspect_object(&scene, i))
            .find(|o| o.label == "vase")
            .unwrap();
        assert_eq!(vase.surface, "texture glass (missing)");
    }

    #[test]
    fn failing_a_shared_file_tag_affects_only_that_tag() {
        let (scene, _) = run_scene(1, &["bowl".to_string()]);
        let missing: Vec<String> = (0..scene.objects().len())
            .filter_map(|i| SceneInspector::inspect_object(&scene, i))
            .filter(|o| o.surface.ends_with("(missing)"))
            .map(|o| o.label)
            .collect();
        assert_eq!(missing, ["bowl wall"]);
        assert_eq!(scene.textures().len(), 6);
    }

    #[test]
    fn cli_parses_spin_mode() {
        let cli = Cli::try_parse_from(["stilllife-cli", "spin", "--mode", "wall-clock"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Spin {
                mode: SpinArg::WallClock,
                ..
            }
        ));
    }
}
