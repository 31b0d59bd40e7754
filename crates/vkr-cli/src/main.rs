use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use vkr_core::ReplaySettings;
use vkr_engine::{AshDriver, DisplayAdapter, VulkanReplayer};
use vkr_protocol::Packet;

#[derive(Parser)]
#[command(name = "vkr")]
#[command(about = "Deterministic replayer for recorded Vulkan call traces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a materialized packet stream against the native driver
    Replay {
        /// Packet stream (JSON array of packets)
        trace: PathBuf,

        /// Settings file path
        #[arg(short, long, default_value = "vkr.toml")]
        config: String,

        /// Frame list for the screenshot layer (enables layer injection)
        #[arg(long)]
        screenshot: Option<String>,

        /// Defer allocations and stage mapped writes through shadow buffers
        #[arg(long)]
        adjust_for_gpu: bool,

        /// Replay window width
        #[arg(long)]
        width: Option<u32>,

        /// Replay window height
        #[arg(long)]
        height: Option<u32>,

        /// GPU index for instance bring-up
        #[arg(long)]
        gpu: Option<u32>,

        /// Write pipeline/command-buffer DOT dumps to this directory on exit
        #[arg(long)]
        dump_state: Option<PathBuf>,

        /// Run without opening a replay window (traces with surface packets
        /// will report errors)
        #[arg(long)]
        headless: bool,
    },

    /// Report whether the native Vulkan library can be opened
    Info,
}

fn main() -> anyhow::Result<()> {
    vkr_common::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            trace,
            config,
            screenshot,
            adjust_for_gpu,
            width,
            height,
            gpu,
            dump_state,
            headless,
        } => {
            let mut settings = ReplaySettings::load_or_default(&config);
            if screenshot.is_some() {
                settings.screenshot_list = screenshot;
            }
            if adjust_for_gpu {
                settings.adjust_for_gpu = true;
            }
            if let Some(width) = width {
                settings.display.width = width;
            }
            if let Some(height) = height {
                settings.display.height = height;
            }
            if let Some(gpu) = gpu {
                settings.display.gpu_index = gpu;
            }
            if dump_state.is_some() {
                settings.dump_state = dump_state;
            }

            let file = File::open(&trace)?;
            let packets: Vec<Packet> = serde_json::from_reader(BufReader::new(file))?;
            info!(packets = packets.len(), trace = %trace.display(), "loaded packet stream");

            let driver = AshDriver::load()?;
            let display = if headless {
                None
            } else {
                Some(DisplayAdapter::create(&settings.display)?)
            };

            let dump_dir = settings.dump_state.clone();
            let mut replayer = VulkanReplayer::new(driver, settings, display);
            replayer.capture_validation(true);
            let summary = replayer.replay(&packets);

            if let Some(dir) = dump_dir {
                replayer.state_dump().write_dot(&dir)?;
                info!(dir = %dir.display(), "wrote state dumps");
            }
            replayer.shutdown();

            info!(
                calls = summary.calls,
                validation_errors = summary.validation_errors,
                bad_returns = summary.bad_returns,
                errors = summary.errors,
                "replay summary"
            );
            if !summary.clean() {
                anyhow::bail!("replay finished with status {:?}", summary.worst());
            }
            Ok(())
        }

        Commands::Info => {
            match AshDriver::load() {
                Ok(_) => {
                    println!(
                        "Vulkan driver library loaded (candidates: {:?})",
                        vkr_common::platform::vulkan_library_candidates()
                    );
                    Ok(())
                }
                Err(e) => anyhow::bail!("{e}"),
            }
        }
    }
}
