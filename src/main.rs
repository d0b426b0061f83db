#[cfg(not(target_arch = "wasm32"))]
mod native {
    use backdrop::config::EffectsConfig;
    use backdrop::ViewerError;
    use clap::Parser;
    use std::path::PathBuf;
    use tracing_subscriber::EnvFilter;

    /// Ambient backdrop effects in a desktop window.
    #[derive(Parser, Debug)]
    #[command(name = "backdrop", version, about)]
    struct Args {
        /// JSON effects config; missing fields take their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Window width in logical pixels
        #[arg(long)]
        width: Option<u32>,

        /// Window height in logical pixels
        #[arg(long)]
        height: Option<u32>,

        /// Behave like a touch device (no cursor trail)
        #[arg(long)]
        touch: bool,

        /// Log at debug level
        #[arg(short, long)]
        verbose: bool,
    }

    fn load_config(args: &Args) -> Result<EffectsConfig, ViewerError> {
        let mut config = match &args.config {
            Some(path) => EffectsConfig::load(path)?,
            None => EffectsConfig::default(),
        };
        if let Some(width) = args.width {
            config.viewer.width = width;
        }
        if let Some(height) = args.height {
            config.viewer.height = height;
        }
        Ok(config)
    }

    pub fn main() {
        let args = Args::parse();

        let default_level = if args.verbose { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .init();

        let result = load_config(&args)
            .and_then(|config| backdrop::window::run(config, args.seed, args.touch));
        if let Err(e) = result {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

// The browser entry point is `WebBackdrop::mount`.
#[cfg(target_arch = "wasm32")]
fn main() {}
