use docker_image_pruner::Logger;
use docker_image_pruner::cli::{Args, PrunerConfig, Runner};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse_args();

    let config = match PrunerConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            Logger::new(args.debug).critical(&e.to_string());
            process::exit(1);
        }
    };

    let runner = Runner::new(config);
    if let Err(e) = runner.run().await {
        runner.output().critical(&e.to_string());
        process::exit(1);
    }
}
