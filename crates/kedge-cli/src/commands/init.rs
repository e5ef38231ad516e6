use std::path::PathBuf;

use kedge_build::{InitParams, PortSource};
use kedge_core::{DEFAULT_OUTPUT, DOCKERFILE_NAME};

#[derive(Debug, clap::Args)]
pub struct InitArgs {
    /// Output filename
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    out: PathBuf,
    /// The name of service
    #[arg(short, long, default_value = "")]
    name: String,
    /// The image for the container to run
    #[arg(short, long, default_value = "")]
    image: String,
    /// The ports that this container exposes (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    ports: Vec<String>,
    /// The type of controller this application is. Legal values
    /// [Deployment, Job, DeploymentConfig]. Default 'Deployment'.
    #[arg(short, long, default_value = "")]
    controller: String,
    /// Dockerfile to read EXPOSE ports from when --ports is not given
    #[arg(short = 'f', long, default_value = DOCKERFILE_NAME)]
    dockerfile: PathBuf,
}

impl From<InitArgs> for InitParams {
    fn from(args: InitArgs) -> Self {
        Self {
            out: args.out,
            name: args.name,
            image: args.image,
            ports: args.ports.into_iter().filter(|p| !p.is_empty()).collect(),
            controller: args.controller,
            dockerfile: args.dockerfile,
        }
    }
}

/// Scaffold a kedge file from the given flags.
pub fn init(args: InitArgs) -> anyhow::Result<()> {
    let params = InitParams::from(args);
    let generated = kedge_build::generate(&params)?;

    match &generated.ports_from {
        PortSource::Flags => {}
        PortSource::Dockerfile(path) => tracing::info!(
            ports = ?generated.app.port_mappings(),
            "using ports from {}",
            path.display()
        ),
        PortSource::Undeclared => tracing::info!(
            "{} declares no EXPOSE, writing without services",
            params.dockerfile.display()
        ),
    }

    println!("file {} created", generated.path.display());
    Ok(())
}
