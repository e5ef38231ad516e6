use std::io::Write;
use std::path::{Path, PathBuf};

use kedge_core::{App, DEFAULT_OUTPUT, DOCKERFILE_NAME};

use crate::dockerfile::{Dockerfile, DockerfileError};

/// Everything `kedge init` needs, collected once per invocation.
#[derive(Debug, Clone)]
pub struct InitParams {
    /// Output file; must not exist yet
    pub out: PathBuf,
    pub name: String,
    pub image: String,
    /// Explicit port mappings; when empty the Dockerfile is consulted
    pub ports: Vec<String>,
    /// Deployment, Job or DeploymentConfig in any case, or empty
    pub controller: String,
    pub dockerfile: PathBuf,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            out: PathBuf::from(DEFAULT_OUTPUT),
            name: String::new(),
            image: String::new(),
            ports: Vec::new(),
            controller: String::new(),
            dockerfile: PathBuf::from(DOCKERFILE_NAME),
        }
    }
}

/// Where the service's port mappings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSource {
    Flags,
    Dockerfile(PathBuf),
    /// The Dockerfile declares no `EXPOSE`
    Undeclared,
}

/// Result of a successful [`generate`] run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub path: PathBuf,
    pub app: App,
    pub ports_from: PortSource,
}

/// Build the descriptor described by `params` and write it as YAML.
///
/// Nothing is written unless every check passes. The file is staged in a
/// temporary file next to the target and renamed into place, so a failed
/// write never leaves a truncated `kedge.yml` behind.
///
/// # Errors
///
/// - [`ScaffoldError::OutputExists`] if `params.out` already exists
/// - [`ScaffoldError::Invalid`] if name or image is empty, or the controller
///   is not recognized
/// - [`ScaffoldError::DockerfileMissing`] / [`ScaffoldError::DockerfileParse`]
///   when ports must come from the Dockerfile and it cannot be used
/// - [`ScaffoldError::Serialize`], [`ScaffoldError::Create`],
///   [`ScaffoldError::Write`], [`ScaffoldError::Persist`] on output failures
pub fn generate(params: &InitParams) -> Result<Generated, ScaffoldError> {
    // Any entry counts, including dangling symlinks
    // arch-lint: allow(no-silent-result-drop) reason="existence probe, the error kind is irrelevant"
    if std::fs::symlink_metadata(&params.out).is_ok() {
        return Err(ScaffoldError::OutputExists {
            path: params.out.clone(),
        });
    }

    let mut app = App::new(&params.name, &params.image)?;

    let (ports, ports_from) = resolve_ports(params)?;
    tracing::debug!(?ports, source = ?ports_from, "resolved port mappings");
    app.set_port_mappings(ports);

    app.set_controller(&params.controller)?;

    let yaml = serde_yaml::to_string(&app).map_err(ScaffoldError::Serialize)?;
    write_new_file(&params.out, yaml.as_bytes())?;
    tracing::info!(path = %params.out.display(), "wrote kedge file");

    Ok(Generated {
        path: params.out.clone(),
        app,
        ports_from,
    })
}

fn resolve_ports(params: &InitParams) -> Result<(Vec<String>, PortSource), ScaffoldError> {
    if !params.ports.is_empty() {
        return Ok((params.ports.clone(), PortSource::Flags));
    }

    let path = &params.dockerfile;
    if !path.exists() {
        return Err(ScaffoldError::DockerfileMissing { path: path.clone() });
    }

    let dockerfile = Dockerfile::from_path(path).map_err(|e| ScaffoldError::DockerfileParse {
        path: path.clone(),
        source: e,
    })?;

    let expose_count = dockerfile.instructions_named("expose").count();
    if expose_count > 1 {
        tracing::warn!(
            path = %path.display(),
            count = expose_count,
            "multiple EXPOSE instructions, using the last one"
        );
    }

    // A bare `EXPOSE` declares nothing
    Ok(match dockerfile.exposed_ports() {
        Some(ports) if !ports.is_empty() => {
            (ports.to_vec(), PortSource::Dockerfile(path.clone()))
        }
        _ => (Vec::new(), PortSource::Undeclared),
    })
}

/// Write `contents` to `path` via a sibling temp file and a no-clobber rename.
fn write_new_file(path: &Path, contents: &[u8]) -> Result<(), ScaffoldError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".kedge-").suffix(".tmp");
    // Same mode as a plain create: 0666 minus the umask, not tempfile's 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut staged = builder
        .tempfile_in(dir)
        .map_err(|e| ScaffoldError::Create {
            path: dir.to_path_buf(),
            source: e,
        })?;

    staged
        .write_all(contents)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| ScaffoldError::Write {
            path: staged.path().to_path_buf(),
            source: e,
        })?;

    // The temp file is removed on drop if the rename fails
    staged
        .persist_noclobber(path)
        .map_err(|e| ScaffoldError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error("{} is already present", path.display())]
    OutputExists { path: PathBuf },

    #[error(transparent)]
    Invalid(#[from] kedge_core::Error),

    #[error("{} is not present; pass --ports or add a Dockerfile", path.display())]
    DockerfileMissing { path: PathBuf },

    #[error("failed to parse Dockerfile at {}", path.display())]
    DockerfileParse {
        path: PathBuf,
        source: DockerfileError,
    },

    #[error("failed to encode descriptor as YAML")]
    Serialize(#[source] serde_yaml::Error),

    #[error("failed to create temporary file in {}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to move output into place at {}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}
