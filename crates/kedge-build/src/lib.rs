//! Dockerfile inspection and `kedge.yml` scaffolding.
//!
//! # Init pipeline
//!
//! ```text
//! kedge init
//!   1. Guard       ── refuse if the output path exists
//!   2. Validate    ── name and image are mandatory
//!   3. Ports       ── --ports, else last EXPOSE in the Dockerfile
//!   4. Controller  ── Deployment | Job | DeploymentConfig (any case) or unset
//!   5. Serialize   ── serde_yaml, empty fields omitted
//!   6. Write       ── temp file in the target dir, then no-clobber rename
//! ```

pub mod dockerfile;
pub mod scaffold;

pub use dockerfile::{Dockerfile, DockerfileError, Instruction};
pub use scaffold::{Generated, InitParams, PortSource, ScaffoldError, generate};
