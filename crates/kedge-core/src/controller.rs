/// Controller names as shown to users, in canonical casing.
pub const LEGAL_NAMES: [&str; 3] = ["Deployment", "Job", "DeploymentConfig"];

/// Workload-management construct an application targets downstream.
///
/// Matching is case-insensitive; the descriptor keeps whatever casing the
/// user typed, so this type is only used to validate and classify.
///
/// # Examples
///
/// ```
/// use kedge_core::ControllerKind;
///
/// assert_eq!(ControllerKind::from_name("JOB"), Some(ControllerKind::Job));
/// assert_eq!(ControllerKind::from_name("cronjob"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Deployment,
    Job,
    DeploymentConfig,
}

impl ControllerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "deployment" => Some(Self::Deployment),
            "job" => Some(Self::Job),
            "deploymentconfig" => Some(Self::DeploymentConfig),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::Job => "Job",
            Self::DeploymentConfig => "DeploymentConfig",
        }
    }
}

impl std::fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a user-supplied controller value.
///
/// An empty value is accepted and yields `None`: the downstream tool then
/// picks its default controller.
///
/// # Errors
///
/// [`Error::InvalidController`](crate::Error::InvalidController) for any
/// other value outside [`LEGAL_NAMES`].
pub fn validate_controller(raw: &str) -> crate::Result<Option<ControllerKind>> {
    if raw.is_empty() {
        return Ok(None);
    }
    ControllerKind::from_name(raw)
        .map(Some)
        .ok_or_else(|| crate::Error::InvalidController {
            value: raw.to_owned(),
        })
}
