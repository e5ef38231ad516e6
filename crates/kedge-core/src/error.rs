pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "name and image are mandatory, please provide them (missing: {})",
        missing.join(", ")
    )]
    MissingRequired { missing: Vec<&'static str> },

    #[error(
        "invalid controller {value:?}: legal values are [{}]",
        crate::controller::LEGAL_NAMES.join(", ")
    )]
    InvalidController { value: String },
}
