use serde::{Deserialize, Serialize};

/// Application descriptor written by `kedge init`.
///
/// Only the subset of the full kedge schema that `init` fills in. Every field
/// is skipped when empty so the generated file stays minimal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Controller as typed by the user (validated, casing preserved)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub controller: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<String>,
}

impl App {
    /// Start a descriptor with a single container.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRequired`](crate::Error::MissingRequired) naming every
    /// empty field among `name` and `image`.
    pub fn new(name: &str, image: &str) -> crate::Result<Self> {
        let missing: Vec<&'static str> = [("name", name), ("image", image)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(crate::Error::MissingRequired { missing });
        }

        Ok(Self {
            name: name.to_owned(),
            controller: String::new(),
            containers: vec![Container {
                image: image.to_owned(),
            }],
            services: Vec::new(),
        })
    }

    /// Set the port mappings of the single service.
    ///
    /// An empty list removes the service; an app may expose no ports.
    pub fn set_port_mappings(&mut self, ports: Vec<String>) {
        self.services = if ports.is_empty() {
            Vec::new()
        } else {
            vec![Service {
                port_mappings: ports,
            }]
        };
    }

    /// Validate and store the controller, keeping the caller's casing.
    pub fn set_controller(&mut self, raw: &str) -> crate::Result<()> {
        let kind = crate::validate_controller(raw)?;
        tracing::debug!(controller = raw, ?kind, "controller accepted");
        self.controller = raw.to_owned();
        Ok(())
    }

    pub fn port_mappings(&self) -> &[String] {
        self.services
            .first()
            .map(|s| s.port_mappings.as_slice())
            .unwrap_or_default()
    }
}
