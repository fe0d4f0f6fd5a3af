//! fhirplan.toml environment configuration parser.
//!
//! The configuration is read-only input: identifiers for pre-existing
//! network and DNS resources, database identity, image sourcing, and the
//! optional chat-ops routing target. Everything is validated up front so a
//! misconfigured environment fails at plan-generation time, never at apply
//! time.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::profile::{CapacityOverrides, CapacityProfile, ProfileRevision, Tier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    pub environment: EnvironmentSection,
    pub network: NetworkSection,
    pub database: DatabaseSection,
    pub dns: DnsSection,
    pub image: ImageSource,
    pub notifications: Option<NotificationsSection>,
    pub capacity: Option<CapacityOverrides>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSection {
    /// Free-form environment label (e.g. "staging-eu").
    pub name: String,
    pub tier: Tier,
    /// Capacity/alarm profile revision. Defaults to the latest.
    #[serde(default)]
    pub profile: ProfileRevision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    /// Identifier of the pre-existing virtual network (`vpc-` prefix).
    pub vpc_id: String,
    /// Address range of that network, CIDR notation.
    pub vpc_cidr: String,
    /// Identifier of the pre-existing private DNS zone.
    pub zone_id: String,
    /// Domain name served by that zone.
    pub zone_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsSection {
    pub subdomain: String,
    pub domain: String,
}

/// Where the server container image comes from. Both sourcing strategies
/// are valid; the choice is environment policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ImageSource {
    /// Pull a pre-built image from a container registry.
    Registry {
        repository: String,
        #[serde(default = "default_tag")]
        tag: String,
    },
    /// Build from a local build context at deploy time.
    Build { context: String },
}

fn default_tag() -> String {
    "latest".to_string()
}

impl ImageSource {
    /// Image reference string placed into the plan.
    pub fn reference(&self) -> String {
        match self {
            ImageSource::Registry { repository, tag } => format!("{repository}:{tag}"),
            ImageSource::Build { context } => format!("build://{context}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsSection {
    /// Opaque reference to the chat-ops alarm topic.
    pub chat_ops_topic: String,
}

impl EnvConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: EnvConfig = toml::from_str(content).map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the capacity profile for this environment, including any
    /// `[capacity]` overrides, and check the scaling invariants.
    pub fn capacity(&self) -> ConfigResult<CapacityProfile> {
        let mut profile =
            CapacityProfile::resolve(self.environment.profile, self.environment.tier);
        if let Some(overrides) = &self.capacity {
            profile = profile.with_overrides(overrides);
        }
        profile.validate()?;
        Ok(profile)
    }

    pub fn chat_ops_topic(&self) -> Option<&str> {
        self.notifications
            .as_ref()
            .map(|n| n.chat_ops_topic.as_str())
    }

    /// Validate all identifier formats. Any failure is a hard error.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.environment.name.is_empty() {
            return Err(ConfigError::invalid("environment.name", "", "must not be empty"));
        }
        if !is_vpc_id(&self.network.vpc_id) {
            return Err(ConfigError::invalid(
                "network.vpc_id",
                &self.network.vpc_id,
                "expected vpc- followed by hex digits",
            ));
        }
        if !is_cidr(&self.network.vpc_cidr) {
            return Err(ConfigError::invalid(
                "network.vpc_cidr",
                &self.network.vpc_cidr,
                "expected a.b.c.d/len",
            ));
        }
        if !is_zone_id(&self.network.zone_id) {
            return Err(ConfigError::invalid(
                "network.zone_id",
                &self.network.zone_id,
                "expected Z followed by alphanumerics",
            ));
        }
        if !is_dns_name(&self.network.zone_domain) {
            return Err(ConfigError::invalid(
                "network.zone_domain",
                &self.network.zone_domain,
                "not a valid domain name",
            ));
        }
        if !is_db_identifier(&self.database.name) {
            return Err(ConfigError::invalid(
                "database.name",
                &self.database.name,
                "not a valid database identifier",
            ));
        }
        if !is_db_identifier(&self.database.username) {
            return Err(ConfigError::invalid(
                "database.username",
                &self.database.username,
                "not a valid database identifier",
            ));
        }
        if !is_dns_label(&self.dns.subdomain) {
            return Err(ConfigError::invalid(
                "dns.subdomain",
                &self.dns.subdomain,
                "not a valid DNS label",
            ));
        }
        if !is_dns_name(&self.dns.domain) {
            return Err(ConfigError::invalid(
                "dns.domain",
                &self.dns.domain,
                "not a valid domain name",
            ));
        }
        match &self.image {
            ImageSource::Registry { repository, .. } if repository.is_empty() => {
                return Err(ConfigError::invalid(
                    "image.repository",
                    repository,
                    "must not be empty",
                ));
            }
            ImageSource::Build { context } if context.is_empty() => {
                return Err(ConfigError::invalid(
                    "image.context",
                    context,
                    "must not be empty",
                ));
            }
            _ => {}
        }
        if let Some(n) = &self.notifications
            && n.chat_ops_topic.is_empty()
        {
            return Err(ConfigError::invalid(
                "notifications.chat_ops_topic",
                &n.chat_ops_topic,
                "must not be empty",
            ));
        }
        Ok(())
    }
}

fn is_vpc_id(s: &str) -> bool {
    s.strip_prefix("vpc-")
        .is_some_and(|rest| rest.len() >= 8 && rest.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_zone_id(s: &str) -> bool {
    s.strip_prefix('Z')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn is_cidr(s: &str) -> bool {
    let Some((addr, len)) = s.split_once('/') else {
        return false;
    };
    let octets: Vec<&str> = addr.split('.').collect();
    if octets.len() != 4 {
        return false;
    }
    octets.iter().all(|o| o.parse::<u8>().is_ok()) && len.parse::<u8>().is_ok_and(|l| l <= 32)
}

fn is_db_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_dns_label(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_dns_name(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_dns_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const FULL_CONFIG: &str = r#"
[environment]
name = "production-us"
tier = "production"
profile = "v2"

[network]
vpc_id = "vpc-0a1b2c3d4e5f"
vpc_cidr = "10.0.0.0/16"
zone_id = "Z0123456789ABC"
zone_domain = "internal.example.com"

[database]
name = "fhirdb"
username = "fhir_admin"

[dns]
subdomain = "fhir"
domain = "internal.example.com"

[image]
source = "registry"
repository = "registry.example.com/fhir-server"
tag = "1.4.2"

[notifications]
chat_ops_topic = "ops-alerts"
"#;

    #[test]
    fn parse_full_config() {
        let config = EnvConfig::from_toml_str(FULL_CONFIG).unwrap();
        assert_eq!(config.environment.tier, Tier::Production);
        assert_eq!(config.environment.profile, ProfileRevision::V2);
        assert_eq!(config.database.name, "fhirdb");
        assert_eq!(config.chat_ops_topic(), Some("ops-alerts"));
        assert_eq!(
            config.image.reference(),
            "registry.example.com/fhir-server:1.4.2"
        );
    }

    #[test]
    fn profile_defaults_to_v2() {
        let toml_str = FULL_CONFIG.replace("profile = \"v2\"\n", "");
        let config = EnvConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config.environment.profile, ProfileRevision::V2);
    }

    #[test]
    fn registry_tag_defaults_to_latest() {
        let toml_str = FULL_CONFIG.replace("tag = \"1.4.2\"\n", "");
        let config = EnvConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(
            config.image.reference(),
            "registry.example.com/fhir-server:latest"
        );
    }

    #[test]
    fn build_context_source() {
        let toml_str = FULL_CONFIG
            .replace("source = \"registry\"", "source = \"build\"")
            .replace("repository = \"registry.example.com/fhir-server\"", "context = \"./server\"")
            .replace("tag = \"1.4.2\"\n", "");
        let config = EnvConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config.image.reference(), "build://./server");
    }

    #[test]
    fn missing_notifications_is_fine() {
        let toml_str = FULL_CONFIG
            .replace("[notifications]\nchat_ops_topic = \"ops-alerts\"\n", "");
        let config = EnvConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config.chat_ops_topic(), None);
    }

    #[test]
    fn rejects_malformed_vpc_id() {
        let toml_str = FULL_CONFIG.replace("vpc-0a1b2c3d4e5f", "subnet-12345678");
        let err = EnvConfig::from_toml_str(&toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { field, .. } if field == "network.vpc_id"));
    }

    #[test]
    fn rejects_malformed_cidr() {
        let toml_str = FULL_CONFIG.replace("10.0.0.0/16", "10.0.0.0");
        assert!(EnvConfig::from_toml_str(&toml_str).is_err());
    }

    #[test]
    fn rejects_bad_database_identifier() {
        let toml_str = FULL_CONFIG.replace("name = \"fhirdb\"", "name = \"fhir-db;drop\"");
        assert!(EnvConfig::from_toml_str(&toml_str).is_err());
    }

    #[test]
    fn capacity_overrides_flow_through() {
        let toml_str = format!("{FULL_CONFIG}\n[capacity]\ndb_max = 16\n");
        let config = EnvConfig::from_toml_str(&toml_str).unwrap();
        let profile = config.capacity().unwrap();
        assert_eq!(profile.db.max, 16);
        assert_eq!(profile.db.min, 4); // production v2 table value
    }

    #[test]
    fn invalid_capacity_override_rejected() {
        let toml_str = format!("{FULL_CONFIG}\n[capacity]\ndb_min = 64\ndb_max = 2\n");
        let config = EnvConfig::from_toml_str(&toml_str).unwrap();
        assert!(config.capacity().is_err());
    }

    #[test]
    fn from_file_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fhirplan.toml");
        std::fs::write(&path, FULL_CONFIG).unwrap();
        let config = EnvConfig::from_file(&path).unwrap();
        assert_eq!(config.environment.name, "production-us");
    }
}
