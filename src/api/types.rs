//! Wire types for Lambda Cloud requests and responses.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Every response body wraps its payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: T,
}

/// Provider region.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Region {
    /// Region identifier (for example `us-east-1`).
    pub name: String,
    /// Human-readable location.
    #[serde(default)]
    pub description: String,
}

/// Hardware description keyed by provider field name (`vcpus`, `gpus`, ...).
pub type Specs = BTreeMap<String, serde_json::Value>;

/// Instance type as embedded in an instance record.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct InstanceTypeSummary {
    /// Instance type name (for example `gpu_1x_a100`).
    pub name: String,
    /// Marketing description.
    #[serde(default)]
    pub description: String,
    /// Hourly price in US cents.
    pub price_cents_per_hour: u64,
    /// Hardware description.
    #[serde(default)]
    pub specs: Specs,
}

/// Instance type together with the regions currently reporting capacity.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct InstanceType {
    /// Instance type name.
    pub name: String,
    /// Hourly price in US cents.
    pub price_cents_per_hour: u64,
    /// Marketing description.
    pub description: String,
    /// Hardware description.
    pub specs: Specs,
    /// Regions that can launch this type right now, in provider order.
    pub regions_with_capacity_available: Vec<Region>,
}

impl InstanceType {
    /// Whether at least one region reports capacity.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        !self.regions_with_capacity_available.is_empty()
    }
}

#[derive(Deserialize)]
struct InstanceTypeEntry {
    instance_type: InstanceTypeSummary,
    #[serde(default)]
    regions_with_capacity_available: Vec<Region>,
}

impl From<InstanceTypeEntry> for InstanceType {
    fn from(entry: InstanceTypeEntry) -> Self {
        let InstanceTypeEntry {
            instance_type,
            regions_with_capacity_available,
        } = entry;
        Self {
            name: instance_type.name,
            price_cents_per_hour: instance_type.price_cents_per_hour,
            description: instance_type.description,
            specs: instance_type.specs,
            regions_with_capacity_available,
        }
    }
}

/// The listing endpoint returns a JSON object keyed by type name; entries are
/// kept in document order.
#[derive(Debug)]
pub(crate) struct InstanceTypeListing(pub(crate) Vec<InstanceType>);

impl<'de> Deserialize<'de> for InstanceTypeListing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ListingVisitor;

        impl<'de> Visitor<'de> for ListingVisitor {
            type Value = InstanceTypeListing;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of instance type names to availability entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut types = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((_, entry)) = map.next_entry::<String, InstanceTypeEntry>()? {
                    types.push(InstanceType::from(entry));
                }
                Ok(InstanceTypeListing(types))
            }
        }

        deserializer.deserialize_map(ListingVisitor)
    }
}

/// Keeps only the types with capacity unless `show_all` is set. Order is
/// preserved either way.
#[must_use]
pub fn filter_instance_types(types: Vec<InstanceType>, show_all: bool) -> Vec<InstanceType> {
    if show_all {
        return types;
    }
    types.into_iter().filter(InstanceType::has_capacity).collect()
}

/// Snapshot of a provisioned instance.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct Instance {
    /// Provider instance identifier.
    pub id: String,
    /// User-assigned name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Public IPv4 address once assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Provider-assigned hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Lifecycle status (`booting`, `active`, `terminating`, ...).
    pub status: String,
    /// Names of SSH keys installed on the instance.
    #[serde(default)]
    pub ssh_key_names: Vec<String>,
    /// Names of attached file systems.
    #[serde(default)]
    pub file_system_names: Vec<String>,
    /// Region hosting the instance.
    pub region: Region,
    /// Instance type the instance was launched from.
    pub instance_type: InstanceTypeSummary,
    /// Token for the hosted Jupyter server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jupyter_token: Option<String>,
    /// URL of the hosted Jupyter server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jupyter_url: Option<String>,
}

/// SSH key registered with the account.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct SshKey {
    /// Provider key identifier.
    pub id: String,
    /// Key name used when launching instances.
    pub name: String,
    /// Public key material.
    pub public_key: String,
    /// Private key, returned only when the provider generated the pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Persistent file system.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct FileSystem {
    /// Provider file system identifier.
    pub id: String,
    /// File system name used when launching instances.
    pub name: String,
    /// Mount point on attached instances.
    #[serde(default)]
    pub mount_point: String,
    /// Region hosting the file system.
    pub region: Region,
    /// Whether an instance currently uses the file system.
    #[serde(default)]
    pub is_in_use: bool,
    /// Creation timestamp as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Bytes stored, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_used: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LaunchResponse {
    pub(crate) instance_ids: Vec<String>,
}

/// Payload returned by the terminate operation.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct TerminateResponse {
    /// Instances the provider accepted for termination.
    #[serde(default)]
    pub terminated_instances: Vec<Instance>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LaunchPayload<'a> {
    pub(crate) region_name: &'a str,
    pub(crate) instance_type_name: &'a str,
    pub(crate) ssh_key_names: &'a [String],
    pub(crate) file_system_names: &'a [String],
    pub(crate) quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct TerminatePayload<'a> {
    pub(crate) instance_ids: [&'a str; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct AddSshKeyPayload<'a> {
    pub(crate) name: &'a str,
    pub(crate) public_key: &'a str,
}
