//! Launch request construction and region selection.

use super::error::LambdaApiError;
use super::types::InstanceType;

/// Either a single value or a list, normalised to a list before use.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OneOrMany<T> {
    /// A single value.
    One(T),
    /// Zero or more values.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalises to a list; `One(x)` becomes `[x]`.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(values: [&str; N]) -> Self {
        Self::Many(values.into_iter().map(str::to_owned).collect())
    }
}

/// Validated parameters for launching instances.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchSpec {
    /// Instance type to launch.
    pub instance_type: String,
    /// SSH keys to install.
    pub ssh_key_names: Vec<String>,
    /// File systems to attach.
    pub file_system_names: Vec<String>,
    /// Target region; `None` picks the first region with capacity.
    pub region: Option<String>,
    /// Number of instances to launch.
    pub quantity: u32,
}

impl LaunchSpec {
    /// Starts a builder for `instance_type` with one instance, no keys, no
    /// file systems, and automatic region selection.
    pub fn builder(instance_type: impl Into<String>) -> LaunchSpecBuilder {
        LaunchSpecBuilder::new(instance_type)
    }
}

/// Builder for [`LaunchSpec`] that trims and validates on [`build`](Self::build).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchSpecBuilder {
    instance_type: String,
    ssh_key_names: OneOrMany<String>,
    file_system_names: OneOrMany<String>,
    region: Option<String>,
    quantity: u32,
}

impl LaunchSpecBuilder {
    /// Creates a builder for `instance_type`.
    pub fn new(instance_type: impl Into<String>) -> Self {
        Self {
            instance_type: instance_type.into(),
            ssh_key_names: OneOrMany::default(),
            file_system_names: OneOrMany::default(),
            region: None,
            quantity: 1,
        }
    }

    /// Sets the SSH key name or names.
    #[must_use]
    pub fn ssh_keys(mut self, names: impl Into<OneOrMany<String>>) -> Self {
        self.ssh_key_names = names.into();
        self
    }

    /// Sets the file system name or names.
    #[must_use]
    pub fn file_systems(mut self, names: impl Into<OneOrMany<String>>) -> Self {
        self.file_system_names = names.into();
        self
    }

    /// Pins the launch to `region`.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the number of instances.
    #[must_use]
    pub const fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Builds the launch spec, trimming names and dropping a blank region.
    ///
    /// # Errors
    ///
    /// Returns [`LambdaApiError::Validation`] when the instance type is blank,
    /// a key or file-system name is blank, or the quantity is zero.
    pub fn build(self) -> Result<LaunchSpec, LambdaApiError> {
        let instance_type = self.instance_type.trim().to_owned();
        if instance_type.is_empty() {
            return Err(LambdaApiError::Validation(String::from(
                "instance_type must not be empty",
            )));
        }
        if self.quantity == 0 {
            return Err(LambdaApiError::Validation(String::from(
                "quantity must be at least 1",
            )));
        }

        Ok(LaunchSpec {
            instance_type,
            ssh_key_names: trimmed_names(self.ssh_key_names, "ssh_key_names")?,
            file_system_names: trimmed_names(self.file_system_names, "file_system_names")?,
            region: self
                .region
                .map(|region| region.trim().to_owned())
                .filter(|region| !region.is_empty()),
            quantity: self.quantity,
        })
    }
}

fn trimmed_names(names: OneOrMany<String>, field: &str) -> Result<Vec<String>, LambdaApiError> {
    names
        .into_vec()
        .into_iter()
        .map(|name| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                Err(LambdaApiError::Validation(format!(
                    "{field} must not contain blank names"
                )))
            } else {
                Ok(trimmed.to_owned())
            }
        })
        .collect()
}

/// Picks the launch region for `spec` from a full instance-type listing.
///
/// The type must report capacity in at least one region. An explicit region
/// is then used as given; otherwise the first region reporting capacity wins.
///
/// # Errors
///
/// Returns [`LambdaApiError::InstanceTypeNotFound`] when the type is not
/// listed and [`LambdaApiError::NoRegionAvailable`] when no region reports
/// capacity for it, whether or not a region was requested.
pub fn select_launch_region(
    types: &[InstanceType],
    spec: &LaunchSpec,
) -> Result<String, LambdaApiError> {
    let instance_type = types
        .iter()
        .find(|candidate| candidate.name == spec.instance_type)
        .ok_or_else(|| LambdaApiError::InstanceTypeNotFound {
            instance_type: spec.instance_type.clone(),
        })?;

    let first_available = instance_type
        .regions_with_capacity_available
        .first()
        .ok_or_else(|| LambdaApiError::NoRegionAvailable {
            instance_type: spec.instance_type.clone(),
        })?;

    Ok(spec
        .region
        .clone()
        .unwrap_or_else(|| first_available.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Region;
    use rstest::rstest;

    fn instance_type(name: &str, regions: &[&str]) -> InstanceType {
        InstanceType {
            name: name.to_owned(),
            price_cents_per_hour: 110,
            description: String::new(),
            specs: crate::api::types::Specs::new(),
            regions_with_capacity_available: regions
                .iter()
                .map(|region| Region {
                    name: (*region).to_owned(),
                    description: String::new(),
                })
                .collect(),
        }
    }

    fn catalogue() -> Vec<InstanceType> {
        vec![
            instance_type("gpu_1x_a10", &["us-east-1", "us-west-1"]),
            instance_type("gpu_8x_h100", &[]),
        ]
    }

    #[test]
    fn single_key_matches_one_element_list() {
        let single = LaunchSpec::builder("gpu_1x_a10")
            .ssh_keys("laptop")
            .build()
            .unwrap_or_else(|err| panic!("single: {err}"));
        let list = LaunchSpec::builder("gpu_1x_a10")
            .ssh_keys(vec!["laptop"])
            .build()
            .unwrap_or_else(|err| panic!("list: {err}"));

        assert_eq!(single, list);
        assert_eq!(single.ssh_key_names, ["laptop"]);
    }

    #[test]
    fn builder_defaults_to_one_instance_without_keys() {
        let spec = LaunchSpec::builder(" gpu_1x_a10 ")
            .region("  ")
            .build()
            .unwrap_or_else(|err| panic!("spec: {err}"));

        assert_eq!(spec.instance_type, "gpu_1x_a10");
        assert_eq!(spec.quantity, 1);
        assert!(spec.ssh_key_names.is_empty());
        assert!(spec.file_system_names.is_empty());
        assert_eq!(spec.region, None);
    }

    #[rstest]
    #[case::blank_type(LaunchSpec::builder("  "), "instance_type")]
    #[case::zero_quantity(LaunchSpec::builder("gpu_1x_a10").quantity(0), "quantity")]
    #[case::blank_key(LaunchSpec::builder("gpu_1x_a10").ssh_keys(["ok", " "]), "ssh_key_names")]
    #[case::blank_fs(LaunchSpec::builder("gpu_1x_a10").file_systems(""), "file_system_names")]
    fn builder_rejects_invalid_input(#[case] builder: LaunchSpecBuilder, #[case] field: &str) {
        let err = builder.build().expect_err("spec should be rejected");

        let LambdaApiError::Validation(ref message) = err else {
            panic!("expected Validation error, got {err:?}");
        };
        assert!(message.contains(field), "message: {message}");
    }

    #[test]
    fn region_defaults_to_first_with_capacity() {
        let spec = LaunchSpec::builder("gpu_1x_a10")
            .build()
            .unwrap_or_else(|err| panic!("spec: {err}"));

        let region = select_launch_region(&catalogue(), &spec);

        assert_eq!(region, Ok(String::from("us-east-1")));
    }

    #[test]
    fn explicit_region_is_kept() {
        let spec = LaunchSpec::builder("gpu_1x_a10")
            .region("eu-central-1")
            .build()
            .unwrap_or_else(|err| panic!("spec: {err}"));

        let region = select_launch_region(&catalogue(), &spec);

        assert_eq!(region, Ok(String::from("eu-central-1")));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let spec = LaunchSpec::builder("nonexistent-type")
            .ssh_keys("key")
            .build()
            .unwrap_or_else(|err| panic!("spec: {err}"));

        assert_eq!(
            select_launch_region(&catalogue(), &spec),
            Err(LambdaApiError::InstanceTypeNotFound {
                instance_type: String::from("nonexistent-type")
            })
        );
    }

    #[rstest]
    #[case::no_region(None)]
    #[case::explicit_region(Some("us-east-1"))]
    fn type_without_capacity_is_rejected(#[case] region: Option<&str>) {
        let mut builder = LaunchSpec::builder("gpu_8x_h100");
        if let Some(region) = region {
            builder = builder.region(region);
        }
        let spec = builder
            .build()
            .unwrap_or_else(|err| panic!("spec: {err}"));

        assert_eq!(
            select_launch_region(&catalogue(), &spec),
            Err(LambdaApiError::NoRegionAvailable {
                instance_type: String::from("gpu_8x_h100")
            })
        );
    }
}
