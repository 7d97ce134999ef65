use crate::config::Config;
use crate::error::{ContributeError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    pub collection: String,
    pub collection_path: PathBuf,
    pub package_key: String,
    pub package_path: PathBuf,
}

pub trait PackageRegistry {
    fn resolve(&self, package_key: &str) -> Result<PackageLocation>;
}

pub struct CollectionRegistry<'a> {
    config: &'a Config,
}

impl<'a> CollectionRegistry<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }
}

impl PackageRegistry for CollectionRegistry<'_> {
    fn resolve(&self, package_key: &str) -> Result<PackageLocation> {
        for collection in self.config.collections() {
            let Some(collection_path) = self.config.collection_path(collection) else {
                continue;
            };
            let package_path = collection_path.join(package_key);
            if package_path.is_dir() {
                return Ok(PackageLocation {
                    collection: collection.to_string(),
                    collection_path,
                    package_key: package_key.to_string(),
                    package_path,
                });
            }
        }
        Err(ContributeError::PackageNotFound(package_key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_package_in_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Framework/Flow")).unwrap();
        std::fs::create_dir_all(dir.path().join("Application/Neos.Neos")).unwrap();
        let mut config = Config::default();
        config.packages_path = dir.path().to_path_buf();

        let registry = CollectionRegistry::new(&config);
        let flow = registry.resolve("Flow").unwrap();
        assert_eq!(flow.collection, "flow");
        assert_eq!(flow.collection_path, dir.path().join("Framework"));
        assert_eq!(flow.package_path, dir.path().join("Framework/Flow"));

        assert_eq!(registry.resolve("Neos.Neos").unwrap().collection, "neos");
    }

    #[test]
    fn test_unknown_package() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.packages_path = dir.path().to_path_buf();

        let err = CollectionRegistry::new(&config).resolve("Fluid").unwrap_err();
        assert!(matches!(err, ContributeError::PackageNotFound(key) if key == "Fluid"));
    }
}
