//! Version-gated installation of registry operations onto prototypes
//!
//! Selectors name either a whole group (`"string"`) or a single operation
//! (`"string:uc"`). The first install onto a prototype marks it with this
//! library's identifier; later installs proceed only while the marker names
//! the same library at a version no newer than ours.

use crate::config::ProtolibConfig;
use crate::prototype::{InstalledMarker, Prototype, Prototypes};
use crate::registry::{Operation, Registry};
use protolib_core::{Group, Result, Version, VersionInfo};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default library identifier
pub const LIBRARY: &str = "protolib";

/// Binds registry operations onto prototypes
#[derive(Debug, Clone)]
pub struct Installer {
    library: String,
    version: Version,
    force: bool,
    registry: Arc<Registry>,
}

impl Installer {
    /// An installer for this crate's own version and the built-in registry
    pub fn new() -> Result<Self> {
        Self::with_version(LIBRARY, env!("CARGO_PKG_VERSION"))
    }

    /// An installer that claims an explicit identifier and version
    pub fn with_version(library: impl Into<String>, version: &str) -> Result<Self> {
        Ok(Self {
            library: library.into(),
            version: Version::parse(version)?,
            force: false,
            registry: Registry::global(),
        })
    }

    pub fn from_config(config: &ProtolibConfig) -> Result<Self> {
        Ok(Self {
            library: config.library.clone(),
            force: config.force,
            ..Self::new()?
        })
    }

    /// Install from a different operation table
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Overwrite methods that are already bound
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn version(&self) -> VersionInfo {
        self.version.info()
    }

    /// Resolve selectors to qualified operation names without side effects.
    /// Selectors that name nothing are dropped; no selectors means every group.
    pub fn ls<S: AsRef<str>>(&self, selectors: &[S]) -> Vec<String> {
        if selectors.is_empty() {
            return self.registry.qualified_names();
        }

        let mut names = Vec::new();
        for selector in selectors {
            let selector = selector.as_ref();
            if let Ok(group) = selector.parse::<Group>() {
                names.extend(self.registry.operations(group).iter().map(Operation::qualified_name));
            } else if self.registry.lookup(selector).is_some() {
                names.push(selector.to_string());
            } else {
                debug!("Ignoring unknown selector '{}'", selector);
            }
        }
        names
    }

    /// Install onto the global prototypes
    pub fn install<S: AsRef<str>>(&self, selectors: &[S]) -> Vec<String> {
        self.install_into(Prototypes::global(), selectors)
    }

    /// Install onto the given prototypes, returning the names actually bound
    pub fn install_into<S: AsRef<str>>(&self, prototypes: &Prototypes, selectors: &[S]) -> Vec<String> {
        let mut admitted: FxHashMap<Group, bool> = FxHashMap::default();
        let mut bound = Vec::new();

        for qualified in self.ls(selectors) {
            let Some(op) = self.registry.lookup(&qualified) else {
                continue;
            };
            let group = op.group;

            let allowed = *admitted
                .entry(group)
                .or_insert_with(|| prototypes.update(group, |proto| self.admit(group, proto)));
            if !allowed {
                continue;
            }

            let newly_bound = prototypes.update(group, |proto| {
                if proto.is_bound(&op.name) && !self.force {
                    debug!("{} already bound, skipping", qualified);
                    false
                } else {
                    proto.bind(op.clone());
                    true
                }
            });
            if newly_bound {
                debug!("Bound {}", qualified);
                bound.push(qualified);
            }
        }

        info!(
            "Installed {} operations from {}@{}",
            bound.len(),
            self.library,
            self.version
        );
        bound
    }

    /// Remove bindings from the global prototypes
    pub fn uninstall<S: AsRef<str>>(&self, selectors: &[S]) -> Vec<String> {
        self.uninstall_from(Prototypes::global(), selectors)
    }

    /// Remove bindings unconditionally; markers are left in place
    pub fn uninstall_from<S: AsRef<str>>(&self, prototypes: &Prototypes, selectors: &[S]) -> Vec<String> {
        let mut removed = Vec::new();
        for qualified in self.ls(selectors) {
            let Some(op) = self.registry.lookup(&qualified) else {
                continue;
            };
            if prototypes.update(op.group, |proto| proto.unbind(&op.name)) {
                debug!("Unbound {}", qualified);
                removed.push(qualified);
            }
        }

        info!("Uninstalled {} operations", removed.len());
        removed
    }

    /// The version gate; claims an unmarked prototype and refreshes our own marker
    fn admit(&self, group: Group, proto: &mut Prototype) -> bool {
        let marker = proto.marker_mut().get_or_insert_with(|| InstalledMarker {
            library: self.library.clone(),
            version: 0,
        });

        if marker.library != self.library {
            warn!(
                "{} prototype belongs to {}, not installing {}",
                group, marker.library, self.library
            );
            return false;
        }

        let installed = Version::from_packed(marker.version);
        if installed > self.version {
            warn!(
                "{} prototype has {}@{} installed, not downgrading to {}",
                group, marker.library, installed, self.version
            );
            return false;
        }

        marker.version = self.version.packed();
        true
    }
}
