//! Install lifecycle state machine
//!
//! Combines the [`InstalledRecord`] found on the cluster, the requested
//! [`Operation`] and the catalog's version set into a [`Decision`]:
//!
//! | Operation | NotInstalled | Missing labels | requested > installed | equal | requested < installed |
//! |-----------|--------------|----------------|-----------------------|-------|-----------------------|
//! | install   | allow        | deny           | deny (upgrade)        | deny  | deny                  |
//! | upgrade   | deny         | deny           | allow                 | deny  | deny (downgrade)      |
//! | downgrade | deny         | deny           | deny (upgrade)        | deny  | allow                 |
//! | reinstall | deny         | allow          | allow                 | allow | allow                 |
//!
//! Every deny carries the exact user-facing message; scripts match on it.

use std::cmp::Ordering;

use crate::error::{CoreError, Result};
use crate::installed::InstalledRecord;
use crate::resource::{DEFAULT_CATALOG, Operation, OperationRequest};
use crate::version::{VersionComparator, VersionString};

/// Outcome of the lifecycle state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Resolution),
    Deny(Denial),
}

/// What an allowed operation will apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub catalog: String,
    pub version: VersionString,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn resolved_version(&self) -> Option<&VersionString> {
        match self {
            Self::Allow(resolution) => Some(&resolution.version),
            Self::Deny(_) => None,
        }
    }

    /// Human-readable reason
    pub fn reason(&self) -> String {
        match self {
            Self::Allow(r) => format!("v{} from {} catalog", r.version, r.catalog),
            Self::Deny(denial) => denial.message().to_string(),
        }
    }

    /// Turn a denial into its error
    pub fn into_result(self) -> Result<Resolution> {
        match self {
            Self::Allow(resolution) => Ok(resolution),
            Self::Deny(denial) => Err(denial.into_error()),
        }
    }
}

/// Why an operation was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// upgrade/downgrade/reinstall of an object that does not exist
    NotInstalled,

    /// Object exists without the labels needed to compare versions
    MissingLabels { catalog_missing: bool },

    /// install over an existing object
    AlreadyExists {
        installed: VersionString,
        requested: VersionString,
        ordering: Ordering,
    },

    SameVersion { requested: VersionString },

    /// upgrade to a version older than the installed one
    ExistingHigher {
        installed: VersionString,
        requested: VersionString,
    },

    /// downgrade to a version newer than the installed one
    ExistingLower {
        installed: VersionString,
        requested: VersionString,
    },

    NotInCatalog {
        version: VersionString,
        catalog: String,
    },
}

/// A refusal with its rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    reason: DenyReason,
    message: String,
}

impl Denial {
    fn new(reason: DenyReason, request: &OperationRequest) -> Self {
        let message = render(&reason, request);
        Self { reason, message }
    }

    pub fn reason(&self) -> &DenyReason {
        &self.reason
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_error(self) -> CoreError {
        let message = self.message;
        match self.reason {
            DenyReason::MissingLabels { .. } => CoreError::StateError { message },
            DenyReason::NotInCatalog { .. } => CoreError::NotFoundInCatalog { message },
            _ => CoreError::VersionConflict { message },
        }
    }
}

fn render(reason: &DenyReason, req: &OperationRequest) -> String {
    let title = req.kind.title();
    let kind = req.kind.as_str();
    let name = &req.name;
    let ns = &req.namespace;
    let op = req.operation.as_str();

    match reason {
        DenyReason::NotInstalled => format!(
            "{title} {name} doesn't exist in {ns} namespace. Use install command to install the {kind}"
        ),
        DenyReason::MissingLabels { catalog_missing } => {
            let missing = if *catalog_missing {
                "version and catalog label"
            } else {
                "version label"
            };
            if req.operation == Operation::Install {
                format!(
                    "{title} {name} already exists in {ns} namespace but seems to be missing {missing}. Use reinstall command to overwrite existing"
                )
            } else {
                format!(
                    "{title} {name} seems to be missing {missing}. Use reinstall command to overwrite existing {kind}"
                )
            }
        }
        DenyReason::AlreadyExists {
            installed,
            requested,
            ordering,
        } => match ordering {
            Ordering::Greater => format!(
                "{title} {name}({installed}) already exists in {ns} namespace. Use upgrade command to install v{requested}"
            ),
            Ordering::Equal => format!(
                "{title} {name}({installed}) already exists in {ns} namespace. Use reinstall command to overwrite existing"
            ),
            Ordering::Less => format!(
                "{title} {name}({installed}) already exists in {ns} namespace. Use reinstall command to install v{requested}"
            ),
        },
        DenyReason::SameVersion { requested } => format!(
            "cannot {op} {kind} {name} to v{requested}. existing resource seems to be of same version. Use reinstall command to overwrite existing {kind}"
        ),
        DenyReason::ExistingHigher {
            installed,
            requested,
        } => format!(
            "cannot {op} {kind} {name} to v{requested}. existing resource seems to be of higher version(v{installed}). Use downgrade command"
        ),
        DenyReason::ExistingLower {
            installed,
            requested,
        } => format!(
            "cannot {op} {kind} {name} to v{requested}. existing resource seems to be of lower version(v{installed}). Use upgrade command"
        ),
        DenyReason::NotInCatalog { version, catalog } => {
            format!("{title} {name}({version}) not found in {catalog} catalog")
        }
    }
}

/// The lifecycle state machine
#[derive(Debug, Clone)]
pub struct LifecycleDecision {
    comparator: VersionComparator,
    default_catalog: String,
}

impl Default for LifecycleDecision {
    fn default() -> Self {
        Self::new(VersionComparator::default())
    }
}

impl LifecycleDecision {
    pub fn new(comparator: VersionComparator) -> Self {
        Self {
            comparator,
            default_catalog: DEFAULT_CATALOG.to_string(),
        }
    }

    /// Catalog used when neither the request nor the installed object names one
    pub fn with_default_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.default_catalog = catalog.into();
        self
    }

    pub fn comparator(&self) -> &VersionComparator {
        &self.comparator
    }

    /// Denials that do not depend on catalog data
    ///
    /// Callers use this to fail before any network round trip; [`decide`]
    /// applies the same checks first.
    ///
    /// [`decide`]: Self::decide
    pub fn precheck(&self, record: &InstalledRecord, request: &OperationRequest) -> Option<Denial> {
        let reason = match (record, request.operation) {
            (InstalledRecord::NotInstalled, Operation::Install) => return None,
            (InstalledRecord::NotInstalled, _) => DenyReason::NotInstalled,
            (InstalledRecord::MissingBoth, Operation::Reinstall)
            | (InstalledRecord::MissingVersion { .. }, Operation::Reinstall) => return None,
            (InstalledRecord::MissingBoth, _) => DenyReason::MissingLabels {
                catalog_missing: true,
            },
            (InstalledRecord::MissingVersion { .. }, _) => DenyReason::MissingLabels {
                catalog_missing: false,
            },
            (InstalledRecord::Present { .. }, _) => return None,
        };
        Some(Denial::new(reason, request))
    }

    /// Catalog whose version set the request resolves against
    pub fn target_catalog(&self, record: &InstalledRecord, request: &OperationRequest) -> String {
        let catalog = match request.operation {
            Operation::Install => request.catalog.as_deref(),
            Operation::Upgrade | Operation::Downgrade => {
                record.catalog().or(request.catalog.as_deref())
            }
            Operation::Reinstall => request.catalog.as_deref().or(record.catalog()),
        };
        catalog.unwrap_or(&self.default_catalog).to_string()
    }

    /// Decide whether `request` may proceed
    ///
    /// `available` is the resource's version set in the target catalog. It
    /// is only read. Fails with [`CoreError::EmptySet`] when a version must
    /// be picked from an empty set.
    pub fn decide(
        &self,
        record: &InstalledRecord,
        request: &OperationRequest,
        available: &[VersionString],
    ) -> Result<Decision> {
        if let Some(denial) = self.precheck(record, request) {
            return Ok(Decision::Deny(denial));
        }

        let catalog = self.target_catalog(record, request);
        let deny = |reason| Ok(Decision::Deny(Denial::new(reason, request)));

        let wanted = match (&request.version, request.operation) {
            (Some(version), _) => Some(version),
            (None, Operation::Reinstall) => record.version(),
            (None, _) => None,
        };
        let requested = match wanted {
            Some(version) => match self.comparator.find(available, version) {
                Some(found) => found.clone(),
                None => {
                    return deny(DenyReason::NotInCatalog {
                        version: version.clone(),
                        catalog,
                    });
                }
            },
            None => self.comparator.latest(&request.name, available)?,
        };

        tracing::debug!(
            operation = %request.operation,
            installed = ?record,
            requested = %requested,
            catalog = %catalog,
            "deciding lifecycle operation"
        );

        let resolution = Resolution {
            catalog,
            version: requested.clone(),
        };

        // precheck leaves only fresh installs and reinstalls over unlabelled objects
        let Some(installed) = record.version() else {
            return Ok(Decision::Allow(resolution));
        };

        let ordering = self.comparator.compare(&requested, installed);
        let installed = installed.clone();

        match (request.operation, ordering) {
            (Operation::Reinstall, _)
            | (Operation::Upgrade, Ordering::Greater)
            | (Operation::Downgrade, Ordering::Less) => Ok(Decision::Allow(resolution)),
            (Operation::Install, ordering) => deny(DenyReason::AlreadyExists {
                installed,
                requested,
                ordering,
            }),
            (Operation::Upgrade | Operation::Downgrade, Ordering::Equal) => {
                deny(DenyReason::SameVersion { requested })
            }
            (Operation::Upgrade, Ordering::Less) => deny(DenyReason::ExistingHigher {
                installed,
                requested,
            }),
            (Operation::Downgrade, Ordering::Greater) => deny(DenyReason::ExistingLower {
                installed,
                requested,
            }),
        }
    }
}
