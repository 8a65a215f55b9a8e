//! Deployment request model and input validation.
//!
//! Pure functions only; path existence is checked by the caller.

use std::path::{Path, PathBuf};

use crate::domain::connection::ConnectionDescriptor;
use crate::domain::error::InputError;

const PACKAGE_EXTENSION: &str = "dacpac";
const SCRIPT_EXTENSION: &str = "sql";

/// External binary a request is executed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentTool {
    SqlPackage,
    SqlCmd,
}

impl DeploymentTool {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SqlPackage => "sqlpackage",
            Self::SqlCmd => "sqlcmd",
        }
    }
}

/// Which artifact the step was asked to deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentTarget {
    Package(PathBuf),
    Script(PathBuf),
}

impl DeploymentTarget {
    /// Pick the target from the optional `dacpac-package` and `sql-file`
    /// inputs. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if neither or both inputs are set, or if the file
    /// extension does not match the input kind.
    pub fn from_inputs(package: Option<&str>, script: Option<&str>) -> Result<Self, InputError> {
        let package = package.map(str::trim).filter(|s| !s.is_empty());
        let script = script.map(str::trim).filter(|s| !s.is_empty());

        match (package, script) {
            (Some(_), Some(_)) => Err(InputError::ConflictingTargets),
            (None, None) => Err(InputError::NoDeploymentTarget),
            (Some(path), None) => {
                if has_extension(Path::new(path), PACKAGE_EXTENSION) {
                    Ok(Self::Package(PathBuf::from(path)))
                } else {
                    Err(InputError::InvalidPackagePath(path.to_owned()))
                }
            }
            (None, Some(path)) => {
                if has_extension(Path::new(path), SCRIPT_EXTENSION) {
                    Ok(Self::Script(PathBuf::from(path)))
                } else {
                    Err(InputError::InvalidScriptPath(path.to_owned()))
                }
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Package(p) | Self::Script(p) => p,
        }
    }

    /// Same target pointing at a resolved path.
    #[must_use]
    pub fn with_path(self, path: PathBuf) -> Self {
        match self {
            Self::Package(_) => Self::Package(path),
            Self::Script(_) => Self::Script(path),
        }
    }

    /// Combine the target with connection details into a runnable request.
    #[must_use]
    pub fn into_request(
        self,
        connection_string: &str,
        connection: &ConnectionDescriptor,
        extra_args: Vec<String>,
    ) -> DeploymentRequest {
        match self {
            Self::Package(package) => DeploymentRequest::Publish {
                package,
                connection_string: connection_string.to_owned(),
                extra_args,
            },
            Self::Script(script) => DeploymentRequest::Script {
                script,
                connection: connection.clone(),
                extra_args,
            },
        }
    }
}

/// A fully-specified deployment action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentRequest {
    /// `sqlpackage /Action:Publish` of a schema package.
    Publish {
        package: PathBuf,
        connection_string: String,
        extra_args: Vec<String>,
    },
    /// `sqlcmd -i` of a script file.
    Script {
        script: PathBuf,
        connection: ConnectionDescriptor,
        extra_args: Vec<String>,
    },
}

impl DeploymentRequest {
    #[must_use]
    pub fn tool(&self) -> DeploymentTool {
        match self {
            Self::Publish { .. } => DeploymentTool::SqlPackage,
            Self::Script { .. } => DeploymentTool::SqlCmd,
        }
    }

    /// Command-line arguments for the request's tool.
    #[must_use]
    pub fn arguments(&self) -> Vec<String> {
        self.build_arguments(false)
    }

    /// Arguments with credentials masked, for logs.
    #[must_use]
    pub fn redacted_arguments(&self) -> Vec<String> {
        self.build_arguments(true)
    }

    fn build_arguments(&self, redact: bool) -> Vec<String> {
        let mask = |secret: &str| if redact { "***".to_owned() } else { secret.to_owned() };
        match self {
            Self::Publish {
                package,
                connection_string,
                extra_args,
            } => {
                let mut args = vec![
                    "/Action:Publish".to_owned(),
                    format!("/TargetConnectionString:{}", mask(connection_string)),
                    format!("/SourceFile:{}", package.display()),
                ];
                args.extend(extra_args.iter().cloned());
                args
            }
            Self::Script {
                script,
                connection,
                extra_args,
            } => {
                let mut args = vec![
                    "-S".to_owned(),
                    connection.sqlcmd_server(),
                    "-d".to_owned(),
                    connection.database.clone(),
                    "-U".to_owned(),
                    connection.user.clone(),
                    "-P".to_owned(),
                    mask(&connection.password),
                    "-i".to_owned(),
                    script.display().to_string(),
                ];
                args.extend(extra_args.iter().cloned());
                args
            }
        }
    }
}

/// Split the free-form `arguments` input on whitespace.
#[must_use]
pub fn split_arguments(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
}
