use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DependencyValue {
    String(String),
    Object {
        version: Option<String>,
        path: Option<String>,
        workspace: Option<bool>,
    },
}

impl DependencyValue {
    fn path(&self) -> Option<&str> {
        match self {
            Self::Object { path, .. } => path.as_deref(),
            Self::String(_) => None,
        }
    }

    pub(crate) fn is_inherited_from_workspace(&self) -> bool {
        matches!(self, Self::Object { workspace: Some(true), .. })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WorkspacePackage {
    version: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WorkspaceFields {
    package: WorkspacePackage,
    members: Vec<String>,
    dependencies: BTreeMap<String, DependencyValue>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CargoToml {
    workspace: WorkspaceFields,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct MemberPackage {
    pub(crate) name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct LintsField {
    pub(crate) workspace: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct MemberCargoToml {
    pub(crate) package: MemberPackage,
    pub(crate) lints: Option<LintsField>,
    #[serde(default)]
    dependencies: BTreeMap<String, DependencyValue>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, DependencyValue>,
}

impl MemberCargoToml {
    /// Regular and dev dependencies, by name.
    pub(crate) fn all_dependencies(
        &self,
    ) -> impl Iterator<Item = (&String, &DependencyValue)> + '_ {
        self.dependencies.iter().chain(self.dev_dependencies.iter())
    }
}

#[derive(Debug)]
pub(crate) struct LocalCrate {
    pub(crate) path: String,
    pub(crate) version: Option<String>,
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..")
}

pub(crate) static ROOT_TOML: LazyLock<CargoToml> = LazyLock::new(|| {
    toml::from_str(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../Cargo.toml"))).unwrap()
});

impl CargoToml {
    pub(crate) fn members(&self) -> &Vec<String> {
        &self.workspace.members
    }

    pub(crate) fn workspace_version(&self) -> &str {
        &self.workspace.package.version
    }

    pub(crate) fn workspace_path_dependencies(&self) -> impl Iterator<Item = LocalCrate> + '_ {
        self.workspace.dependencies.values().filter_map(|value| {
            let path = value.path()?;
            let version = match value {
                DependencyValue::Object { version, .. } => version.clone(),
                DependencyValue::String(version) => Some(version.clone()),
            };
            Some(LocalCrate { path: path.to_owned(), version })
        })
    }

    /// The parsed Cargo.toml of every member, keyed by the member's path.
    pub(crate) fn member_cargo_tomls(&self) -> BTreeMap<String, MemberCargoToml> {
        self.members()
            .iter()
            .map(|member| {
                let cargo_toml_path = workspace_root().join(member).join("Cargo.toml");
                let content = fs::read_to_string(&cargo_toml_path)
                    .unwrap_or_else(|error| panic!("Failed to read {cargo_toml_path:?}: {error}"));
                let cargo_toml = toml::from_str(&content)
                    .unwrap_or_else(|error| panic!("Failed to parse {cargo_toml_path:?}: {error}"));
                (member.clone(), cargo_toml)
            })
            .collect()
    }
}
