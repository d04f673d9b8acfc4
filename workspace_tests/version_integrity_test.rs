use crate::toml_utils::{LocalCrate, ROOT_TOML};

#[test]
fn workspace_path_dependencies_are_members() {
    let members = ROOT_TOML.members();
    let outside_workspace: Vec<LocalCrate> = ROOT_TOML
        .workspace_path_dependencies()
        .filter(|local_crate| !members.contains(&local_crate.path))
        .collect();
    assert!(
        outside_workspace.is_empty(),
        "Path dependencies missing from the workspace members: {outside_workspace:?}."
    );
}

#[test]
fn workspace_path_dependencies_pin_the_workspace_version() {
    let workspace_version = ROOT_TOML.workspace_version();
    let misversioned: Vec<LocalCrate> = ROOT_TOML
        .workspace_path_dependencies()
        .filter(|local_crate| local_crate.version.as_deref() != Some(workspace_version))
        .collect();
    assert!(
        misversioned.is_empty(),
        "Path dependencies not pinned to the workspace version {workspace_version}: \
         {misversioned:?}."
    );
}

#[test]
fn members_inherit_workspace_dependencies() {
    let non_inherited: Vec<String> = ROOT_TOML
        .member_cargo_tomls()
        .iter()
        .flat_map(|(member, cargo_toml)| {
            cargo_toml
                .all_dependencies()
                .filter(|(_, value)| !value.is_inherited_from_workspace())
                .map(move |(name, _)| format!("{member}: {name}"))
        })
        .collect();
    assert!(
        non_inherited.is_empty(),
        "Dependencies declared without `workspace = true`: {non_inherited:?}."
    );
}
