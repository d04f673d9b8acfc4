use std::path::Path;

use crate::toml_utils::ROOT_TOML;

#[test]
fn test_package_names_match_directory() {
    let mismatched_packages: Vec<_> = ROOT_TOML
        .member_cargo_tomls()
        .into_iter()
        .filter(|(member, cargo_toml)| {
            Path::new(member).file_name().and_then(|name| name.to_str())
                != Some(cargo_toml.package.name.as_str())
        })
        .map(|(member, _)| member)
        .collect();
    assert!(
        mismatched_packages.is_empty(),
        "The following crates have package names that do not match their directory names: \
         {mismatched_packages:?}."
    );
}

#[test]
fn test_members_use_workspace_lints() {
    let members_without_lints: Vec<_> = ROOT_TOML
        .member_cargo_tomls()
        .into_iter()
        .filter(|(_, cargo_toml)| {
            cargo_toml.lints.as_ref().and_then(|lints| lints.workspace) != Some(true)
        })
        .map(|(member, _)| member)
        .collect();
    assert!(
        members_without_lints.is_empty(),
        "The following crates do not inherit the workspace lints: {members_without_lints:?}."
    );
}
