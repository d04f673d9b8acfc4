#[cfg(test)]
mod package_integrity_test;
#[cfg(test)]
mod toml_utils;
#[cfg(test)]
mod version_integrity_test;
