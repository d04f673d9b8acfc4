use std::ffi::OsString;
use std::path::Path;

use devnet_compile_to_casm_types::CompilerArgsConfig;

#[cfg(test)]
#[path = "args_test.rs"]
mod args_test;

/// The compiler argument vector: the Sierra input path, then the operator flags verbatim.
/// The CASM is read from the compiler's stdout, so no output argument is passed.
pub fn compose_compiler_args(
    input_path: &Path,
    compiler_args: &CompilerArgsConfig,
) -> Vec<OsString> {
    let mut args = Vec::with_capacity(compiler_args.args().len() + 1);
    args.push(input_path.as_os_str().to_owned());
    args.extend(compiler_args.args().iter().map(OsString::from));
    args
}
