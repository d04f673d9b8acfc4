use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use devnet_compilation_utils::build_utils::{build_compiler_from_manifest, CARGO_PROGRAM};
use devnet_compilation_utils::compiler_utils::{compile_with_args, compiler_version};
use devnet_compilation_utils::paths::default_manifest_target_dir;
use devnet_compilation_utils::resource_limits::ResourceLimits;
use devnet_compile_to_casm_types::{
    BackendId,
    CasmArtifact,
    ClassFingerprint,
    CompileError,
    CompileResult,
    CompilerArgsConfig,
    CompilerBackend,
    SierraCompilationConfig,
};
use serde::de::IgnoredAny;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::args::compose_compiler_args;
use crate::metrics::{
    record_compilation_duration,
    record_invocation,
    record_manifest_build,
    register_metrics,
};

#[cfg(test)]
#[path = "compiler_test.rs"]
mod compiler_test;

type ManifestBuildResult = Result<PathBuf, CompileError>;

// One build per manifest per process, shared by every compiler instance. A failed build is kept
// and returned to every later caller.
static MANIFEST_BUILDS: LazyLock<DashMap<PathBuf, Arc<OnceCell<ManifestBuildResult>>>> =
    LazyLock::new(DashMap::new);

/// Invokes the resolved compiler backend as an external process.
#[derive(Debug)]
pub struct SierraToCasmCompiler {
    backend: CompilerBackend,
    backend_id: BackendId,
    compiler_args: CompilerArgsConfig,
    compilation_timeout: Duration,
    resource_limits: ResourceLimits,
    build_program: OsString,
    manifest_build_target_dir: Option<PathBuf>,
    n_invocations: AtomicUsize,
}

impl SierraToCasmCompiler {
    pub fn new(config: &SierraCompilationConfig, backend: CompilerBackend) -> Self {
        register_metrics();
        Self {
            backend_id: backend.id(),
            backend,
            compiler_args: config.compiler_args.clone(),
            compilation_timeout: config.compilation_timeout,
            resource_limits: ResourceLimits::from(&config.resource_limits),
            build_program: CARGO_PROGRAM.into(),
            manifest_build_target_dir: config.manifest_build_target_dir.clone(),
            n_invocations: AtomicUsize::new(0),
        }
    }

    /// Replaces `cargo` as the program running manifest builds.
    pub fn with_build_program(mut self, build_program: impl Into<OsString>) -> Self {
        self.build_program = build_program.into();
        self
    }

    pub fn backend(&self) -> &CompilerBackend {
        &self.backend
    }

    pub fn backend_id(&self) -> &BackendId {
        &self.backend_id
    }

    /// The number of compiler processes spawned so far, excluding version queries.
    pub fn n_invocations(&self) -> usize {
        self.n_invocations.load(Ordering::SeqCst)
    }

    #[instrument(skip(self, sierra), fields(backend = %self.backend_id), err)]
    pub async fn compile(&self, sierra: &[u8]) -> CompileResult {
        validate_sierra(sierra)?;
        let fingerprint = ClassFingerprint::of(sierra);
        let compiler_binary_path = self.compiler_binary_path().await?;

        self.n_invocations.fetch_add(1, Ordering::SeqCst);
        record_invocation();
        let start = Instant::now();
        let compile_output = compile_with_args(
            &compiler_binary_path,
            sierra,
            |input_path| compose_compiler_args(input_path, &self.compiler_args),
            self.resource_limits,
            self.compilation_timeout,
        )
        .await;
        record_compilation_duration(start.elapsed());
        let casm = compile_output?;

        if let Err(error) = serde_json::from_slice::<IgnoredAny>(&casm) {
            return Err(CompileError::CompilationFailed {
                stderr_excerpt: format!("The compiler output is not a JSON document: {error}"),
            });
        }
        debug!(%fingerprint, casm_bytes = casm.len(), "Compiled Sierra to CASM.");
        Ok(CasmArtifact { bytes: casm.into(), fingerprint })
    }

    /// The version reported by the backend binary, building it first for a manifest backend.
    pub async fn compiler_version(&self) -> Result<String, CompileError> {
        let compiler_binary_path = self.compiler_binary_path().await?;
        compiler_version(&compiler_binary_path, self.compilation_timeout).await
    }

    async fn compiler_binary_path(&self) -> Result<PathBuf, CompileError> {
        match &self.backend {
            CompilerBackend::EmbeddedBinary { path }
            | CompilerBackend::CustomBinaryPath { path } => Ok(path.clone()),
            CompilerBackend::ManifestBuild { manifest_path } => {
                self.build_from_manifest(manifest_path).await
            }
        }
    }

    async fn build_from_manifest(&self, manifest_path: &Path) -> Result<PathBuf, CompileError> {
        let build = MANIFEST_BUILDS.entry(manifest_path.to_path_buf()).or_default().clone();
        build
            .get_or_init(|| async {
                record_manifest_build();
                let target_dir = self
                    .manifest_build_target_dir
                    .clone()
                    .unwrap_or_else(|| default_manifest_target_dir(manifest_path));
                build_compiler_from_manifest(&self.build_program, manifest_path, &target_dir).await
            })
            .await
            .clone()
    }
}

fn validate_sierra(sierra: &[u8]) -> Result<(), CompileError> {
    if sierra.is_empty() {
        return Err(CompileError::InvalidInput("The Sierra artifact is empty.".to_owned()));
    }
    serde_json::from_slice::<IgnoredAny>(sierra).map_err(|error| {
        CompileError::InvalidInput(format!("The Sierra artifact is not a JSON document: {error}"))
    })?;
    Ok(())
}
