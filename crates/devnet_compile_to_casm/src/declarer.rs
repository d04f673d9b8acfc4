use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use devnet_compilation_utils::paths::HostPlatform;
use devnet_compile_to_casm_types::{
    BackendConfigError,
    ClassDeclarerClient,
    ClassFingerprint,
    ClassHash,
    DeclarationResult,
    DeclaredClass,
    RawClass,
    SierraCompilationConfig,
};
#[cfg(test)]
use mockall::automock;
use sha3::{Digest, Keccak256};
use tracing::{info, instrument};

use crate::cache::ArtifactCache;
use crate::compiler::SierraToCasmCompiler;
use crate::resolver::resolve_backend;

#[cfg(test)]
#[path = "declarer_test.rs"]
mod declarer_test;

/// Computes the hash a declared class is registered under.
#[cfg_attr(test, automock)]
pub trait ClassHashCalculator: Send + Sync {
    fn class_hash(&self, sierra: &[u8]) -> ClassHash;
}

/// The Starknet Keccak (Keccak-256 truncated to 250 bits) of the raw Sierra artifact.
#[derive(Clone, Copy, Debug, Default)]
pub struct StarknetKeccakClassHasher;

impl ClassHashCalculator for StarknetKeccakClassHasher {
    fn class_hash(&self, sierra: &[u8]) -> ClassHash {
        let mut hash: [u8; 32] = Keccak256::digest(sierra).into();
        hash[0] &= 0b0000_0011;
        ClassHash(hash)
    }
}

/// Compiles declared classes through the artifact cache.
pub struct ClassDeclarer {
    compiler: Arc<SierraToCasmCompiler>,
    cache: Arc<ArtifactCache>,
    class_hasher: Arc<dyn ClassHashCalculator>,
}

impl ClassDeclarer {
    pub fn new(
        compiler: Arc<SierraToCasmCompiler>,
        cache: Arc<ArtifactCache>,
        class_hasher: Arc<dyn ClassHashCalculator>,
    ) -> Self {
        Self { compiler, cache, class_hasher }
    }

    pub fn compiler(&self) -> &SierraToCasmCompiler {
        &self.compiler
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }
}

impl fmt::Debug for ClassDeclarer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDeclarer")
            .field("compiler", &self.compiler)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ClassDeclarerClient for ClassDeclarer {
    #[instrument(skip(self, sierra), err)]
    async fn declare(&self, sierra: RawClass) -> DeclarationResult<DeclaredClass> {
        let fingerprint = ClassFingerprint::of(&sierra);
        let compiler = self.compiler.clone();
        let class = sierra.clone();
        let casm = self
            .cache
            .get_or_compile(fingerprint, self.compiler.backend_id(), move || async move {
                compiler.compile(&class).await
            })
            .await?;

        let class_hash = self.class_hasher.class_hash(&sierra);
        info!(%class_hash, %fingerprint, "Declared class.");
        Ok(DeclaredClass { class_hash, casm })
    }
}

/// Resolves the compiler backend for this host and wires a declarer with a fresh cache.
pub fn create_class_declarer(
    config: &SierraCompilationConfig,
) -> Result<ClassDeclarer, BackendConfigError> {
    let backend = resolve_backend(config, HostPlatform::current())?;
    Ok(ClassDeclarer::new(
        Arc::new(SierraToCasmCompiler::new(config, backend)),
        Arc::new(ArtifactCache::new()),
        Arc::new(StarknetKeccakClassHasher),
    ))
}
