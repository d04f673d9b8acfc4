use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use devnet_compilation_utils::test_utils::{slow_compiler_script, write_executable_script};
use devnet_compile_to_casm_types::test_utils::{
    other_test_sierra_class,
    test_sierra_class,
    TEST_SIERRA_CLASS_FINGERPRINT,
};
use devnet_compile_to_casm_types::{
    BackendConfigError,
    ClassDeclarerClient,
    ClassFingerprint,
    ClassHash,
    CompilerBackend,
    DeclarationError,
    SierraCompilationConfig,
};
use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

use crate::cache::ArtifactCache;
use crate::compiler::SierraToCasmCompiler;
use crate::declarer::{
    create_class_declarer,
    ClassDeclarer,
    ClassHashCalculator,
    MockClassHashCalculator,
    StarknetKeccakClassHasher,
};

fn declarer_with_timeout(
    compiler_path: &Path,
    compilation_timeout: Duration,
    cache: Arc<ArtifactCache>,
) -> ClassDeclarer {
    let config = SierraCompilationConfig {
        compilation_timeout,
        ..SierraCompilationConfig::create_for_testing()
    };
    let backend = CompilerBackend::CustomBinaryPath { path: compiler_path.to_path_buf() };
    ClassDeclarer::new(
        Arc::new(SierraToCasmCompiler::new(&config, backend)),
        cache,
        Arc::new(StarknetKeccakClassHasher),
    )
}

#[tokio::test]
async fn failing_compiler_failure_is_cached() {
    let config = SierraCompilationConfig {
        sierra_compiler_path: Some("/bin/false".into()),
        ..SierraCompilationConfig::create_for_testing()
    };
    let declarer = create_class_declarer(&config).unwrap();

    let first = declarer.declare(test_sierra_class()).await;
    let error = assert_matches!(&first, Err(error) => error);
    assert_matches!(error, DeclarationError::CompilationFailed(_));
    assert_eq!(error.kind(), "CompilationFailed");

    let second = declarer.declare(test_sierra_class()).await;
    assert_eq!(second, first);
    assert_eq!(declarer.compiler().n_invocations(), 1);
    assert_eq!(declarer.cache().len(), 1);
}

#[test]
fn missing_manifest_fails_at_startup() {
    let config = SierraCompilationConfig {
        cairo_compiler_manifest: Some("/nonexistent/cairo/Cargo.toml".into()),
        ..SierraCompilationConfig::create_for_testing()
    };
    assert_matches!(
        create_class_declarer(&config),
        Err(BackendConfigError::ManifestNotFound(path))
            if path == Path::new("/nonexistent/cairo/Cargo.toml")
    );
}

#[test]
fn debug_output_names_the_backend() {
    let config = SierraCompilationConfig {
        sierra_compiler_path: Some("/bin/false".into()),
        ..SierraCompilationConfig::create_for_testing()
    };
    let declarer = create_class_declarer(&config).unwrap();

    let expected_backend = CompilerBackend::CustomBinaryPath { path: "/bin/false".into() };
    assert_eq!(declarer.compiler().backend(), &expected_backend);
    let debug_output = format!("{declarer:?}");
    assert!(debug_output.starts_with("ClassDeclarer"), "{debug_output}");
    assert!(debug_output.contains("custom:/bin/false"), "{debug_output}");
}

#[tokio::test]
async fn timed_out_declaration_is_retried() {
    let dir = TempDir::new().unwrap();
    let slow_compiler = write_executable_script(
        dir.path(),
        "compiler",
        &slow_compiler_script(Duration::from_millis(500)),
    );
    let cache = Arc::new(ArtifactCache::new());
    let impatient = declarer_with_timeout(&slow_compiler, Duration::from_millis(1), cache.clone());
    let patient = declarer_with_timeout(&slow_compiler, Duration::from_secs(10), cache.clone());

    let timed_out = impatient.declare(test_sierra_class()).await;
    assert_matches!(
        &timed_out,
        Err(error) if error.kind() == "InvocationTimeout" && error.is_retryable()
    );
    assert!(cache.is_empty());

    let declared = patient.declare(test_sierra_class()).await.unwrap();
    assert_eq!(declared.casm.fingerprint.to_string(), TEST_SIERRA_CLASS_FINGERPRINT);
    assert_eq!(cache.len(), 1);

    // Served from the cache from now on, whatever the caller's timeout.
    assert_eq!(impatient.declare(test_sierra_class()).await, Ok(declared.clone()));
    assert_eq!(patient.declare(test_sierra_class()).await, Ok(declared));
    assert_eq!(impatient.compiler().n_invocations(), 1);
    assert_eq!(patient.compiler().n_invocations(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_declarations_compile_once() {
    const N_DECLARATIONS: usize = 8;
    let dir = TempDir::new().unwrap();
    let slow_compiler = write_executable_script(
        dir.path(),
        "compiler",
        &slow_compiler_script(Duration::from_millis(200)),
    );
    let declarer = Arc::new(declarer_with_timeout(
        &slow_compiler,
        Duration::from_secs(10),
        Arc::new(ArtifactCache::new()),
    ));

    let declarations: Vec<_> = (0..N_DECLARATIONS)
        .map(|_| {
            let declarer = declarer.clone();
            tokio::spawn(async move { declarer.declare(test_sierra_class()).await })
        })
        .collect();
    let mut results = Vec::new();
    for declaration in declarations {
        results.push(declaration.await.unwrap());
    }

    assert_eq!(declarer.compiler().n_invocations(), 1);
    assert!(results[0].is_ok());
    assert!(results.iter().all(|result| result == &results[0]));
}

#[tokio::test]
async fn distinct_classes_compile_separately() {
    let dir = TempDir::new().unwrap();
    let compiler =
        write_executable_script(dir.path(), "compiler", &slow_compiler_script(Duration::ZERO));
    let declarer =
        declarer_with_timeout(&compiler, Duration::from_secs(10), Arc::new(ArtifactCache::new()));

    let first = declarer.declare(other_test_sierra_class(1)).await.unwrap();
    let second = declarer.declare(other_test_sierra_class(2)).await.unwrap();

    assert_ne!(first.casm.fingerprint, second.casm.fingerprint);
    assert_ne!(first.class_hash, second.class_hash);
    assert_eq!(declarer.compiler().n_invocations(), 2);
}

#[tokio::test]
async fn class_hash_comes_from_the_calculator() {
    let dir = TempDir::new().unwrap();
    let compiler =
        write_executable_script(dir.path(), "compiler", &slow_compiler_script(Duration::ZERO));
    let expected_class_hash = ClassHash([0x12; 32]);

    let mut class_hasher = MockClassHashCalculator::new();
    class_hasher
        .expect_class_hash()
        .with(eq(test_sierra_class().to_vec()))
        .times(2)
        .return_const(expected_class_hash);
    let declarer = ClassDeclarer::new(
        Arc::new(SierraToCasmCompiler::new(
            &SierraCompilationConfig::create_for_testing(),
            CompilerBackend::CustomBinaryPath { path: compiler },
        )),
        Arc::new(ArtifactCache::new()),
        Arc::new(class_hasher),
    );

    for _ in 0..2 {
        let declared = declarer.declare(test_sierra_class()).await.unwrap();
        assert_eq!(declared.class_hash, expected_class_hash);
        assert_eq!(declared.casm.fingerprint, ClassFingerprint::of_test_class());
    }
    assert_eq!(declarer.compiler().n_invocations(), 1);
}

#[rstest]
#[case::empty(b"", "0x01d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")]
fn starknet_keccak_class_hash(#[case] sierra: &[u8], #[case] expected: &str) {
    let class_hash = StarknetKeccakClassHasher.class_hash(sierra);
    assert_eq!(class_hash.to_string(), expected);
    assert_eq!(class_hash.0[0] & 0b1111_1100, 0);
}
