use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use tracing::info;

pub const COMPILATION_DURATION: &str = "compile_to_casm_compilation_duration_seconds";
pub const COMPILATION_INVOCATIONS: &str = "compile_to_casm_invocations";
pub const CACHE_HITS: &str = "compile_to_casm_cache_hits";
pub const CACHE_MISSES: &str = "compile_to_casm_cache_misses";
pub const MANIFEST_BUILDS: &str = "compile_to_casm_manifest_builds";

pub(crate) fn register_metrics() {
    info!("Initializing compile to CASM metrics");
    describe_histogram!(
        COMPILATION_DURATION,
        Unit::Seconds,
        "Duration of a single compiler invocation in seconds"
    );
    describe_counter!(COMPILATION_INVOCATIONS, "Number of compiler processes spawned");
    describe_counter!(CACHE_HITS, "Number of compilations served from the artifact cache");
    describe_counter!(CACHE_MISSES, "Number of compilations not found in the artifact cache");
    describe_counter!(MANIFEST_BUILDS, "Number of compiler builds from a cargo manifest");
}

pub(crate) fn record_invocation() {
    counter!(COMPILATION_INVOCATIONS).increment(1);
}

pub(crate) fn record_compilation_duration(duration: Duration) {
    histogram!(COMPILATION_DURATION).record(duration.as_secs_f64());
}

pub(crate) fn record_cache_lookup(hit: bool) {
    if hit {
        counter!(CACHE_HITS).increment(1);
    } else {
        counter!(CACHE_MISSES).increment(1);
    }
}

pub(crate) fn record_manifest_build() {
    counter!(MANIFEST_BUILDS).increment(1);
}
