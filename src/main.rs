use std::process::ExitCode;
use std::sync::Arc;

use adverse_event_resolver::api::{serve_until_shutdown, ApiContext};
use adverse_event_resolver::config::{self, ServiceConfig};
use adverse_event_resolver::pipeline::adverse_event::{
    CorpusIndex, CorpusTier, LlmExtractionOracle, OllamaClient, SeverityPipeline,
};

fn main() -> ExitCode {
    adverse_event_resolver::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = ServiceConfig::from_env().map_err(|e| e.to_string())?;
    tracing::info!(
        bind = %config.bind_addr,
        ollama = %config.ollama_url,
        model = %config.model,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    // The blocking HTTP client owns its own runtime, so the pipeline is built
    // (and finally dropped) outside the server runtime.
    let corpus = CorpusIndex::load(&config.corpus_paths()).map_err(|e| e.to_string())?;
    if corpus.is_empty() {
        tracing::warn!("Corpus tiers are empty, severity will rely on keywords and oracle only");
    } else {
        tracing::info!(
            significant_disability = corpus.tier_len(CorpusTier::SignificantDisability),
            congenital_anomaly = corpus.tier_len(CorpusTier::CongenitalAnomaly),
            medically_significant = corpus.tier_len(CorpusTier::MedicallySignificant),
            "Corpus ready"
        );
    }
    let llm = OllamaClient::new(
        &config.ollama_url,
        &config.model,
        config.timeout_secs,
        config.max_retries,
    )
    .map_err(|e| e.to_string())?;
    tracing::info!(model = llm.model(), "Oracle client ready");
    let oracle = Arc::new(LlmExtractionOracle::new(llm));
    let pipeline = Arc::new(SeverityPipeline::new(oracle, Arc::new(corpus)));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    let result = runtime.block_on(serve_until_shutdown(
        ApiContext::new(pipeline.clone()),
        config.bind_addr,
    ));
    runtime.shutdown_background();
    drop(pipeline);

    result
}
