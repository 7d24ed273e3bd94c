use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pet_match::config::{LoggingSettings, Settings};
use pet_match::core::{CorpusVectors, EmbeddingBackend, EmbeddingProvider, Explainer, Matcher, Pipeline};
use pet_match::routes::{self, AppState};
use pet_match::services::{Corpus, EmbeddingCache, EmbeddingClient};

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // Initialize logging
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_logging(&logging);

    info!("Starting Pet Match service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    let corpus = Arc::new(Corpus::load(&settings.data.corpus_path).map_err(|e| {
        error!("Failed to load corpus from {}: {}", settings.data.corpus_path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?);

    let weights = settings.scoring_weights();
    let matcher = Matcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    let mut pipeline = Pipeline::new(
        corpus.clone(),
        matcher,
        Explainer::new(settings.matching.similarity_threshold),
    );

    if settings.matching.use_embeddings {
        match build_embedding_backend(&settings, &corpus).await {
            Some(backend) => {
                info!("Embedding strategy enabled with model {}", backend.model_name());
                pipeline = pipeline.with_embeddings(Arc::new(backend));
            }
            None => warn!("Embedding strategy unavailable, using heuristic scoring only"),
        }
    }

    let app_state = AppState {
        pipeline: Arc::new(pipeline),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

/// Build the provider and embed the corpus, `None` on any failure
async fn build_embedding_backend(settings: &Settings, corpus: &Corpus) -> Option<EmbeddingBackend> {
    let embedding = &settings.embedding;

    let Some(api_key) = embedding.api_key() else {
        warn!("use_embeddings is set but no embedding API key is configured");
        return None;
    };

    let client = match EmbeddingClient::new(
        embedding.endpoint.clone(),
        api_key.to_string(),
        embedding.model.clone(),
    ) {
        Ok(client) => client
            .with_retry(embedding.retry_policy())
            .with_cache(EmbeddingCache::new(embedding.cache_size, embedding.cache_ttl_secs)),
        Err(e) => {
            error!("Failed to create embedding client: {}", e);
            return None;
        }
    };

    let vectors = match CorpusVectors::build(corpus.records(), &client).await {
        Ok(vectors) => vectors,
        Err(e) => {
            error!("Failed to embed corpus: {}", e);
            return None;
        }
    };

    let provider: Arc<dyn EmbeddingProvider> = Arc::new(client);
    Some(EmbeddingBackend::new(
        provider,
        Arc::new(vectors),
        settings.matching.embedding_timeout(),
    ))
}
