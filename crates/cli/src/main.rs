use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use suggest_core::config;
use suggest_core::config::AppConfig;
use suggest_core::populate::{self, PopulateOptions};
use suggest_core::{catalog, compare, search};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => run_serve(cfg, host, port).await,
        Commands::Populate {
            taxonomy_file,
            max_level,
            collection,
            model,
            batch_size,
            json,
        } => run_populate(cfg, taxonomy_file, max_level, collection, model, batch_size, json).await,
        Commands::Search {
            query,
            limit,
            collection,
            model,
        } => run_search(cfg, query, limit, collection, model).await,
        Commands::Compare {
            query,
            models,
            limit,
        } => run_compare(cfg, query, models, limit).await,
        Commands::Models { json } => run_models(json),
        Commands::Collections { json } => run_collections(cfg, json).await,
        Commands::DeleteCollection { name } => run_delete_collection(cfg, name).await,
    }
}

#[derive(Parser)]
#[command(name = "search-suggest")]
#[command(about = "Vector search suggestions over a merchant-category taxonomy", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Parse the taxonomy and load embeddings into the vector store
    Populate {
        /// Path to the taxonomy file
        #[arg(long)]
        taxonomy_file: Option<String>,
        /// Maximum category level to include
        #[arg(long)]
        max_level: Option<usize>,
        /// Collection to populate; defaults to the model-derived name
        #[arg(long)]
        collection: Option<String>,
        /// Embedding model to use
        #[arg(long)]
        model: Option<String>,
        /// Embedding batch size
        #[arg(long)]
        batch_size: Option<usize>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Semantic search against the vector store
    Search {
        /// Query text to embed and search
        query: String,
        /// Number of results
        #[arg(short, long, default_value_t = 10)]
        limit: u64,
        /// Collection to search; defaults to the model-derived name
        #[arg(long)]
        collection: Option<String>,
        /// Embedding model to use
        #[arg(long)]
        model: Option<String>,
    },
    /// Run one query against several models' collections and time each
    Compare {
        /// Query text
        query: String,
        /// Models to compare (comma-separated); defaults to the catalog
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        models: Vec<String>,
        /// Number of results per model
        #[arg(short, long, default_value_t = 5)]
        limit: u64,
    },
    /// List recommended embedding models
    Models {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// List vector store collections
    Collections {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a collection from the vector store
    DeleteCollection {
        /// Collection name
        name: String,
    },
}

async fn run_serve(mut cfg: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        cfg.server.host = host;
    }
    if let Some(port) = port {
        cfg.server.port = port;
    }
    let registry = Arc::new(populate::build_registry(&cfg));
    let store = populate::build_store(&cfg);
    let state = server::AppState::new(cfg, registry, store);
    server::serve(state).await
}

async fn run_populate(
    cfg: AppConfig,
    taxonomy_file: Option<String>,
    max_level: Option<usize>,
    collection: Option<String>,
    model: Option<String>,
    batch_size: Option<usize>,
    json: bool,
) -> Result<()> {
    let registry = populate::build_registry(&cfg);
    let store = populate::build_store(&cfg);
    let opts = PopulateOptions {
        taxonomy_file: PathBuf::from(taxonomy_file.unwrap_or_else(|| cfg.taxonomy.file.clone())),
        max_level: max_level.unwrap_or(cfg.taxonomy.max_level),
        collection,
        model: model.unwrap_or_else(|| cfg.embeddings.model.clone()),
        batch_size: batch_size.unwrap_or(cfg.embeddings.batch_size),
    };
    let summary = populate::populate_taxonomy(opts, &registry, &store).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "populated {} categories into {} ({} batches, model {}, dimension {})",
            summary.categories, summary.collection, summary.batches, summary.model, summary.dimension
        );
    }
    Ok(())
}

async fn run_search(
    cfg: AppConfig,
    query: String,
    limit: u64,
    collection: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let registry = populate::build_registry(&cfg);
    let store = populate::build_store(&cfg);
    let collection = collection
        .or_else(|| model.as_deref().map(catalog::collection_for_model))
        .unwrap_or_else(|| cfg.vectors.collection.clone());
    let hits = search::search_categories(
        &registry,
        &store,
        &query,
        &collection,
        limit,
        model.as_deref(),
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}

async fn run_compare(
    cfg: AppConfig,
    query: String,
    models: Vec<String>,
    limit: u64,
) -> Result<()> {
    let registry = populate::build_registry(&cfg);
    let store = populate::build_store(&cfg);
    let models = if models.is_empty() {
        catalog::recommended_models()
            .iter()
            .map(|m| m.name.to_string())
            .collect()
    } else {
        models
    };
    let comparisons = compare::compare_models(&registry, &store, &query, &models, limit).await?;
    for comparison in &comparisons {
        println!(
            "{} ({} ms, collection {})",
            comparison.model, comparison.query_time_ms, comparison.collection
        );
        for (rank, hit) in comparison.results.iter().enumerate() {
            println!(
                "  {}. {} (score {:.4})",
                rank + 1,
                hit.full_path.as_deref().unwrap_or("<no path>"),
                hit.score
            );
        }
    }
    Ok(())
}

fn run_models(json: bool) -> Result<()> {
    let models = catalog::recommended_models();
    if json {
        println!("{}", serde_json::to_string_pretty(models)?);
        return Ok(());
    }
    println!("Recommended embedding models:");
    for model in models {
        println!("{}", "-".repeat(80));
        println!("Model: {}", model.name);
        println!("  Dimension: {}", model.dimension);
        println!("  Description: {}", model.description);
        println!("  Speed: {}", model.speed);
        println!("  Quality: {}", model.quality);
    }
    Ok(())
}

async fn run_collections(cfg: AppConfig, json: bool) -> Result<()> {
    let store = populate::build_store(&cfg);
    let names = store.list_collections().await?;
    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        match store.collection_info(&name).await {
            Ok(info) => rows.push(serde_json::json!({
                "name": name,
                "points": info.points_count,
                "vector_size": info.vector_size(),
            })),
            Err(e) => rows.push(serde_json::json!({ "name": name, "error": e.to_string() })),
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

async fn run_delete_collection(cfg: AppConfig, name: String) -> Result<()> {
    let store = populate::build_store(&cfg);
    if store.delete_collection(&name).await? {
        println!("deleted collection {}", name);
    } else {
        println!("collection {} does not exist", name);
    }
    Ok(())
}
