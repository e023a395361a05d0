use anyhow::Context;
use entity_crud_service::infra::config::{Settings, StoreBackend};
use entity_crud_service::{DocumentStore, EntityRegistry, PostgresDocumentStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--create-collections]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL (STORE_BACKEND must be postgres)\n\
         Optional:\n\
           DB_MAX_CONNECTIONS, APP_NAME\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let create_collections = args.iter().any(|a| a == "--create-collections");

    let settings = Settings::from_env().context("loading configuration")?;
    if settings.store_backend != StoreBackend::Postgres {
        anyhow::bail!("preflight only checks the postgres backend (STORE_BACKEND=postgres)");
    }
    let url = settings
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;

    println!("> Preflight:");
    println!("  STORE_BACKEND=postgres");
    println!("  DB_MAX_CONNECTIONS={}", settings.db_max_connections);
    println!("  APP_NAME={}", settings.app_name);

    let store = PostgresDocumentStore::connect(url, settings.db_max_connections).await?;
    store.ping().await?;
    println!("  Store reachable");

    let registry = EntityRegistry::standard();
    if create_collections {
        store.ensure_collections(&registry).await?;
        println!("  Collections ensured");
    }

    let mut missing = Vec::new();
    for descriptor in registry.descriptors() {
        match store.count(descriptor.collection).await {
            Ok(n) => println!(
                "  {:<16} {:>8} document(s)  (/api/{})",
                descriptor.collection, n, descriptor.api_path
            ),
            Err(e) => {
                println!("  {:<16} unavailable: {}", descriptor.collection, e);
                missing.push(descriptor.collection);
            }
        }
    }

    if !missing.is_empty() {
        anyhow::bail!(
            "collections not ready: {} (rerun with --create-collections)",
            missing.join(", ")
        );
    }

    println!("> Preflight OK");
    Ok(())
}
