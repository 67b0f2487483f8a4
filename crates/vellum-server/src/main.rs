//! Vellum server binary.
//!
//! Serves the collaboration WebSocket endpoint with in-memory storage and
//! auth. `--demo` seeds a document and a session token so a fresh build
//! can be exercised immediately:
//!
//! ```bash
//! RUST_LOG=info vellum-server --demo
//! # connect to ws://127.0.0.1:9090/?token=dev-token and join "welcome"
//! ```

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vellum_model::Document;
use vellum_server::constants::{DEFAULT_BIND_ADDRESS, DEFAULT_PORT};
use vellum_server::{
    run_server, MemoryAuth, MemoryStore, RoomRegistry, ServerConfig, SessionUser, StoredDocument,
};

#[derive(Parser, Debug)]
#[command(name = "vellum-server", about = "Collaboration session server for Vellum documents")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seed a demo document and session token.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(MemoryAuth::new());
    if args.demo {
        seed_demo(&store, &auth);
    }

    let registry = Arc::new(RoomRegistry::new());
    run_server(
        ServerConfig {
            bind_address: args.bind,
            port: args.port,
        },
        registry,
        store,
        auth,
    )
    .await
}

fn seed_demo(store: &MemoryStore, auth: &MemoryAuth) {
    let welcome = Document::with_paragraphs(
        "welcome",
        "Welcome",
        &[
            "Welcome to Vellum.",
            "Open this document from two connections and type away.",
        ],
    );
    store.insert(StoredDocument {
        id: "welcome".into(),
        title: "Welcome".into(),
        content: welcome.to_content(),
        owner_id: None,
    });
    auth.add_token(
        "dev-token",
        SessionUser {
            user_id: "u-dev".into(),
            display_name: "Dev".into(),
            color: "#7c4dff".into(),
        },
    );
    tracing::info!("demo seeded: document 'welcome', session token 'dev-token'");
}
