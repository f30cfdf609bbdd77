//! carecost-web - JSON read endpoints over the price service

pub mod params;
pub mod router;

pub use router::create_router;

use anyhow::Result;
use carecost_core::PriceService;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the web server until `shutdown` resolves
pub async fn run(
    service: Arc<PriceService>,
    host: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let router = create_router(service);

    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;

    info!("Web server listening on http://{}", addr);
    println!("Web server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Web server stopped");
    Ok(())
}
