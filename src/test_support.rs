//! In-process stand-ins for the external HTTP services used by tests.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral localhost port and return its address.
pub async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream server");
    });
    addr
}
