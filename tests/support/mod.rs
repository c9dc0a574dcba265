#![allow(dead_code)]

#[macro_use]
mod macros;
mod handset;

pub use handset::{Request, SimulatedHandset};

use necsip::{Endpoint, HttpTransport, SessionClient, Transport, TransportPolicy};

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Runs a test body, panicking if it takes longer than 10 seconds
pub async fn within_timeout<F: Future>(test: F) -> F::Output {
    start_logger();
    match tokio::time::timeout(Duration::from_secs(10), test).await {
        Ok(output) => output,
        Err(_) => panic!("Test took too long"),
    }
}

pub fn start_logger() {
    if let Err(e) = pretty_env_logger::try_init() {
        log::debug!(target: "test::support", "Logger init() returned '{}'", e);
    }
}

pub fn http_endpoint(addr: SocketAddr) -> Endpoint {
    Endpoint::insecure(addr.to_string())
}

pub fn https_endpoint(addr: SocketAddr) -> Endpoint {
    Endpoint::secure(addr.to_string())
}

/// Client over reqwest with the default policy
pub fn client(endpoint: Endpoint) -> SessionClient<HttpTransport> {
    client_with(endpoint, HttpTransport::new())
}

pub fn client_with<T: Transport>(endpoint: Endpoint, transport: T) -> SessionClient<T> {
    SessionClient::new(endpoint, transport, TransportPolicy::default()).unwrap()
}

/// Random data helpers
pub mod rand_data {
    use rand::{distributions::Alphanumeric, Rng};

    pub fn string(len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .map(char::from)
            .take(len)
            .collect()
    }
}
