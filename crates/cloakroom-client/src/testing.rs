//! Deterministic environment and canned relay for unit tests.

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cloakroom_core::Environment;
use cloakroom_proto::{CreateRoomRequest, CreateRoomResponse, GetRoomResponse};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::relay::{HttpMethod, RelayTransport, TransportResponse};

pub const START_SECS: u64 = 1_700_000_000;

#[derive(Clone)]
pub struct TestEnv {
    wall: Arc<AtomicU64>,
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl TestEnv {
    pub fn new(seed: u64) -> Self {
        Self {
            wall: Arc::new(AtomicU64::new(START_SECS)),
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.wall.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Environment for TestEnv {
    type Instant = Duration;

    fn now(&self) -> Duration {
        Duration::from_secs(self.wall.load(Ordering::SeqCst))
    }

    fn wall_clock_secs(&self) -> u64 {
        self.wall.load(Ordering::SeqCst)
    }

    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap().fill_bytes(buffer);
    }
}

/// In-memory relay: stores blobs by code, 404s otherwise.
#[derive(Default)]
pub struct FakeRelay {
    pub rooms: Mutex<HashMap<String, String>>,
    pub requests: AtomicU64,
    pub fail_with: Option<TransportResponse>,
}

impl FakeRelay {
    pub fn failing(status: i32, data: &str) -> Self {
        Self {
            fail_with: Some(TransportResponse { status, data: data.to_string() }),
            ..Self::default()
        }
    }
}

#[async_trait]
impl RelayTransport for FakeRelay {
    async fn request(&self, url: &str, method: HttpMethod, body: Option<String>) -> TransportResponse {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(response) = &self.fail_with {
            return response.clone();
        }

        match method {
            HttpMethod::Post => {
                let req: CreateRoomRequest = serde_json::from_str(&body.unwrap()).unwrap();
                self.rooms.lock().unwrap().insert(req.room_code.clone(), req.encrypted_blob);
                let body = CreateRoomResponse { success: true, room_code: req.room_code };
                TransportResponse { status: 200, data: serde_json::to_string(&body).unwrap() }
            },
            HttpMethod::Get => {
                let code = url.rsplit('/').next().unwrap();
                match self.rooms.lock().unwrap().get(code) {
                    Some(blob) => {
                        let body = GetRoomResponse { encrypted_blob: blob.clone() };
                        TransportResponse { status: 200, data: serde_json::to_string(&body).unwrap() }
                    },
                    None => TransportResponse {
                        status: 404,
                        data: r#"{"error":"Room not found or expired"}"#.to_string(),
                    },
                }
            },
        }
    }
}
