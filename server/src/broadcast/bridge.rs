use crate::broadcast::model::BroadcastModel;
use serde::Deserialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use stormcore::engine::EngineHandle;
use stormcore::prelude::{EngineResult, EventSink};
use stormcore::records::StrikeRecord;
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

/// Strikes kept in the broadcast backlog before the oldest roll off.
const BACKLOG_LIMIT: usize = 100;

fn bridge_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct BridgeError;

impl warp::reject::Reject for BridgeError {}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub station_id: u32,
    pub payload: String,
}

/// Sink that appends fused records to the shared broadcast state.
pub struct BroadcastSink {
    state: Arc<RwLock<BroadcastModel>>,
}

impl BroadcastSink {
    pub fn new(state: Arc<RwLock<BroadcastModel>>) -> Self {
        Self { state }
    }
}

impl EventSink for BroadcastSink {
    fn deliver(&self, record: &StrikeRecord) -> EngineResult<()> {
        let mut guard = self.state.write().unwrap();
        guard.strikes.push(record.clone());
        if guard.strikes.len() > BACKLOG_LIMIT {
            let excess = guard.strikes.len() - BACKLOG_LIMIT;
            guard.strikes.drain(..excess);
        }
        let count = guard.strikes.len();
        guard.status = format!("{} strikes in backlog", count);
        Ok(())
    }
}

/// Bridge that hosts the ingest/fan-out HTTP endpoints over the shared
/// broadcast state.
pub struct BroadcastBridge {
    state: Arc<RwLock<BroadcastModel>>,
}

impl BroadcastBridge {
    pub fn new(state: Arc<RwLock<BroadcastModel>>, handle: EngineHandle) -> Self {
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let handle_filter = warp::any().map(move || handle.clone());

        let get_route = warp::path("strikes")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<BroadcastModel>>| {
                warp::reply::json(&*state.read().unwrap())
            });

        let ingest_route = warp::path("ingest")
            .and(warp::post())
            .and(warp::body::json())
            .and(handle_filter)
            .and_then(|request: IngestRequest, handle: EngineHandle| async move {
                match handle.ingest(request.station_id, request.payload).await {
                    Ok(()) => Ok::<_, warp::Rejection>(warp::reply::with_status(
                        warp::reply::json(&json!({"status": "ok"})),
                        StatusCode::OK,
                    )),
                    Err(err) => {
                        eprintln!("ingest error: {}", err);
                        Err(warp::reject::custom(BridgeError))
                    }
                }
            });

        thread::spawn(move || {
            let routes = get_route.or(ingest_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(bridge_bind_address()).await;
            });
        });

        Self { state }
    }

    pub fn publish_status(&self, message: &str) {
        self.state.write().unwrap().status = message.to_string();
        println!("[bridge] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> BroadcastModel {
        self.state.read().unwrap().clone()
    }
}
