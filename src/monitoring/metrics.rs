// DANS : src/monitoring/metrics.rs

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
};
use warp::Filter;

lazy_static! {
    // --- Flux de transactions ---
    pub static ref TRANSACTIONS_SEEN: IntCounter = register_int_counter!(
        "poolwatcher_transactions_seen_total", "Nombre total de transactions reçues du feed Helius"
    ).unwrap();
    pub static ref TRANSACTIONS_SKIPPED: IntCounterVec = register_int_counter_vec!(
        "poolwatcher_transactions_skipped_total",
        "Transactions ignorées sans écriture, par raison",
        &["reason"] // Labels: "wrong_type", "no_pool_address", "missing_transfers", ...
    ).unwrap();

    // --- Réconciliation ---
    pub static ref POOLS_PERSISTED: IntCounter = register_int_counter!(
        "poolwatcher_pools_persisted_total", "Nombre de réconciliations écrites dans le store"
    ).unwrap();
    pub static ref DECODE_FAILURES: IntCounter = register_int_counter!(
        "poolwatcher_decode_failures_total", "Échecs de fetch/décodage de compte (pool désactivé)"
    ).unwrap();
    pub static ref PRICE_REJECTIONS: IntCounter = register_int_counter!(
        "poolwatcher_price_rejections_total", "Mises à jour rejetées par le contrôle de cohérence de prix"
    ).unwrap();
    pub static ref RATE_LIMIT_TIMEOUTS: IntCounter = register_int_counter!(
        "poolwatcher_rate_limit_timeouts_total", "Unités abandonnées faute de permis du rate limiter"
    ).unwrap();

    // --- Latence & Santé ---
    pub static ref ACCOUNT_FETCH_LATENCY: Histogram = register_histogram!(
        "poolwatcher_account_fetch_latency_seconds", "Latence du fetch RPC des données de compte"
    ).unwrap();
    pub static ref ACTIVE_POOL_COUNT: IntGauge = register_int_gauge!(
        "poolwatcher_active_pool_count", "Nombre de pools actifs dans le store"
    ).unwrap();
}

/// Démarre le serveur HTTP qui expose les métriques au format Prometheus.
pub async fn serve_metrics(port: u16) {
    let metrics_route = warp::path!("metrics").map(|| {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return warp::reply::with_status(
                String::new(),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
        warp::reply::with_status(
            String::from_utf8(buffer).unwrap_or_default(),
            warp::http::StatusCode::OK,
        )
    });

    warp::serve(metrics_route).run(([0, 0, 0, 0], port)).await;
}
