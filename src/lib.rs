// src/lib.rs

// On déclare tous nos modules principaux pour les rendre publics et
// utilisables par nos programmes binaires (pool_watcher.rs, dev_runner.rs).
pub mod config;
pub mod decoders;
pub mod feed;
pub mod math;
pub mod monitoring;
pub mod pipeline;
pub mod reconciler;
pub mod rpc;
pub mod service;
pub mod store;
