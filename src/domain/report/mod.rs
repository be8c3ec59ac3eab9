pub mod emitter;
pub mod hpa_index;
pub mod node_collector;
pub mod owner;
pub mod pod_collector;
pub mod runner;
