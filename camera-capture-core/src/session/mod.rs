pub mod capturer;
pub mod configurator;
pub mod device_selector;
pub mod frame_sink;
pub mod graph;
pub mod permission_gate;
pub mod queue;
