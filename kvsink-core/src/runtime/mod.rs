//! Runtimes drive sinks the way a host dataflow engine does: they build one partition per
//! worker, push batches into it and close it when the input is exhausted.
mod threaded;

pub use threaded::WorkerRuntime;
