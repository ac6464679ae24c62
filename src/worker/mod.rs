pub mod watch_worker;

pub use watch_worker::run as run_watch_worker;
