mod handler;

pub use handler::IpcHandler;
