pub mod file_sink;
pub mod http_client;
