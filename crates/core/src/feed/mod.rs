pub mod api_client;
pub mod poller;
pub mod source;
