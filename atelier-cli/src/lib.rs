pub mod async_request_client;
pub mod request_client;
