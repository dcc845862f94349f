pub mod connection;
pub mod manager;
pub mod ws_session;
