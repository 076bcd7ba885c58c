mod connection;
mod endpoint;
mod payload;
