mod config;
mod ipc;
