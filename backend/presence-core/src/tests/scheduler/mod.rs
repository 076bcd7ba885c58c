mod profile;
mod retry;
