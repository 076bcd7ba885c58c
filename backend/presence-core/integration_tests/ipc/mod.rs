mod helpers;
mod scheduler;
mod session;
