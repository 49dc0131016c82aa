pub mod aliases;
pub mod config;
pub mod ingest;
pub mod pacer;
pub mod poller;
pub mod riot_fetch;
pub mod stats;
pub mod store;
pub mod team_gen;
