//! Bridge integration tests

mod utils;

mod events;
mod relay;
