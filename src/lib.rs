pub mod app;
pub mod appsettings;
pub mod cli;
pub mod datetime;
pub mod error;
pub mod scheduling;
pub mod storage;
pub mod task;

#[cfg(test)]
mod test_utils;
