pub mod prelude;

pub mod id;
pub mod errors;
pub mod address;

pub mod ban;

pub mod notice;

pub mod config;

#[cfg(test)]
mod tests;
