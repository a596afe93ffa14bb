pub mod config;
pub mod logger;
pub mod query_string;
pub mod paginator;
pub mod text_utils;
pub mod tags;
pub mod content;
pub mod blog;
pub mod pages;
pub mod photos;
pub mod view;
pub mod site;
pub mod widgets;
pub mod maintenance;
pub mod server;
pub mod site_builder;

#[cfg(test)]
mod test_data;
