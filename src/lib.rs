//! Import of legacy SQL Server dumps into the HeartCare store.
//!
//! The pipeline is: [`parser`] extracts `INSERT` statements and tokenizes
//! their values, [`augment`] optionally pads a statement with synthetic rows,
//! [`schema`] maps tuples onto the target tables, and [`importer`] drives
//! everything into a [`loader::Loader`].

pub mod augment;
pub mod config;
pub mod importer;
pub mod loader;
pub mod parser;
pub mod schema;
