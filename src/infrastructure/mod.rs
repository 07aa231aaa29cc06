// Infrastructure layer: command-line plumbing

pub mod cli;

pub use cli::{run, Cli};
