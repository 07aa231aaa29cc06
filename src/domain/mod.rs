// Domain module: constraint model, solver contract and value objects

pub mod cp_model;
pub mod linear;
pub mod models;
pub mod solver_service;
pub mod value_objects;

pub use cp_model::*;
pub use linear::*;
pub use models::*;
pub use solver_service::*;
pub use value_objects::*;
