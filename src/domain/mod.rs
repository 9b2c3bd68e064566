// Domain layer - Core model, succession rules and mesh regridding

pub mod errors;
pub mod model;
pub mod regrid;
pub mod rules;
