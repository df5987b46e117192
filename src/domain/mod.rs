// Domain layer: person model and the storage port. No adapter code lives here.

pub mod model;
pub mod ports;
