pub mod appointment;
pub mod consultation;
pub mod enums;

pub use appointment::*;
pub use consultation::*;
pub use enums::*;
