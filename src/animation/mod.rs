pub mod clock;
pub mod ease;
pub mod entrance;
pub mod spring;
