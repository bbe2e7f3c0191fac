mod spin;

pub use spin::spin_system;
