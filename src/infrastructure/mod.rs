pub mod serial_pacer;

pub use serial_pacer::SerialPacer;
