//! Service layer separating file I/O from the matting pipeline

pub mod io;

pub use io::ImageIOService;
