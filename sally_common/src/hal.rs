//! Hardware abstraction seam.
//!
//! The interlock never touches pins directly: it hands a DO bank to an
//! [`IoDriver`](driver::IoDriver) and gets a DI bank back, once per tick.

pub mod driver;
