//! Reading and writing the ns-3 file formats: size CDFs, flow traces, FCT files, and result
//! tables.

pub use ns3_io::*;
