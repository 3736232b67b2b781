pub mod cli;
mod convert;
pub mod io;
mod logging;
