//! UI layer: navigation state machine, command parser and the
//! interactive CLI runner.

pub mod command;
pub mod flow;
pub mod runner;

pub use command::{Command, ParseError};
pub use flow::{FlowEffect, FlowError, View, ViewFlow};
pub use runner::run;
