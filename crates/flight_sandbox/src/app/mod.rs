pub(crate) mod bootstrap;
mod console_commands;
mod loading;
pub(crate) mod loop_runner;
mod script;
mod sim_avatar;
