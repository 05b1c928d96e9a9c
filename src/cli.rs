//! CLI argument parsing for the agenda-worker binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agenda-worker", about = "Appointment conflict detection and day planning")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API (and NATS handlers if configured). Default if no subcommand given
    Serve,
    /// Check a candidate appointment from a JSON file and print its conflicts
    Validate {
        /// File holding `{ appointment, existingAppointments }`
        file: PathBuf,
    },
    /// Plan a day from a JSON file and print the proposal
    Plan {
        /// File holding `{ date, appointments, startLocation? }`
        file: PathBuf,
    },
}
