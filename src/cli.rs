use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Run the interactive timer and task screen.
    Run,
    /// Add a task to the list.
    Add {
        /// The task name.
        #[structopt()]
        name: String,

        /// The task priority; higher is more urgent.
        #[structopt(short, long, default_value = "1")]
        priority: i64,
    },
    /// List all tasks, most urgent first.
    List,
    /// Show the settings, or change the ones passed as flags.
    Config {
        /// Focus phase length, in whole minutes.
        #[structopt(long)]
        focus: Option<String>,

        /// Short break length, in whole minutes.
        #[structopt(long)]
        short_break: Option<String>,

        /// Long break length, in whole minutes.
        #[structopt(long)]
        long_break: Option<String>,

        /// Silence the phase-end alert.
        #[structopt(long, conflicts_with = "unmute")]
        mute: bool,

        /// Re-enable the phase-end alert.
        #[structopt(long)]
        unmute: bool,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Pomo",
    about = "A hyper-minimalistic pomodoro timer and task list."
)]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Use a different task store file.
    #[structopt(parse(from_os_str), short, long)]
    pub store_file: Option<PathBuf>,
}
