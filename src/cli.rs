use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "voicelens")]
#[command(about = "Record your voice and explore the analysis the server sends back")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the bearer token
    Login {
        name: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        name: String,
        email: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Record a new take with a live timer and waveform
    Record {
        /// Title for the upload (prompted after recording when omitted)
        #[arg(long)]
        title: Option<String>,
    },

    /// List your uploaded recordings
    Recordings,

    /// Delete an uploaded recording and drop its cached analyses
    Delete {
        /// Recording id (or file id) as shown by `recordings`
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show analysis for a recording
    Analyze {
        #[command(subcommand)]
        view: AnalyzeCommand,
    },

    /// Drop cached analyses for a recording without deleting it
    Forget {
        /// File id as shown by `recordings`
        file_id: String,
    },

    /// Play back a local capture (latest one when no path is given)
    Play {
        /// Path to a WAV file
        target: Option<String>,
    },

    /// List available audio input devices
    Devices,

    /// Account settings
    Account {
        #[command(subcommand)]
        action: AccountCommand,
    },

    /// Show where data and config files are stored
    Paths,
}

#[derive(Subcommand)]
pub enum AnalyzeCommand {
    /// Pitch distribution, stats, and score
    Pitch {
        file_id: String,

        /// Bypass the local cache and refetch
        #[arg(long)]
        refresh: bool,

        /// Also render a PNG chart
        #[arg(long)]
        chart: bool,
    },

    /// Volume distribution, stats, and score
    Volume {
        file_id: String,

        /// Bypass the local cache and refetch
        #[arg(long)]
        refresh: bool,

        /// Also render a PNG chart
        #[arg(long)]
        chart: bool,
    },

    /// Combined energy score (mean of pitch and volume)
    Energy {
        file_id: String,

        /// Bypass the local cache and refetch
        #[arg(long)]
        refresh: bool,
    },

    /// Transcript with speech rate, keywords, and hate-speech flags
    Transcript {
        file_id: String,

        /// Bypass the local cache and refetch
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Change the display name
    ChangeName { name: String },

    /// Change the email address
    ChangeEmail { email: String },

    /// Change the password
    ChangePassword {
        /// New password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete the account and wipe local state
    Delete {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
