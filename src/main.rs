mod account;
mod analysis;
mod api;
mod audio;
mod auth;
mod cache;
mod cli;
mod config;
mod error;
mod library;
mod paths;
mod report;
mod util;

use anyhow::Result;
use clap::Parser;
use console::style;

use analysis::view::AnalysisKind;
use cli::{AccountCommand, AnalyzeCommand, Cli, Command};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;
    let auth = auth::AuthContext::load();
    let client = api::ApiClient::new(&cfg.server, &auth)?;

    match cli.command {
        Command::Login { name, password } => {
            account::login(&client, &auth, &name, password.as_deref())
        }

        Command::Register {
            name,
            email,
            password,
        } => account::register(&client, &name, &email, password.as_deref()),

        Command::Logout => account::logout(&auth),

        Command::Record { title } => audio::record::run(&client, title),

        Command::Recordings => library::run_list(&client),

        Command::Delete { id, yes } => library::run_delete(&client, &id, yes),

        Command::Analyze { view } => match view {
            AnalyzeCommand::Pitch {
                file_id,
                refresh,
                chart,
            } => analysis::view::run_signal(
                &client,
                AnalysisKind::Pitch,
                &file_id,
                refresh,
                chart,
                &cfg.chart,
            ),

            AnalyzeCommand::Volume {
                file_id,
                refresh,
                chart,
            } => analysis::view::run_signal(
                &client,
                AnalysisKind::Volume,
                &file_id,
                refresh,
                chart,
                &cfg.chart,
            ),

            AnalyzeCommand::Energy { file_id, refresh } => {
                analysis::view::run_energy(&client, &file_id, refresh)
            }

            AnalyzeCommand::Transcript { file_id, refresh } => {
                analysis::view::run_transcript(&client, &file_id, refresh)
            }
        },

        Command::Forget { file_id } => library::run_forget(&file_id),

        Command::Play { target } => audio::playback::play(target.as_deref()),

        Command::Devices => audio::devices::list_devices(),

        Command::Account { action } => match action {
            AccountCommand::ChangeName { name } => account::change_name(&client, &name),
            AccountCommand::ChangeEmail { email } => account::change_email(&client, &email),
            AccountCommand::ChangePassword { password } => {
                account::change_password(&client, password.as_deref())
            }
            AccountCommand::Delete { yes } => account::delete_user(&client, &auth, yes),
        },

        Command::Paths => {
            println!("{} {}", style("Config:").bold(), paths::config_file().display());
            println!("{} {}", style("Data:").bold(), paths::data_dir().display());
            println!(
                "{} {}",
                style("Recordings:").bold(),
                paths::recordings_dir().display()
            );
            println!("{} {}", style("Charts:").bold(), paths::charts_dir().display());
            println!("{} {}", style("Cache:").bold(), paths::cache_db_path().display());
            Ok(())
        }
    }
}
