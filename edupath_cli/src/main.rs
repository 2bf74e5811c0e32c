use anyhow::{anyhow, bail, Context, Result};
/// EduPath CLI - adaptive curriculum planner
///
/// Generates, tracks, saves and exports learning paths from the terminal.
use clap::{Parser, Subcommand};
use edupath_cli::render::{self, PrefsView};
use edupath_cli::session::{open_app, wait_or_cancel};
use edupath_cli::to_index;
use edupath_core::reminder::ReminderTicker;
use edupath_core::{
    AppConfig, AppState, Focus, Outcome, ReminderFrequency, SaveOutcome, Theme,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "edupath")]
#[command(about = "EduPath - adaptive specialization curricula", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new curriculum (Ctrl-C cancels)
    Generate {
        /// Topic to specialize in; defaults to the last query
        topic: Option<String>,
        /// industry, academic or balanced
        #[arg(short, long)]
        focus: Option<Focus>,
        /// Free-text background, e.g. "Professional"
        #[arg(short, long)]
        experience: Option<String>,
    },
    /// Ask for changes to the current curriculum (Ctrl-C cancels)
    Refine {
        instruction: String,
    },
    /// Show the current curriculum
    Show,
    /// Mark a module complete or incomplete
    Toggle {
        module_id: String,
    },
    /// Save the current curriculum (requires login)
    Save,
    /// List saved paths
    Saved,
    /// Make a saved path the current curriculum
    Load {
        /// Position in `edupath saved`
        position: usize,
    },
    /// Delete a saved path
    Delete {
        position: usize,
    },
    /// Set the check-in reminder of a saved path
    Remind {
        position: usize,
        /// none, weekly, monthly or yearly
        frequency: ReminderFrequency,
    },
    /// Acknowledge the due check-in and load that path
    CheckIn,
    /// Keep checking for due reminders until Ctrl-C
    Watch,
    /// Write the current curriculum as a printable HTML dossier
    Export {
        #[arg(short, long, default_value = "curriculum-dossier.html")]
        output: PathBuf,
    },
    /// Edit the skill self-assessment
    Skill {
        #[command(subcommand)]
        action: SkillAction,
    },
    /// Sign in with an email address
    Login {
        email: String,
    },
    /// Sign out
    Logout,
    /// Set the display theme (light, dark or system)
    Theme {
        theme: Theme,
    },
    /// Show remembered inputs
    Prefs {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SkillAction {
    /// Add a skill at level 3
    Add { name: String },
    /// Remove a skill by position
    Remove { position: usize },
    /// Rate a skill from 1 (novice) to 5 (expert)
    Level { position: usize, level: u8 },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    let mut app = open_app(&config)?;

    match cli.command {
        Commands::Generate {
            topic,
            focus,
            experience,
        } => {
            if let Some(topic) = topic {
                app.set_query(&topic);
            }
            if let Some(focus) = focus {
                app.set_focus(focus);
            }
            if let Some(experience) = experience {
                app.set_experience(&experience);
            }
            if app.generate().is_none() {
                bail!("Nothing to generate: give a topic, e.g. `edupath generate \"Cloud Security\"`");
            }
            println!("Designing your curriculum... (Ctrl-C to cancel)");
            finish_operation(&mut app).await?;
        }
        Commands::Refine { instruction } => {
            if app.active().is_none() {
                bail!("No current curriculum to refine");
            }
            if app.refine(&instruction).is_none() {
                bail!("Refinement instruction is empty");
            }
            println!("Refining... (Ctrl-C to cancel)");
            finish_operation(&mut app).await?;
        }
        Commands::Show => match app.active() {
            Some(curriculum) => print!("{}", render::render_curriculum(curriculum)),
            None => println!("No current curriculum. Run `edupath generate <topic>`."),
        },
        Commands::Toggle { module_id } => {
            let report = app.toggle_module(&module_id);
            if !report.changed() {
                bail!("No module with id '{}'", module_id);
            }
            if let Some(curriculum) = app.active() {
                println!("Progress: {}", render::progress_bar(edupath_core::progress(curriculum)));
            }
            if report.saved > 0 {
                println!("Updated {} saved path(s).", report.saved);
            }
        }
        Commands::Save => match app.save_current() {
            SaveOutcome::Saved => println!("Saved."),
            SaveOutcome::AlreadySaved => println!("Already saved."),
            SaveOutcome::SignInRequired => bail!("Sign in first: `edupath login <email>`"),
            SaveOutcome::NothingToSave => bail!("No current curriculum to save"),
        },
        Commands::Saved => {
            print!("{}", render::render_saved(app.saved()));
            print_reminder(&app);
        }
        Commands::Load { position } => {
            let index = saved_index(&app, position)?;
            app.load_saved(index);
            println!("Loaded '{}'.", app.saved()[index].specialization);
        }
        Commands::Delete { position } => {
            let index = saved_index(&app, position)?;
            if let Some(removed) = app.delete_saved(index) {
                println!("Deleted '{}'.", removed.specialization);
            }
        }
        Commands::Remind {
            position,
            frequency,
        } => {
            let index = saved_index(&app, position)?;
            app.set_reminder(index, frequency);
            println!("Reminder set to {}.", frequency);
        }
        Commands::CheckIn => match app.acknowledge_reminder() {
            Some(entry) => {
                println!("Checked in. Loaded '{}'.", entry.specialization);
                print!("{}", render::render_curriculum(&entry));
            }
            None => println!("No check-in is due."),
        },
        Commands::Watch => watch(&mut app, config.reminder_tick_secs).await?,
        Commands::Export { output } => {
            let html = app
                .export_dossier()
                .ok_or_else(|| anyhow!("No current curriculum to export"))?;
            std::fs::write(&output, html)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Dossier written to {}", output.display());
        }
        Commands::Skill { action } => match action {
            SkillAction::Add { name } => {
                if !app.add_skill(&name) {
                    bail!("Skill name is empty");
                }
            }
            SkillAction::Remove { position } => {
                let index = to_index(position).ok_or_else(|| anyhow!("Positions start at 1"))?;
                app.remove_skill(index)
                    .ok_or_else(|| anyhow!("No skill at position {}", position))?;
            }
            SkillAction::Level { position, level } => {
                let index = to_index(position).ok_or_else(|| anyhow!("Positions start at 1"))?;
                if !app.set_skill_level(index, level) {
                    bail!("No skill at position {}", position);
                }
            }
        },
        Commands::Login { email } => {
            if !app.sign_in(&email) {
                bail!("'{}' is not an email address", email);
            }
            println!("Signed in as {}.", app.profile().email);
        }
        Commands::Logout => {
            app.sign_out();
            println!("Signed out.");
        }
        Commands::Theme { theme } => {
            app.set_theme(theme);
            println!("Theme set to {}.", theme.as_str());
        }
        Commands::Prefs { json } => {
            let view = PrefsView::new(app.preferences(), app.profile());
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render::render_prefs(&view));
            }
        }
    }

    Ok(())
}

fn saved_index(app: &AppState, position: usize) -> Result<usize> {
    match to_index(position) {
        Some(index) if index < app.saved().len() => Ok(index),
        _ => bail!("No saved path at position {} (see `edupath saved`)", position),
    }
}

fn print_reminder(app: &AppState) {
    if let Some(due) = app.active_reminder() {
        println!("\n{}", render::render_reminder(due));
    }
}

async fn finish_operation(app: &mut AppState) -> Result<()> {
    match wait_or_cancel(app).await? {
        Some(Outcome::Loaded(curriculum)) => {
            print!("{}", render::render_curriculum(&curriculum));
            Ok(())
        }
        Some(Outcome::Failed { error, .. }) => bail!(error.user_message()),
        Some(Outcome::Discarded) | None => {
            if let Some(message) = render::render_status(app.status()) {
                println!("{}", message);
            }
            Ok(())
        }
    }
}

async fn watch(app: &mut AppState, tick_secs: u64) -> Result<()> {
    let ticker = ReminderTicker::new(Duration::from_secs(tick_secs.max(1)));
    let mut ticks = ticker.start()?;
    println!("Watching for check-ins every {}s (Ctrl-C to stop)", tick_secs.max(1));

    let mut announced = None;
    loop {
        tokio::select! {
            tick = ticks.recv() => {
                if tick.is_none() {
                    break;
                }
                let due = app.check_reminders();
                if due.is_some() && due != announced {
                    if let Some(reminder) = &due {
                        println!("{}", render::render_reminder(reminder));
                    }
                }
                announced = due;
            }
            _ = tokio::signal::ctrl_c() => {
                ticker.stop();
                break;
            }
        }
    }
    Ok(())
}
