use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use brief_core::{Config, Dashboard, Grocery, GroceryItem, ListStore, Todo, TodoItem};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{InquireError, MultiSelect, Password};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "brief", version, about = "Charlotte daily family brief")]
pub struct Cli {
    /// Directory holding the grocery and todo files.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Defaults to `show`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard.
    Show {
        /// Only show one section.
        #[arg(long, value_enum)]
        section: Option<Section>,
    },

    /// Edit the shared grocery list.
    Grocery {
        #[command(subcommand)]
        action: GroceryAction,
    },

    /// Edit the family todo list.
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// Store the NewsAPI key in the config file.
    Configure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Weather,
    News,
    Sports,
    Lists,
}

#[derive(Debug, Subcommand)]
pub enum GroceryAction {
    List,
    Add {
        item: String,
        #[arg(long, default_value = "")]
        quantity: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Remove the item at a 1-based position.
    Remove { position: usize },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum TodoAction {
    List,
    Add { task: String },
    /// Mark tasks done by 1-based position; without positions, pick interactively.
    /// Done tasks are removed from the list.
    Done { positions: Vec<usize> },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = load_config();
        let data_dir = self.data_dir.unwrap_or_else(|| config.data_dir());

        match self.command.unwrap_or(Command::Show { section: None }) {
            Command::Show { section } => show(&config, store_for_show(&data_dir), section).await,
            Command::Grocery { action } => grocery(&open_store(&data_dir)?, action),
            Command::Todo { action } => todo(&open_store(&data_dir)?, action),
            Command::Configure => configure(config),
        }
    }
}

/// An unreadable config file is logged and ignored so the dashboard still
/// renders and `configure` can overwrite it.
fn load_config() -> Config {
    match Config::config_file_path() {
        Ok(path) => load_config_from(&path),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "no config directory, using defaults");
            Config::default()
        }
    }
}

fn load_config_from(path: &Path) -> Config {
    Config::load_from(path).unwrap_or_else(|err| {
        tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable config file");
        Config::default()
    })
}

/// List edits need a working data directory.
fn open_store(data_dir: &Path) -> anyhow::Result<ListStore> {
    let store = ListStore::open(data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    bootstrap(&store);
    Ok(store)
}

/// The dashboard renders without one; the lists section reports the problem.
fn store_for_show(data_dir: &Path) -> ListStore {
    match ListStore::open(data_dir) {
        Ok(store) => {
            bootstrap(&store);
            store
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not open data directory");
            ListStore::at(data_dir)
        }
    }
}

fn bootstrap(store: &ListStore) {
    if let Err(err) = store.ensure_files() {
        // Surfaced again by whichever list is affected.
        tracing::warn!(error = %err, "could not bootstrap list files");
    }
}

async fn show(config: &Config, store: ListStore, only: Option<Section>) -> anyhow::Result<()> {
    let dashboard = Dashboard::from_config(config, store)?;
    let wants = |section: Section| only.is_none_or(|only| only == section);

    println!("{}", render::header(chrono::Local::now().date_naive()));

    if wants(Section::Weather) {
        println!("{}", render::weather(&dashboard.weather().await));
    }
    if wants(Section::News) {
        println!("{}", render::news(&dashboard.news().await));
    }
    if wants(Section::Sports) {
        println!("{}", render::sports(&dashboard.sports().await));
    }
    if wants(Section::Lists) {
        println!("{}", render::lists(&dashboard.lists()));
    }

    Ok(())
}

fn grocery(store: &ListStore, action: GroceryAction) -> anyhow::Result<()> {
    let mut items = store.load::<Grocery>()?;

    match action {
        GroceryAction::List => {}
        GroceryAction::Add { item, quantity, notes } => {
            let item = item.trim();
            if item.is_empty() {
                bail!("Grocery item name cannot be empty");
            }
            items.push(GroceryItem {
                item: item.to_string(),
                quantity: quantity.trim().to_string(),
                notes: notes.trim().to_string(),
            });
            store.save::<Grocery>(&items)?;
        }
        GroceryAction::Remove { position } => {
            let index = to_index(position, items.len(), "grocery item")?;
            let removed = items.remove(index);
            store.save::<Grocery>(&items)?;
            println!("Removed {}", removed.item);
        }
        GroceryAction::Clear => {
            items.clear();
            store.save::<Grocery>(&items)?;
        }
    }

    println!("{}", render::grocery_list(&items));
    Ok(())
}

fn todo(store: &ListStore, action: TodoAction) -> anyhow::Result<()> {
    let mut items = store.load::<Todo>()?;

    match action {
        TodoAction::List => {}
        TodoAction::Add { task } => {
            let task = task.trim();
            if task.is_empty() {
                bail!("Task cannot be empty");
            }
            items.push(TodoItem::new(task));
            store.save::<Todo>(&items)?;
        }
        TodoAction::Done { positions } => {
            let mut indices = if positions.is_empty() {
                match pick_done(&items)? {
                    Some(indices) => indices,
                    None => return Ok(()),
                }
            } else {
                positions
                    .into_iter()
                    .map(|p| to_index(p, items.len(), "task"))
                    .collect::<anyhow::Result<Vec<_>>>()?
            };
            indices.sort_unstable();
            indices.dedup();

            for index in indices {
                items[index].done = true;
                println!("Completed: {}", items[index].task);
            }
            store.save::<Todo>(&items)?;
            items.retain(|item| !item.done);
        }
    }

    println!("{}", render::todo_list(&items));
    Ok(())
}

/// Interactive checkbox prompt. `None` if there is nothing to pick or the user cancelled.
fn pick_done(items: &[TodoItem]) -> anyhow::Result<Option<Vec<usize>>> {
    if items.is_empty() {
        println!("Nothing to do.");
        return Ok(None);
    }

    let tasks: Vec<&str> = items.iter().map(|item| item.task.as_str()).collect();
    match MultiSelect::new("Mark tasks done:", tasks).raw_prompt() {
        Ok(picked) => Ok(Some(picked.into_iter().map(|option| option.index).collect())),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read selection"),
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("NewsAPI key (leave blank to remove):")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_news_api_key(&key);
    config.save()?;

    let path = Config::config_file_path()?;
    match config.news_api_key {
        Some(_) => println!("Saved NewsAPI key to {}", path.display()),
        None => println!("Removed NewsAPI key from {}", path.display()),
    }
    Ok(())
}

fn to_index(position: usize, len: usize, what: &str) -> anyhow::Result<usize> {
    if position == 0 || position > len {
        bail!("No {what} at position {position}; the list has {len} entries");
    }
    Ok(position - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(to_index(1, 3, "task").unwrap(), 0);
        assert_eq!(to_index(3, 3, "task").unwrap(), 2);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        assert!(to_index(0, 3, "task").is_err());
        let err = to_index(4, 3, "grocery item").unwrap_err();
        assert!(err.to_string().contains("No grocery item at position 4"));
    }

    #[test]
    fn bare_invocation_parses() {
        let cli = Cli::try_parse_from(["brief"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn show_section_parses() {
        let cli = Cli::try_parse_from(["brief", "show", "--section", "sports"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Show { section: Some(Section::Sports) })));
    }

    #[test]
    fn todo_done_accepts_several_positions() {
        let cli = Cli::try_parse_from(["brief", "todo", "done", "1", "3"]).unwrap();
        match cli.command {
            Some(Command::Todo { action: TodoAction::Done { positions } }) => {
                assert_eq!(positions, vec![1, 3]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn invalid_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "news_api_key = [").unwrap();

        assert_eq!(load_config_from(&path), Config::default());
    }

    #[tokio::test]
    async fn show_survives_broken_config_and_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "news_api_key = [").unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let config = load_config_from(&config_path);
        let store = store_for_show(&blocker.join("data"));

        assert!(store.load::<Grocery>().is_err());
        show(&config, store, Some(Section::Lists)).await.unwrap();
    }

    #[test]
    fn list_edits_still_require_a_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = open_store(&blocker.join("data")).unwrap_err();
        assert!(err.to_string().contains("Failed to open data directory"));
    }

    #[test]
    fn grocery_commands_edit_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ListStore::open(dir.path()).unwrap();

        grocery(
            &store,
            GroceryAction::Add { item: " Milk ".into(), quantity: "1 gal".into(), notes: String::new() },
        )
        .unwrap();
        grocery(
            &store,
            GroceryAction::Add { item: "Bread".into(), quantity: String::new(), notes: String::new() },
        )
        .unwrap();
        grocery(&store, GroceryAction::Remove { position: 1 }).unwrap();

        let items = store.load::<Grocery>().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item, "Bread");
    }

    #[test]
    fn blank_grocery_item_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ListStore::open(dir.path()).unwrap();

        let result = grocery(
            &store,
            GroceryAction::Add { item: "   ".into(), quantity: String::new(), notes: String::new() },
        );

        assert!(result.is_err());
        assert!(store.load::<Grocery>().unwrap().is_empty());
    }

    #[test]
    fn finishing_a_todo_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = ListStore::open(dir.path()).unwrap();
        store.save::<Todo>(&[TodoItem::new("Buy milk"), TodoItem::new("Walk dog")]).unwrap();

        todo(&store, TodoAction::Done { positions: vec![2] }).unwrap();

        assert_eq!(store.load::<Todo>().unwrap(), vec![TodoItem::new("Buy milk")]);
    }
}
