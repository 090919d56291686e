//! Interactive shell over the people/dogs store.
//!
//! # Responsibility
//! - Drive the two screens from stdin, one gesture per line.
//! - Read `KENNEL_*` configuration and start file logging when asked.

mod command;

use command::{parse, Command, HELP};
use kennel_core::{
    init_logging_from_config, KennelConfig, PeopleListScreen, PersonDetailScreen, RandomNames,
    Store, StoreError, StoreResult,
};
use log::info;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let config = match KennelConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("kennel: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("kennel: logging disabled: {err}");
    }

    let store = match Store::open_configured(&config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("kennel: cannot open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };
    info!(
        "event=cli_start module=cli status=ok version={}",
        kennel_core::core_version()
    );

    let result = run(&store);
    if let Err(err) = store.close() {
        eprintln!("kennel: close failed: {err}");
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("kennel: {err}");
            ExitCode::FAILURE
        }
    }
}

struct Shell {
    list: PeopleListScreen,
    detail: Option<PersonDetailScreen>,
}

fn run(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let mut shell = Shell {
        list: PeopleListScreen::new(store, Arc::new(RandomNames))?,
        detail: None,
    };
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    shell.render(&mut stdout)?;
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(stdout, "{message}")?;
                continue;
            }
        };
        if command == Command::Quit {
            return Ok(());
        }
        if command == Command::Help {
            writeln!(stdout, "{HELP}")?;
            continue;
        }

        if let Err(err) = shell.apply(command) {
            writeln!(stdout, "error: {err}")?;
            if matches!(err, StoreError::Closed) {
                return Err(err.into());
            }
        }
        shell.sync(&mut stdout)?;
        shell.render(&mut stdout)?;
    }
}

impl Shell {
    fn apply(&mut self, command: Command) -> StoreResult<()> {
        match command {
            Command::List | Command::Back => {
                self.detail = None;
                Ok(())
            }
            Command::Add => self.list.add_person().map(|_| ()),
            Command::Open(index) => {
                self.detail = Some(self.list.open(index)?);
                Ok(())
            }
            Command::Delete(index) => self.list.delete_person(index),
            Command::Rename(text) => self.detail()?.edit_name(text),
            Command::DogAdd => self.detail()?.add_dog().map(|_| ()),
            Command::DogRename(offset, text) => self.detail()?.edit_dog_name(offset, text),
            Command::DogRemove(offsets) => self.detail()?.delete_dogs(offsets),
            Command::DogMove(from, to) => self.detail()?.move_dog(from, to),
            Command::Help | Command::Quit => Ok(()),
        }
    }

    /// Pulls published changes into both screens; pops a detail screen whose
    /// person disappeared.
    fn sync(&mut self, out: &mut impl Write) -> io::Result<()> {
        if let Err(err) = self.list.refresh() {
            writeln!(out, "error: {err}")?;
        }
        if let Some(detail) = self.detail.as_mut() {
            match detail.refresh() {
                Ok(_) => {}
                Err(StoreError::StaleReference { .. }) => {
                    writeln!(out, "this person was deleted")?;
                    self.detail = None;
                }
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
        Ok(())
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        match &self.detail {
            Some(detail) => {
                writeln!(out, "== {} ==", detail.title())?;
                if detail.dog_rows().is_empty() {
                    writeln!(out, "  (no dogs)")?;
                }
                for (offset, row) in detail.dog_rows().iter().enumerate() {
                    writeln!(out, "  {offset}: {}", row.name)?;
                }
            }
            None => {
                writeln!(out, "== {} ==", self.list.title())?;
                if self.list.rows().is_empty() {
                    writeln!(out, "  (nobody yet; `add` someone)")?;
                }
                for (index, row) in self.list.rows().iter().enumerate() {
                    writeln!(out, "  {index}: {}", row.name)?;
                }
            }
        }
        Ok(())
    }

    fn detail(&self) -> StoreResult<&PersonDetailScreen> {
        self.detail.as_ref().ok_or(StoreError::Unbound)
    }
}
